//! # ldv-core: Foundational Types for the Payload Validator
//!
//! This crate defines the pieces every other `ldv-*` crate builds on. It has
//! no internal crate dependencies, only `serde`, `serde_json`, `serde_yaml`,
//! `thiserror` and `tracing` from the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **Pointers are classified once.** A raw `@context` string becomes a
//!    [`Pointer`] carrying its [`PointerKind`]; call sites match on the kind
//!    instead of re-inspecting the string.
//!
//! 2. **Locations are newtypes.** A [`SchemaLocation`] can only be produced
//!    by the translator or by an explicit constructor, so cache keys never
//!    mix pointers and locations.
//!
//! 3. **Translation is total.** Every function in [`pointer`] returns
//!    `Option`/`bool` for unroutable input. Nothing here panics.
//!
//! 4. **I/O lives behind [`SchemaLoader`].** This crate never touches the
//!    network; implementations live in `ldv-client` (and in tests).
//!
//! ## Crate Policy
//!
//! - No dependencies on other `ldv-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod config;
pub mod document;
pub mod error;
pub mod loader;
pub mod pointer;

// Re-export primary types for ergonomic imports.
pub use config::ValidatorConfig;
pub use document::parse_document;
pub use error::{ConfigError, DocumentError, LoadError, ValidationError};
pub use loader::SchemaLoader;
pub use pointer::{
    local_type_name, NodeClass, Pointer, PointerConventions, PointerKind, SchemaLocation,
};
