//! # ldv-schema: Schema Resolution and Validation Engine
//!
//! Validates payloads whose objects carry a type annotation (`@type`) and a
//! pointer to a remotely published schema package (`@context`). The schemas
//! a payload needs are discovered while walking it and fetched on demand.
//!
//! ## Pipeline
//!
//! ```text
//! payload ──► Walker ──► Dispatcher ──► SchemaCache / AttributeIndex ──► SchemaLoader
//!              │            │
//!              │            ├──► ConstraintSet::apply
//!              │            └──► SchemaChecker (first strategy with an outcome wins)
//!              └── inherited pointer, structural path
//! ```
//!
//! - [`walker`]: pre-order traversal with context inheritance.
//! - [`dispatch`]: core vs attribute routing and strategy fallback.
//! - [`cache`]: run-scoped stores ([`SchemaStore`]) and the branch fallback chain.
//! - [`refs`]: `$ref` absolutization and annotation relaxation of fragments.
//! - [`constraints`]: required/equals rules published by composed packages.
//! - [`checker`]: the [`SchemaChecker`] seam and its `jsonschema` implementation.
//! - [`expand`]: optional JSON-LD term expansion before validation.
//!
//! ## Run Scope
//!
//! A [`SchemaStore`] is created by the caller and threaded through every
//! call that may populate it. Nothing is global and nothing outlives the
//! store. Within one store, each location is fetched at most once.

pub mod cache;
pub mod checker;
pub mod constraints;
pub mod dispatch;
pub mod error;
pub mod expand;
pub mod fallback;
pub mod refs;
pub mod validator;
pub mod walker;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::{AttributeEntry, AttributeIndex, BranchChain, SchemaCache, SchemaDocument, SchemaStore};
pub use checker::{CheckOutcome, JsonSchemaChecker, SchemaChecker};
pub use constraints::{ConstraintIndex, ConstraintSet};
pub use error::{CheckerError, FetchError};
pub use expand::{Expander, Expansion, TermExpander};
pub use validator::{find_root_pointer, root_pointer, RunOptions, Validator};
pub use walker::{TypedNode, Visitor, Walker};
