//! # ldv-cli: Payload Validator CLI
//!
//! Provides the `ldv` command-line interface.
//!
//! ## Subcommands
//!
//! - `ldv validate`: validate JSON payloads and Postman collections.
//! - `ldv resolve`: show how a type-annotation pointer is routed.
//!
//! ```bash
//! ldv validate examples/ev-charging/*.json
//! ldv validate --core-only --fallback-branch main collection.json
//! ldv resolve https://raw.githubusercontent.com/beckn/schemas/refs/heads/main/schema/core/v2/context.jsonld
//! ```
//!
//! Exit codes: 0 all payloads valid, 1 validation errors, 2 operational
//! error (unreadable input, bad configuration).

pub mod collection;
pub mod resolve;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};
use ldv_core::ValidatorConfig;

/// Load configuration from defaults, `path` and the environment.
pub fn load_config(path: Option<&Path>) -> Result<ValidatorConfig> {
    let config = ValidatorConfig::load(path).with_context(|| match path {
        Some(path) => format!("failed to load configuration from {}", path.display()),
        None => "failed to load configuration".to_string(),
    })?;
    tracing::debug!(
        core_namespace = %config.core_namespace,
        fallbacks = ?config.branch_fallbacks,
        "configuration loaded"
    );
    Ok(config)
}
