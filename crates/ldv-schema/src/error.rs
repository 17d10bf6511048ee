//! Operational errors of the engine.
//!
//! None of these escape a validation run: the dispatcher logs them and
//! skips the affected node. They are public because the cache and checker
//! are usable on their own.

use ldv_core::{DocumentError, LoadError};
use thiserror::Error;

/// Failure to obtain a schema or constraints document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The loader failed.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The loader returned text that is not a document.
    #[error("cannot decode {location}: {source}")]
    Decode {
        /// The location whose body failed to decode.
        location: String,
        /// The decoding failure.
        #[source]
        source: DocumentError,
    },
}

impl FetchError {
    /// True when the resource definitively does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Load(e) if e.is_not_found())
    }
}

/// A schema checker could not evaluate the instance at all.
///
/// Distinct from an assertion failure: the dispatcher moves on to its next
/// strategy instead of recording an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckerError {
    /// The schema could not be compiled (bad keyword, unresolvable `$ref`).
    #[error("failed to compile schema: {reason}")]
    Build {
        /// Human-readable reason.
        reason: String,
    },
}
