//! # Error Hierarchy
//!
//! Structured error types for the validator, built with `thiserror`.
//! No `Box<dyn Error>`, no `.unwrap()` outside tests.
//!
//! Only [`ValidationError`] is part of the validation *result*. Every other
//! type here describes an operational failure that the engine degrades to
//! "skip this node" rather than propagating out of a run.

use serde::Serialize;
use thiserror::Error;

/// A single entry of the ordered validation report.
///
/// Renders as `"<path>: <message>"`, or `"<path> (<type>): <message>"` when
/// the failing node was validated against a named attribute schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// Structural path of the offending object (`""` is the payload root).
    pub path: String,
    /// Human-readable description of the failure.
    pub message: String,
    /// Schema type name, present for attribute-object failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
}

impl ValidationError {
    /// An untyped entry (core-object and constraint failures).
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            type_name: None,
        }
    }

    /// An entry tagged with the schema type it was validated against.
    pub fn typed(
        path: impl Into<String>,
        type_name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            type_name: Some(type_name.into()),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.type_name {
            Some(type_name) => write!(f, "{} ({}): {}", self.path, type_name, self.message),
            None => write!(f, "{}: {}", self.path, self.message),
        }
    }
}

/// Errors returned by a [`SchemaLoader`](crate::SchemaLoader).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The resource does not exist at the requested location.
    #[error("resource not found: {location}")]
    NotFound {
        /// The location that was requested.
        location: String,
    },

    /// The server answered with a non-success status other than "not found".
    #[error("unexpected status {status} for {location}")]
    Status {
        /// The location that was requested.
        location: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The request could not be completed (DNS, TLS, timeout, body read).
    #[error("transport error for {location}: {reason}")]
    Transport {
        /// The location that was requested.
        location: String,
        /// Human-readable reason.
        reason: String,
    },
}

impl LoadError {
    /// True when the resource is definitively absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Errors while decoding fetched text into a document tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// The text is neither valid JSON nor valid YAML.
    #[error("invalid YAML: {0}")]
    Yaml(String),

    /// The YAML tree uses constructs with no JSON equivalent.
    #[error("YAML-to-JSON conversion failed: {0}")]
    Conversion(String),
}

/// Errors while assembling a [`ValidatorConfig`](crate::ValidatorConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read config file {path}: {source}")]
    Read {
        /// Path of the configuration file.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The configuration file is not valid YAML for the config shape.
    #[error("invalid config {origin}: {reason}")]
    Parse {
        /// File path or `"<inline>"`.
        origin: String,
        /// Human-readable reason.
        reason: String,
    },

    /// A setting is present but unusable.
    #[error("invalid value for {key}: {reason}")]
    InvalidValue {
        /// The offending setting name.
        key: String,
        /// Human-readable reason.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untyped_entry_renders_path_and_message() {
        let e = ValidationError::new("message/order", "\"x\" is a required property");
        assert_eq!(e.to_string(), "message/order: \"x\" is a required property");
    }

    #[test]
    fn typed_entry_renders_type_in_parentheses() {
        let e = ValidationError::typed("a/b[0]", "ChargingOffer", "bad");
        assert_eq!(e.to_string(), "a/b[0] (ChargingOffer): bad");
    }

    #[test]
    fn root_entry_keeps_empty_path() {
        let e = ValidationError::new("", "boom");
        assert_eq!(e.to_string(), ": boom");
    }

    #[test]
    fn type_name_omitted_from_json_when_absent() {
        let e = ValidationError::new("p", "m");
        let json = serde_json::to_value(&e).unwrap();
        assert!(json.get("type_name").is_none());
        assert_eq!(json["path"], "p");
    }

    #[test]
    fn not_found_is_distinguished() {
        let nf = LoadError::NotFound {
            location: "https://x/attributes.yaml".into(),
        };
        let st = LoadError::Status {
            location: "https://x/attributes.yaml".into(),
            status: 500,
        };
        assert!(nf.is_not_found());
        assert!(!st.is_not_found());
        assert!(st.to_string().contains("500"));
    }
}
