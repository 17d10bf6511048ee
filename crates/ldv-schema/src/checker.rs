//! # Structural Schema Checking
//!
//! [`SchemaChecker`] is the seam between the dispatcher and a JSON Schema
//! implementation. The dispatcher hands it a schema, the run's cache (so
//! cross-document `$ref`s resolve against already-fetched documents) and an
//! instance. Three results are distinguished:
//!
//! - `Ok(CheckOutcome::Valid)` / `Ok(CheckOutcome::Invalid { .. })`: an
//!   outcome. The dispatcher records it and stops.
//! - `Err(CheckerError)`: the schema could not be evaluated. The
//!   dispatcher tries its next strategy.
//!
//! [`JsonSchemaChecker`] compiles with the `jsonschema` crate. References
//! are served from the cache only; the checker never goes to the network.

use std::collections::HashMap;
use std::sync::Arc;

use jsonschema::{Draft, Retrieve, Uri};
use serde_json::Value;

use crate::cache::SchemaCache;
use crate::error::CheckerError;

/// Result of evaluating one instance against one schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    Valid,
    /// The first assertion failure.
    Invalid {
        message: String,
        /// JSON pointer into the instance (`""` for the instance itself).
        instance_path: String,
    },
}

impl CheckOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Evaluates instances against JSON Schema fragments.
pub trait SchemaChecker {
    /// # Errors
    ///
    /// [`CheckerError`] when the schema itself cannot be compiled or one of
    /// its references cannot be resolved from `cache`.
    fn check(
        &self,
        schema: &Value,
        cache: &SchemaCache,
        instance: &Value,
    ) -> Result<CheckOutcome, CheckerError>;
}

/// [`SchemaChecker`] backed by the `jsonschema` crate.
#[derive(Debug, Clone, Copy)]
pub struct JsonSchemaChecker {
    draft: Draft,
}

impl Default for JsonSchemaChecker {
    fn default() -> Self {
        Self {
            draft: Draft::Draft202012,
        }
    }
}

impl JsonSchemaChecker {
    pub fn new(draft: Draft) -> Self {
        Self { draft }
    }
}

impl SchemaChecker for JsonSchemaChecker {
    fn check(
        &self,
        schema: &Value,
        cache: &SchemaCache,
        instance: &Value,
    ) -> Result<CheckOutcome, CheckerError> {
        let mut opts = jsonschema::options();
        opts.with_draft(self.draft);
        opts.with_retriever(CacheRetriever::from_cache(cache));

        let validator = opts.build(schema).map_err(|e| CheckerError::Build {
            reason: e.to_string(),
        })?;

        let outcome = match validator.iter_errors(instance).next() {
            None => CheckOutcome::Valid,
            Some(e) => CheckOutcome::Invalid {
                message: e.to_string(),
                instance_path: e.instance_path.to_string(),
            },
        };
        Ok(outcome)
    }
}

/// Serves `$ref` targets from a snapshot of the run's cache.
///
/// Keyed by location string; the fragment part of a requested URI is
/// resolved by the validator against the returned document.
struct CacheRetriever {
    documents: HashMap<String, Arc<Value>>,
}

impl CacheRetriever {
    fn from_cache(cache: &SchemaCache) -> Self {
        let documents = cache
            .documents()
            .map(|(location, document)| (location.as_str().to_string(), Arc::clone(document)))
            .collect();
        Self { documents }
    }
}

impl Retrieve for CacheRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();
        let location = uri_str.split_once('#').map_or(uri_str, |(doc, _)| doc);
        match self.documents.get(location) {
            Some(document) => Ok(document.as_ref().clone()),
            None => Err(format!("{location} is not loaded in this run").into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryLoader;
    use ldv_core::SchemaLocation;
    use serde_json::json;

    const LOC: &str = "https://h/o/r/refs/heads/main/schema/core/v2/attributes.yaml";
    const CORE: &str = r#"
components:
  schemas:
    Order:
      type: object
      properties:
        id: { type: string }
        price: { $ref: '#/components/schemas/Price' }
    Price:
      type: object
      required: [currency]
      properties:
        currency: { type: string }
"#;

    fn cache_with_core() -> SchemaCache {
        let loader = MemoryLoader::new().with(LOC, CORE);
        let mut cache = SchemaCache::new();
        cache
            .fetch_and_store(&SchemaLocation::new(LOC), &loader)
            .unwrap();
        cache
    }

    #[test]
    fn inline_schema_outcomes() {
        let checker = JsonSchemaChecker::default();
        let cache = SchemaCache::new();
        let schema = json!({ "type": "object", "required": ["id"] });
        assert!(checker.check(&schema, &cache, &json!({ "id": 1 })).unwrap().is_valid());
        match checker.check(&schema, &cache, &json!({})).unwrap() {
            CheckOutcome::Invalid { message, instance_path } => {
                assert!(message.contains("id"), "message: {message}");
                assert_eq!(instance_path, "");
            }
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn reference_into_cached_document() {
        let checker = JsonSchemaChecker::default();
        let cache = cache_with_core();
        let schema = json!({ "$ref": format!("{LOC}#/components/schemas/Order") });

        let good = json!({ "id": "o1", "price": { "currency": "INR" } });
        assert!(checker.check(&schema, &cache, &good).unwrap().is_valid());

        let bad = json!({ "id": "o1", "price": {} });
        match checker.check(&schema, &cache, &bad).unwrap() {
            CheckOutcome::Invalid { instance_path, .. } => assert_eq!(instance_path, "/price"),
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn reference_outside_run_is_build_error() {
        let checker = JsonSchemaChecker::default();
        let schema = json!({ "$ref": format!("{LOC}#/components/schemas/Order") });
        let err = checker
            .check(&schema, &SchemaCache::new(), &json!({}))
            .unwrap_err();
        assert!(matches!(err, CheckerError::Build { .. }));
    }
}
