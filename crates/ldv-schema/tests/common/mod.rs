//! Shared fixtures for engine integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;

use ldv_core::{LoadError, SchemaLoader, SchemaLocation, ValidationError, ValidatorConfig};
use ldv_schema::{JsonSchemaChecker, RunOptions, SchemaStore, Validator};
use serde_json::Value;

pub const BASE: &str = "https://raw.githubusercontent.com/beckn/schemas/refs/heads";

pub fn core_pointer(branch: &str) -> String {
    format!("{BASE}/{branch}/schema/core/v2/context.jsonld")
}

pub fn core_location(branch: &str) -> String {
    format!("{BASE}/{branch}/schema/core/v2/attributes.yaml")
}

pub fn composed_pointer(branch: &str) -> String {
    format!("{BASE}/{branch}/schema/composed/ev-charging/v2/context.jsonld")
}

pub fn constraints_location(branch: &str) -> String {
    format!("{BASE}/{branch}/schema/composed/ev-charging/v2/constraints.yaml")
}

pub fn attribute_pointer(branch: &str) -> String {
    format!("{BASE}/{branch}/schema/EvChargingOffer/v1/context.jsonld")
}

pub fn attribute_location(branch: &str) -> String {
    format!("{BASE}/{branch}/schema/EvChargingOffer/v1/attributes.yaml")
}

/// Core package with `ns:`-prefixed property names.
pub const CORE_SCHEMA: &str = r#"
openapi: 3.1.0
info: { title: core, version: 2.0.0 }
components:
  schemas:
    Order:
      type: object
      required: ["ns:id"]
      properties:
        ns:id: { type: string }
        ns:items:
          type: array
          items: { $ref: '#/components/schemas/Item' }
    Item:
      type: object
      properties:
        ns:quantity: { type: integer, minimum: 1 }
    Offer:
      type: object
      required: ["ns:price"]
      properties:
        ns:price: { type: number }
"#;

/// Attribute package with a closed `ChargingOffer`.
pub const ATTRIBUTE_SCHEMA: &str = r#"
components:
  schemas:
    ChargingOffer:
      type: object
      additionalProperties: false
      properties:
        id: { type: string }
        tariffModel: { $ref: '#/components/schemas/TariffModel' }
    TariffModel:
      type: string
      enum: [PER_KWH, PER_MINUTE]
"#;

/// Constraints of the composed package.
pub const CONSTRAINTS: &str = r#"
constraints:
  - target: { type: ChargingOffer }
    rules:
      - property: tariffModel
        required: true
        message: "ChargingOffer requires tariffModel"
  - target: { type: "ns:Offer" }
    rules:
      - property: currency
        equals: INR
        message: "Offers must be priced in INR"
schemaMapping:
  ChargingOffer: EvChargingOffer/v1
"#;

/// In-memory loader that counts fetches per location.
#[derive(Default)]
pub struct MemoryLoader {
    documents: HashMap<String, String>,
    fetches: RefCell<Vec<String>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, location: impl Into<String>, body: &str) -> Self {
        self.documents.insert(location.into(), body.to_string());
        self
    }

    /// Core, attribute and constraints documents on `branch`.
    pub fn published(branch: &str) -> Self {
        Self::new()
            .with(core_location(branch), CORE_SCHEMA)
            .with(attribute_location(branch), ATTRIBUTE_SCHEMA)
            .with(constraints_location(branch), CONSTRAINTS)
    }

    pub fn fetch_count(&self, location: &str) -> usize {
        self.fetches.borrow().iter().filter(|l| *l == location).count()
    }

    pub fn total_fetches(&self) -> usize {
        self.fetches.borrow().len()
    }
}

impl SchemaLoader for MemoryLoader {
    fn load(&self, location: &SchemaLocation) -> Result<String, LoadError> {
        self.fetches.borrow_mut().push(location.as_str().to_string());
        self.documents
            .get(location.as_str())
            .cloned()
            .ok_or_else(|| LoadError::NotFound {
                location: location.to_string(),
            })
    }
}

/// Configuration with `ns` as the core namespace.
pub fn config() -> ValidatorConfig {
    ValidatorConfig::from_yaml_str("core_namespace: ns\n").unwrap()
}

pub fn validate(loader: &MemoryLoader, payload: &Value) -> Vec<ValidationError> {
    validate_with(loader, &config(), RunOptions::default(), payload, &mut SchemaStore::new())
}

pub fn validate_with(
    loader: &MemoryLoader,
    config: &ValidatorConfig,
    options: RunOptions,
    payload: &Value,
    store: &mut SchemaStore,
) -> Vec<ValidationError> {
    let checker = JsonSchemaChecker::default();
    Validator::new(config, loader, &checker)
        .with_options(options)
        .validate(payload, store)
}
