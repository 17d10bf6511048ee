//! # Declarative Constraints
//!
//! A composed package may publish a constraints document next to its
//! context. It carries rules that are not expressible in the attribute
//! schemas because they depend on how packages are combined:
//!
//! ```yaml
//! constraints:
//!   - target: { type: "beckn:Offer" }
//!     rules:
//!       - property: "beckn:price.currency"
//!         required: true
//!         equals: "INR"
//!         message: "Offers must be priced in INR"
//! schemaMapping:
//!   EnergyResource: EnergyResource/v0.2
//! ```
//!
//! Rules are evaluated before structural validation. Whether a failure
//! suppresses structural validation is the dispatcher's decision.
//!
//! Entries are read one by one: a malformed constraint, rule or mapping
//! entry is logged and dropped without affecting its neighbours.

use std::collections::HashMap;
use std::sync::Arc;

use ldv_core::{Pointer, PointerConventions, SchemaLoader, SchemaLocation, ValidationError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::cache::fetch_document;

const DEFAULT_MESSAGE: &str = "Constraint violation";

/// Contents of one constraints document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ConstraintSet {
    #[serde(default, deserialize_with = "each_entry")]
    pub constraints: Vec<Constraint>,
    /// Attribute type name to `<package>/<version>` path.
    #[serde(default, rename = "schemaMapping", deserialize_with = "string_entries")]
    pub schema_mapping: HashMap<String, String>,
}

/// Rules scoped to one type name.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Constraint {
    #[serde(default)]
    pub target: Target,
    #[serde(default, deserialize_with = "each_entry")]
    pub rules: Vec<Rule>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Target {
    /// Full type name as written in payloads, prefix included.
    #[serde(default, rename = "type")]
    pub type_name: String,
}

/// A single rule: presence and/or equality of one dot-separated property path.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Rule {
    #[serde(default)]
    pub property: String,
    #[serde(default)]
    pub required: bool,
    /// `Some(Value::Null)` for an explicit `equals: null`.
    #[serde(default, deserialize_with = "explicit")]
    pub equals: Option<Value>,
    /// Absent or `null` falls back to a generic message.
    #[serde(default)]
    pub message: Option<String>,
}

impl Rule {
    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or(DEFAULT_MESSAGE)
    }
}

/// Any present value, `null` included, becomes `Some`.
fn explicit<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// A list whose unreadable entries are skipped. `null` reads as empty.
fn each_entry<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let entries = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value(entry) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!(index, error = %e, "skipping malformed constraints entry");
                None
            }
        })
        .collect())
}

/// A mapping whose non-string values are skipped. `null` reads as empty.
fn string_entries<'de, D>(deserializer: D) -> Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(entries
        .into_iter()
        .filter_map(|(type_name, target)| match target {
            Value::String(path) => Some((type_name, path)),
            other => {
                tracing::warn!(%type_name, value = %other, "skipping non-string schema mapping");
                None
            }
        })
        .collect())
}

/// Equality with numbers compared by value, so `10` equals `10.0`.
pub fn deep_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => {
            if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
                a == b
            } else if let (Some(a), Some(b)) = (a.as_u64(), b.as_u64()) {
                a == b
            } else {
                a.as_f64() == b.as_f64()
            }
        }
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| deep_equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(key, x)| b.get(key).is_some_and(|y| deep_equal(x, y)))
        }
        _ => left == right,
    }
}

impl ConstraintSet {
    /// Evaluate every rule targeting `type_name` against `instance`.
    ///
    /// Each failure appends one error at `path`. Returns `true` when no rule
    /// failed. A failed `required` skips the equality check of the same rule.
    pub fn apply(
        &self,
        instance: &Value,
        type_name: &str,
        path: &str,
        errors: &mut Vec<ValidationError>,
    ) -> bool {
        let mut passed = true;
        let rules = self
            .constraints
            .iter()
            .filter(|c| !c.target.type_name.is_empty() && c.target.type_name == type_name)
            .flat_map(|c| c.rules.iter());

        for rule in rules {
            if rule.required && property_at(instance, &rule.property).is_none() {
                tracing::warn!(path = %display_path(path), property = %rule.property, "constraint violation: required property missing");
                errors.push(ValidationError::new(path, rule.message()));
                passed = false;
                continue;
            }
            if let Some(expected) = &rule.equals {
                let actual = property_at(instance, &rule.property).unwrap_or(&Value::Null);
                if !deep_equal(actual, expected) {
                    tracing::warn!(path = %display_path(path), property = %rule.property, "constraint violation: unexpected value");
                    errors.push(ValidationError::new(path, rule.message()));
                    passed = false;
                }
            }
        }
        passed
    }

    /// `<package>/<version>` path mapped for an attribute type.
    pub fn mapping_for(&self, type_name: &str) -> Option<&str> {
        self.schema_mapping.get(type_name).map(String::as_str)
    }
}

/// Follow a dot-separated path through nested objects.
///
/// A missing key or a non-object on the way means absent.
pub fn property_at<'a>(instance: &'a Value, dotted: &str) -> Option<&'a Value> {
    dotted
        .split('.')
        .try_fold(instance, |current, key| current.as_object()?.get(key))
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "root"
    } else {
        path
    }
}

// ---------------------------------------------------------------------------
// Index
// ---------------------------------------------------------------------------

/// Run-scoped constraints by location, absence included.
#[derive(Debug, Default)]
pub struct ConstraintIndex {
    sets: HashMap<SchemaLocation, Option<Arc<ConstraintSet>>>,
}

impl ConstraintIndex {
    /// Number of locations with a settled outcome.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Constraints of a composed pointer, fetching on first use.
    ///
    /// `None` for non-composed pointers, missing documents and documents
    /// that cannot be read as a constraint set. Missing and malformed
    /// documents are remembered for the run; transport failures are retried
    /// on the next request.
    pub fn load(
        &mut self,
        pointer: &Pointer,
        conventions: &PointerConventions,
        loader: &dyn SchemaLoader,
    ) -> Option<Arc<ConstraintSet>> {
        if !pointer.is_composed() {
            return None;
        }
        let location = conventions.constraints_location(pointer.as_str())?;
        if let Some(settled) = self.sets.get(&location) {
            return settled.clone();
        }

        let document = match fetch_document(&location, loader) {
            Ok(document) => document,
            Err(e) if e.is_not_found() => {
                tracing::debug!(%location, "no constraints published");
                self.sets.insert(location, None);
                return None;
            }
            Err(crate::error::FetchError::Decode { source, .. }) => {
                tracing::warn!(%location, error = %source, "failed to decode constraints");
                self.sets.insert(location, None);
                return None;
            }
            Err(e) => {
                tracing::warn!(%location, error = %e, "failed to load constraints");
                return None;
            }
        };

        let settled = match ConstraintSet::deserialize(document.as_ref()) {
            Ok(set) => {
                tracing::info!(%location, constraints = set.constraints.len(), "loaded constraints");
                Some(Arc::new(set))
            }
            Err(e) => {
                tracing::warn!(%location, error = %e, "constraints document has unexpected shape");
                None
            }
        };
        self.sets.insert(location, settled.clone());
        settled
    }
}
