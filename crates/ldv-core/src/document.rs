//! Decoding fetched text into a `serde_json::Value` tree.
//!
//! Attribute and constraints documents are YAML (OpenAPI style); context
//! documents are JSON. JSON is tried first, YAML second, and the YAML tree
//! is converted to the JSON data model so the rest of the stack works on a
//! single value type.

use serde_json::Value;

use crate::error::DocumentError;

/// Parse JSON or YAML text into a JSON value tree.
///
/// # Errors
///
/// [`DocumentError::Yaml`] when the text is neither JSON nor YAML,
/// [`DocumentError::Conversion`] when the YAML uses constructs that JSON
/// cannot represent (non-scalar map keys, non-finite floats).
pub fn parse_document(text: &str) -> Result<Value, DocumentError> {
    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return Ok(value);
    }
    let yaml: serde_yaml::Value =
        serde_yaml::from_str(text).map_err(|e| DocumentError::Yaml(e.to_string()))?;
    yaml_to_json_value(&yaml).map_err(DocumentError::Conversion)
}

/// Convert a `serde_yaml::Value` to a `serde_json::Value`.
///
/// OpenAPI documents key responses by status code (`200:`), so numeric and
/// boolean keys are stringified rather than rejected. Tags are ignored.
fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Number(serde_json::Number::from(i)))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::Number(serde_json::Number::from(u)))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("cannot represent float {f} in JSON"))
            } else {
                Err(format!("unsupported YAML number: {n:?}"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => {
            let items: Result<Vec<Value>, String> = seq.iter().map(yaml_to_json_value).collect();
            Ok(Value::Array(items?))
        }
        serde_yaml::Value::Mapping(map) => {
            let mut json_map = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported YAML map key type: {other:?}")),
                };
                json_map.insert(key, yaml_to_json_value(v)?);
            }
            Ok(Value::Object(json_map))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}
