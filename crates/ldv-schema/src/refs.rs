//! Reference normalization for extracted schema fragments.
//!
//! A fragment lifted out of `components.schemas` keeps document-relative
//! references (`#/components/schemas/Price`). Once it is compiled on its own
//! those no longer point anywhere, so they are rewritten against the
//! location of the document they came from.

use ldv_core::SchemaLocation;
use serde_json::{Map, Value};

/// Rewrite every `$ref` that starts with `#` to `<base>#...`.
///
/// Recurses through all nested objects and arrays (`allOf`, `items`,
/// `properties`, ...). References that are already absolute are untouched,
/// so applying this twice is the same as applying it once.
pub fn absolutize(fragment: &Value, base: &SchemaLocation) -> Value {
    match fragment {
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, value) in map {
                let rewritten = match (key.as_str(), value) {
                    ("$ref", Value::String(r)) if r.starts_with('#') => {
                        Value::String(format!("{}{r}", base.as_str()))
                    }
                    _ => absolutize(value, base),
                };
                out.insert(key.clone(), rewritten);
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(|v| absolutize(v, base)).collect()),
        other => other.clone(),
    }
}

/// Allow the annotation properties on a closed object schema.
///
/// Only a fragment with `additionalProperties: false` is changed: both
/// property names are declared as `{type: string}`, creating `properties`
/// when it is missing.
pub fn relax_for_annotations(mut fragment: Value, annotation: &str, type_property: &str) -> Value {
    let Value::Object(map) = &mut fragment else {
        return fragment;
    };
    if map.get("additionalProperties") != Some(&Value::Bool(false)) {
        return fragment;
    }
    let properties = map
        .entry("properties")
        .or_insert_with(|| Value::Object(Map::new()));
    if let Value::Object(props) = properties {
        for name in [annotation, type_property] {
            props.insert(name.to_string(), serde_json::json!({ "type": "string" }));
        }
    }
    fragment
}
