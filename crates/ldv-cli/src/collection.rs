//! Postman collection support.
//!
//! A collection is recognised by `info._postman_id`. Its request items may
//! be nested in folders to any depth; every item whose body is in `raw`
//! mode and parses as JSON yields one payload. Other bodies are skipped.

use serde_json::Value;

/// One request body extracted from a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestBody {
    /// Folder and item names joined with `/`.
    pub name: String,
    pub payload: Value,
}

/// True when `document` is a Postman collection.
pub fn is_collection(document: &Value) -> bool {
    document
        .get("info")
        .and_then(Value::as_object)
        .is_some_and(|info| info.contains_key("_postman_id"))
}

/// Every parseable raw request body, in collection order.
pub fn request_bodies(collection: &Value) -> Vec<RequestBody> {
    let mut out = Vec::new();
    if let Some(items) = collection.get("item").and_then(Value::as_array) {
        collect(items, "", &mut out);
    }
    out
}

fn collect(items: &[Value], prefix: &str, out: &mut Vec<RequestBody>) {
    for (idx, item) in items.iter().enumerate() {
        let label = item
            .get("name")
            .and_then(Value::as_str)
            .map_or_else(|| format!("item[{idx}]"), str::to_string);
        let name = if prefix.is_empty() {
            label
        } else {
            format!("{prefix}/{label}")
        };

        if let Some(children) = item.get("item").and_then(Value::as_array) {
            collect(children, &name, out);
        }

        let Some(body) = item.get("request").and_then(|r| r.get("body")) else {
            continue;
        };
        if body.get("mode").and_then(Value::as_str) != Some("raw") {
            continue;
        }
        let Some(raw) = body.get("raw").and_then(Value::as_str) else {
            continue;
        };
        match serde_json::from_str(raw) {
            Ok(payload) => out.push(RequestBody { name, payload }),
            Err(e) => tracing::debug!(item = %name, error = %e, "request body is not JSON; skipped"),
        }
    }
}
