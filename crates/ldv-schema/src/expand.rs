//! JSON-LD term expansion against a composed context.
//!
//! [`TermExpander`] reads the `@context` term map of the composed package
//! and rewrites property names and type values that are defined terms or
//! `prefix:local` CURIEs into absolute IRIs. Annotation pointers are dropped
//! from the output, as in expanded JSON-LD.

use std::collections::HashMap;

use ldv_core::{parse_document, Pointer, SchemaLoader, SchemaLocation};
use serde_json::{Map, Value};

/// Result of an expansion attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Expansion {
    /// The expanded payload, or the input unchanged when `errors` is non-empty.
    pub document: Value,
    pub errors: Vec<String>,
}

impl Expansion {
    fn failed(payload: &Value, reason: impl std::fmt::Display) -> Self {
        Self {
            document: payload.clone(),
            errors: vec![format!("JSON-LD expansion failed: {reason}")],
        }
    }
}

/// Expands a payload using the context a pointer names.
pub trait Expander {
    fn expand(&self, payload: &Value, context: &Pointer) -> Expansion;
}

/// [`Expander`] limited to term and CURIE substitution.
pub struct TermExpander<'l> {
    loader: &'l dyn SchemaLoader,
    annotation_property: String,
    type_property: String,
}

impl<'l> TermExpander<'l> {
    pub fn new(
        loader: &'l dyn SchemaLoader,
        annotation_property: impl Into<String>,
        type_property: impl Into<String>,
    ) -> Self {
        Self {
            loader,
            annotation_property: annotation_property.into(),
            type_property: type_property.into(),
        }
    }
}

impl Expander for TermExpander<'_> {
    fn expand(&self, payload: &Value, context: &Pointer) -> Expansion {
        let location = SchemaLocation::new(context.as_str());
        let text = match self.loader.load(&location) {
            Ok(text) => text,
            Err(e) => return Expansion::failed(payload, e),
        };
        let document = match parse_document(&text) {
            Ok(document) => document,
            Err(e) => return Expansion::failed(payload, e),
        };
        let Some(definitions) = document.get("@context").and_then(Value::as_object) else {
            return Expansion::failed(payload, format!("{location} has no @context map"));
        };

        let terms = Terms::from_definitions(definitions);
        tracing::debug!(%location, terms = terms.0.len(), "expanding with composed context");
        Expansion {
            document: self.rewrite(payload, &terms),
            errors: Vec::new(),
        }
    }
}

impl TermExpander<'_> {
    fn rewrite(&self, value: &Value, terms: &Terms) -> Value {
        match value {
            Value::Object(map) => {
                let mut out = Map::with_capacity(map.len());
                for (key, child) in map {
                    if *key == self.annotation_property {
                        continue;
                    }
                    let expanded = if *key == self.type_property {
                        expand_type_values(child, terms)
                    } else {
                        self.rewrite(child, terms)
                    };
                    let name = if key.starts_with('@') {
                        key.clone()
                    } else {
                        terms.expand(key).unwrap_or_else(|| key.clone())
                    };
                    out.insert(name, expanded);
                }
                Value::Object(out)
            }
            Value::Array(items) => Value::Array(items.iter().map(|v| self.rewrite(v, terms)).collect()),
            other => other.clone(),
        }
    }
}

fn expand_type_values(value: &Value, terms: &Terms) -> Value {
    match value {
        Value::String(s) => Value::String(terms.expand(s).unwrap_or_else(|| s.clone())),
        Value::Array(items) => Value::Array(items.iter().map(|v| expand_type_values(v, terms)).collect()),
        other => other.clone(),
    }
}

/// Term name to IRI.
struct Terms(HashMap<String, String>);

impl Terms {
    fn from_definitions(definitions: &Map<String, Value>) -> Self {
        let raw = definitions
            .iter()
            .filter(|(term, _)| !term.starts_with('@'))
            .filter_map(|(term, def)| {
                let iri = match def {
                    Value::String(iri) => iri.as_str(),
                    Value::Object(obj) => obj.get("@id")?.as_str()?,
                    _ => return None,
                };
                Some((term.clone(), iri.to_string()))
            })
            .collect();
        Self(raw)
    }

    /// Absolute IRI of a term or CURIE; `None` when neither applies.
    fn expand(&self, name: &str) -> Option<String> {
        if let Some(iri) = self.0.get(name) {
            return Some(self.expand_curie(iri).unwrap_or_else(|| iri.clone()));
        }
        self.expand_curie(name)
    }

    fn expand_curie(&self, name: &str) -> Option<String> {
        let (prefix, local) = name.split_once(':')?;
        if local.starts_with("//") {
            return None;
        }
        let base = self.0.get(prefix)?;
        Some(format!("{base}{local}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryLoader;
    use ldv_core::PointerConventions;
    use serde_json::json;

    const CONTEXT: &str = "https://h/o/r/refs/heads/main/schema/composed/p2p/v2/context.jsonld";

    fn context_body() -> String {
        json!({
            "@context": {
                "@version": 1.1,
                "beckn": "https://schema.beckn.io/",
                "schema": "https://schema.org/",
                "Order": "beckn:Order",
                "price": { "@id": "schema:price", "@type": "@id" }
            }
        })
        .to_string()
    }

    fn pointer() -> Pointer {
        PointerConventions::default().pointer(CONTEXT)
    }

    #[test]
    fn terms_and_curies_become_iris() {
        let loader = MemoryLoader::new().with(CONTEXT, &context_body());
        let expander = TermExpander::new(&loader, "@context", "@type");
        let payload = json!({
            "@context": CONTEXT,
            "@type": "Order",
            "beckn:id": "o1",
            "price": 10,
            "items": [{ "@type": ["beckn:Item", "Local"], "unknown": true }]
        });
        let out = expander.expand(&payload, &pointer());
        assert!(out.errors.is_empty());
        assert_eq!(
            out.document,
            json!({
                "@type": "https://schema.beckn.io/Order",
                "https://schema.beckn.io/id": "o1",
                "https://schema.org/price": 10,
                "items": [{ "@type": ["https://schema.beckn.io/Item", "Local"], "unknown": true }]
            })
        );
    }

    #[test]
    fn absolute_iris_are_not_curies() {
        let loader = MemoryLoader::new().with(CONTEXT, &context_body());
        let expander = TermExpander::new(&loader, "@context", "@type");
        let payload = json!({ "https://x.org/a": 1 });
        assert_eq!(expander.expand(&payload, &pointer()).document, payload);
    }

    #[test]
    fn missing_context_reports_and_keeps_payload() {
        let loader = MemoryLoader::new();
        let expander = TermExpander::new(&loader, "@context", "@type");
        let payload = json!({ "@context": CONTEXT, "@type": "Order" });
        let out = expander.expand(&payload, &pointer());
        assert_eq!(out.document, payload);
        assert_eq!(out.errors.len(), 1);
        assert!(out.errors[0].starts_with("JSON-LD expansion failed:"));
    }

    #[test]
    fn context_without_term_map_is_an_error() {
        let loader = MemoryLoader::new().with(CONTEXT, r#"{"name": "not a context"}"#);
        let expander = TermExpander::new(&loader, "@context", "@type");
        let out = expander.expand(&json!({}), &pointer());
        assert_eq!(out.errors.len(), 1);
    }
}
