//! # Payload Traversal
//!
//! Depth-first, pre-order walk over a payload that threads the inherited
//! type-annotation pointer down the tree. Every object that declares a type
//! name is handed to a [`Visitor`] before its children are visited, so the
//! visitor sees nodes (and appends errors) in document order.
//!
//! Paths are slash-joined keys with bracketed array indices and no leading
//! separator: `message/order/beckn:orderItems[0]`. The payload root is `""`.

use serde_json::Value;

/// An object that declares a type name, with its traversal context.
#[derive(Debug, Clone, Copy)]
pub struct TypedNode<'a> {
    pub instance: &'a Value,
    pub type_name: &'a str,
    pub path: &'a str,
    /// Own pointer if declared, else the nearest ancestor's.
    pub pointer: Option<&'a str>,
}

/// Receives typed nodes in pre-order.
pub trait Visitor {
    fn visit(&mut self, node: &TypedNode<'_>);
}

/// Walks payloads using the configured annotation property names.
#[derive(Debug, Clone, Copy)]
pub struct Walker<'c> {
    annotation_property: &'c str,
    type_property: &'c str,
}

impl<'c> Walker<'c> {
    pub fn new(annotation_property: &'c str, type_property: &'c str) -> Self {
        Self {
            annotation_property,
            type_property,
        }
    }

    /// Visit every typed object of `root`. The payload is never modified.
    pub fn walk(&self, root: &Value, visitor: &mut dyn Visitor) {
        self.descend(root, String::new(), None, visitor);
    }

    fn descend<'a>(
        &self,
        value: &'a Value,
        path: String,
        inherited: Option<&'a str>,
        visitor: &mut dyn Visitor,
    ) {
        match value {
            Value::Object(map) => {
                // Non-string annotations do not count as declarations.
                let own = map.get(self.annotation_property).and_then(Value::as_str);
                let pointer = own.or(inherited);

                if let Some(type_name) = map.get(self.type_property).and_then(Value::as_str) {
                    visitor.visit(&TypedNode {
                        instance: value,
                        type_name,
                        path: &path,
                        pointer,
                    });
                }

                for (key, child) in map {
                    let child_path = if path.is_empty() {
                        key.clone()
                    } else {
                        format!("{path}/{key}")
                    };
                    self.descend(child, child_path, pointer, visitor);
                }
            }
            Value::Array(items) => {
                for (idx, item) in items.iter().enumerate() {
                    self.descend(item, format!("{path}[{idx}]"), inherited, visitor);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Records `(path, type, pointer)` per visit.
    #[derive(Default)]
    struct Recorder(Vec<(String, String, Option<String>)>);

    impl Visitor for Recorder {
        fn visit(&mut self, node: &TypedNode<'_>) {
            self.0.push((
                node.path.to_string(),
                node.type_name.to_string(),
                node.pointer.map(str::to_string),
            ));
        }
    }

    fn walk(payload: &Value) -> Vec<(String, String, Option<String>)> {
        let mut rec = Recorder::default();
        Walker::new("@context", "@type").walk(payload, &mut rec);
        rec.0
    }

    #[test]
    fn pre_order_with_paths() {
        let payload = json!({
            "@type": "beckn:Message",
            "message": {
                "order": {
                    "@type": "beckn:Order",
                    "items": [
                        { "@type": "beckn:Item" },
                        { "@type": "beckn:Item", "offer": { "@type": "beckn:Offer" } }
                    ]
                }
            }
        });
        let paths: Vec<_> = walk(&payload).into_iter().map(|(p, t, _)| (p, t)).collect();
        assert_eq!(
            paths,
            vec![
                ("".to_string(), "beckn:Message".to_string()),
                ("message/order".to_string(), "beckn:Order".to_string()),
                ("message/order/items[0]".to_string(), "beckn:Item".to_string()),
                ("message/order/items[1]".to_string(), "beckn:Item".to_string()),
                ("message/order/items[1]/offer".to_string(), "beckn:Offer".to_string()),
            ]
        );
    }

    #[test]
    fn context_is_inherited_and_shadowed() {
        let payload = json!({
            "@context": "A",
            "@type": "beckn:Order",
            "child": {
                "@type": "beckn:Item",
                "inner": { "@context": "B", "@type": "X", "leaf": { "@type": "Y" } }
            },
            "sibling": { "@type": "beckn:Offer" }
        });
        let visits = walk(&payload);
        let ctx: Vec<_> = visits
            .iter()
            .map(|(p, _, c)| (p.as_str(), c.as_deref()))
            .collect();
        assert_eq!(
            ctx,
            vec![
                ("", Some("A")),
                ("child", Some("A")),
                ("child/inner", Some("B")),
                ("child/inner/leaf", Some("B")),
                ("sibling", Some("A")),
            ]
        );
    }

    #[test]
    fn untyped_objects_are_descended_not_visited() {
        let payload = json!({
            "context": { "@context": "C", "nested": [[{ "@type": "T" }]] }
        });
        let visits = walk(&payload);
        assert_eq!(visits.len(), 1);
        assert_eq!(visits[0].0, "context/nested[0][0]");
        assert_eq!(visits[0].2.as_deref(), Some("C"));
    }

    #[test]
    fn non_string_annotations_are_ignored() {
        let payload = json!({
            "@context": ["A", "B"],
            "@type": "beckn:Order",
            "typed": { "@type": 7 }
        });
        let visits = walk(&payload);
        assert_eq!(visits.len(), 1);
        assert_eq!(visits[0].2, None);
    }

    #[test]
    fn root_array_paths() {
        let visits = walk(&json!([{ "@type": "A" }, { "@type": "B" }]));
        let paths: Vec<_> = visits.iter().map(|v| v.0.as_str()).collect();
        assert_eq!(paths, vec!["[0]", "[1]"]);
    }
}
