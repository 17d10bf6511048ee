//! # Validation Dispatch
//!
//! The [`Visitor`] that decides, per typed node, which schema applies and
//! how to check it.
//!
//! ## Core Objects
//!
//! Type name carries the core namespace (`beckn:Order`). The node's pointer
//! must be a core or composed pointer; a composed one is rewritten to the
//! core package of the same branch and version. Constraints run first and a
//! failure suppresses the structural check. Structural strategies, in order:
//!
//! 1. `{"$ref": "<location>#/components/schemas/<Type>"}` so nested
//!    references resolve inside the full document;
//! 2. the fragment on its own.
//!
//! ## Attribute Objects
//!
//! Everything else. Constraints are reported but do not suppress the
//! structural check. A missing or composed pointer is replaced by the one
//! the composed package's `schemaMapping` names for the type. Strategies:
//!
//! 1. the fragment with references made absolute and annotation properties
//!    allowed, resolved against the whole run cache;
//! 2. the fragment with annotation properties allowed, on its own.
//!
//! A strategy that yields an outcome ends the chain. A strategy that cannot
//! be evaluated hands over to the next one. When all fail the node is
//! skipped with a warning.

use std::sync::Arc;

use ldv_core::{
    local_type_name, NodeClass, Pointer, SchemaLoader, ValidationError, ValidatorConfig,
};
use serde_json::{json, Map, Value};

use crate::cache::{BranchChain, SchemaStore};
use crate::checker::{CheckOutcome, SchemaChecker};
use crate::constraints::ConstraintSet;
use crate::fallback::first_success;
use crate::refs::{absolutize, relax_for_annotations};
use crate::validator::RunOptions;
use crate::walker::{TypedNode, Visitor};

/// Per-payload dispatcher. Collects errors in visit order.
pub struct Dispatcher<'r> {
    config: &'r ValidatorConfig,
    loader: &'r dyn SchemaLoader,
    checker: &'r dyn SchemaChecker,
    options: RunOptions,
    store: &'r mut SchemaStore,
    /// Constraints of the payload's composed root pointer, when published.
    root_constraints: Option<Arc<ConstraintSet>>,
    errors: Vec<ValidationError>,
}

impl<'r> Dispatcher<'r> {
    pub fn new(
        config: &'r ValidatorConfig,
        loader: &'r dyn SchemaLoader,
        checker: &'r dyn SchemaChecker,
        options: RunOptions,
        store: &'r mut SchemaStore,
    ) -> Self {
        Self {
            config,
            loader,
            checker,
            options,
            store,
            root_constraints: None,
            errors: Vec::new(),
        }
    }

    /// Use the constraints of `root` for every node when it is composed.
    pub fn with_root_pointer(mut self, root: Option<&Pointer>) -> Self {
        self.root_constraints = root.and_then(|p| {
            self.store
                .constraints
                .load(p, &self.config.conventions, self.loader)
        });
        self
    }

    /// Errors recorded so far, in visit order.
    pub fn finish(self) -> Vec<ValidationError> {
        self.errors
    }

    /// Root constraints when present, else those of the node's composed pointer.
    fn constraints_for(&mut self, pointer: Option<&Pointer>) -> Option<Arc<ConstraintSet>> {
        if let Some(root) = &self.root_constraints {
            return Some(Arc::clone(root));
        }
        let pointer = pointer.filter(|p| p.is_composed())?;
        self.store
            .constraints
            .load(pointer, &self.config.conventions, self.loader)
    }

    fn validate_core(&mut self, node: &TypedNode<'_>, pointer: Option<&Pointer>) {
        let Some(pointer) = pointer.filter(|p| p.is_core() || p.is_composed()) else {
            tracing::debug!(path = %display_path(node.path), type_name = node.type_name, "no core pointer; skipping");
            return;
        };
        let conventions = &self.config.conventions;
        let core = conventions.core_counterpart(pointer);
        let location = conventions.schema_location(core.as_str());
        let chain = BranchChain::new(
            conventions,
            conventions.branch_of(core.as_str()),
            &self.config.branch_fallbacks,
        );

        let document = match self.store.cache.resolve(&location, &chain, self.loader) {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!(%location, error = %e, "failed to load core schema");
                return;
            }
        };

        let name = local_type_name(node.type_name);
        let Some(fragment) = schemas_of(&document).and_then(|s| s.get(name)) else {
            tracing::debug!(%location, type_name = name, "type not defined in core schema; skipping");
            return;
        };

        tracing::info!(type_name = name, path = %display_path(node.path), "validating");

        if let Some(constraints) = self.constraints_for(Some(pointer)) {
            if !constraints.apply(node.instance, node.type_name, node.path, &mut self.errors) {
                tracing::debug!(path = %display_path(node.path), "constraint failure; structural check suppressed");
                return;
            }
        }

        let reference = json!({
            "$ref": location.reference(&format!("/components/schemas/{}", escape_pointer_token(name)))
        });
        let strategies = [reference, fragment.clone()];
        if let Some(outcome) = self.check_with_fallback(&strategies, node) {
            self.record(node, name, outcome, None);
        }
    }

    fn validate_attribute(&mut self, node: &TypedNode<'_>, pointer: Option<&Pointer>) {
        if self.options.core_only {
            tracing::debug!(path = %display_path(node.path), type_name = node.type_name, "core-only run; attribute object skipped");
            return;
        }

        if let Some(constraints) = self.constraints_for(pointer) {
            constraints.apply(node.instance, node.type_name, node.path, &mut self.errors);
        }

        let type_name = local_type_name(node.type_name);
        let target = match pointer {
            Some(p) if p.is_composed() => self.infer_pointer(p, type_name),
            Some(p) => Some(p.clone()),
            None => None,
        };
        let Some(target) = target else {
            tracing::debug!(path = %display_path(node.path), type_name, "no routable pointer; skipping");
            return;
        };

        let store = &mut *self.store;
        let Some(entry) = store.attributes.resolve(
            &target,
            &mut store.cache,
            &self.config.conventions,
            &self.config.branch_fallbacks,
            self.loader,
        ) else {
            return;
        };

        let Some((schema_key, fragment)) =
            schemas_of(&entry.document).and_then(|s| find_fragment(s, type_name))
        else {
            tracing::debug!(package = %entry.package, type_name, "type not defined in package; skipping");
            return;
        };

        tracing::info!(type_name = %schema_key, package = %entry.package, path = %display_path(node.path), "validating");

        let annotation = &self.config.annotation_property;
        let type_property = &self.config.type_property;
        let strategies = [
            relax_for_annotations(absolutize(fragment, &entry.location), annotation, type_property),
            relax_for_annotations(fragment.clone(), annotation, type_property),
        ];
        if let Some(outcome) = self.check_with_fallback(&strategies, node) {
            self.record(node, schema_key, outcome, Some(schema_key));
        }
    }

    /// Pointer of the package a composed pointer maps `type_name` to.
    fn infer_pointer(&mut self, composed: &Pointer, type_name: &str) -> Option<Pointer> {
        let constraints = self
            .store
            .constraints
            .load(composed, &self.config.conventions, self.loader)?;
        let mapping = constraints.mapping_for(type_name)?;
        let inferred = self.config.conventions.mapped_pointer(composed, mapping)?;
        tracing::debug!(type_name, pointer = %inferred, "pointer inferred from schema mapping");
        Some(inferred)
    }

    /// First strategy that yields an outcome; `None` when none could run.
    fn check_with_fallback(&self, strategies: &[Value], node: &TypedNode<'_>) -> Option<CheckOutcome> {
        let cache = &self.store.cache;
        match first_success(strategies, |schema| self.checker.check(schema, cache, node.instance)) {
            Ok(outcome) => Some(outcome),
            Err(errors) => {
                let reasons: Vec<String> = errors.iter().map(ToString::to_string).collect();
                tracing::warn!(path = %display_path(node.path), type_name = node.type_name, ?reasons, "schema could not be evaluated; skipping");
                None
            }
        }
    }

    fn record(&mut self, node: &TypedNode<'_>, name: &str, outcome: CheckOutcome, typed: Option<&str>) {
        match outcome {
            CheckOutcome::Valid => {
                tracing::info!(type_name = name, path = %display_path(node.path), "valid");
            }
            CheckOutcome::Invalid {
                message,
                instance_path,
            } => {
                let message = if instance_path.is_empty() {
                    message
                } else {
                    format!("{message} (at {instance_path})")
                };
                tracing::warn!(type_name = name, path = %display_path(node.path), %message, "invalid");
                let error = match typed {
                    Some(type_name) => ValidationError::typed(node.path, type_name, message),
                    None => ValidationError::new(node.path, message),
                };
                self.errors.push(error);
            }
        }
    }
}

impl Visitor for Dispatcher<'_> {
    fn visit(&mut self, node: &TypedNode<'_>) {
        let pointer = node
            .pointer
            .map(|raw| self.config.conventions.pointer(raw));
        match NodeClass::of(node.type_name, &self.config.core_namespace) {
            NodeClass::Core => self.validate_core(node, pointer.as_ref()),
            NodeClass::Attribute => self.validate_attribute(node, pointer.as_ref()),
        }
    }
}

/// `components.schemas` of a schema document.
fn schemas_of(document: &Value) -> Option<&Map<String, Value>> {
    document.get("components")?.get("schemas")?.as_object()
}

/// Exact key first, then the first case-insensitive match.
fn find_fragment<'d>(schemas: &'d Map<String, Value>, type_name: &str) -> Option<(&'d str, &'d Value)> {
    if let Some((key, value)) = schemas.get_key_value(type_name) {
        return Some((key.as_str(), value));
    }
    let wanted = type_name.to_lowercase();
    schemas
        .iter()
        .find(|(key, _)| key.to_lowercase() == wanted)
        .map(|(key, value)| (key.as_str(), value))
}

fn escape_pointer_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "root"
    } else {
        path
    }
}
