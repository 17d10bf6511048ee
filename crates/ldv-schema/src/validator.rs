//! Top-level validation entry point.

use ldv_core::{Pointer, SchemaLoader, ValidationError, ValidatorConfig};
use serde_json::Value;

use crate::cache::SchemaStore;
use crate::checker::SchemaChecker;
use crate::dispatch::Dispatcher;
use crate::expand::Expander;
use crate::walker::Walker;

/// Per-run switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Validate core objects only; attribute objects are skipped.
    pub core_only: bool,
    /// Expand the payload against its composed root context first.
    pub jsonld: bool,
}

/// Validates payloads against remotely published schemas.
///
/// Holds no run state. Everything fetched is recorded in the
/// [`SchemaStore`] passed to [`validate`](Self::validate), so several
/// payloads validated with the same store share one fetch per document.
///
/// ```no_run
/// use ldv_core::ValidatorConfig;
/// use ldv_schema::{JsonSchemaChecker, SchemaStore, Validator};
/// # fn demo(loader: &dyn ldv_core::SchemaLoader, payload: &serde_json::Value) {
/// let config = ValidatorConfig::default();
/// let checker = JsonSchemaChecker::default();
/// let validator = Validator::new(&config, loader, &checker);
/// let mut store = SchemaStore::new();
/// for error in validator.validate(payload, &mut store) {
///     println!("{error}");
/// }
/// # }
/// ```
pub struct Validator<'a> {
    config: &'a ValidatorConfig,
    loader: &'a dyn SchemaLoader,
    checker: &'a dyn SchemaChecker,
    expander: Option<&'a dyn Expander>,
    options: RunOptions,
}

impl<'a> Validator<'a> {
    pub fn new(
        config: &'a ValidatorConfig,
        loader: &'a dyn SchemaLoader,
        checker: &'a dyn SchemaChecker,
    ) -> Self {
        Self {
            config,
            loader,
            checker,
            expander: None,
            options: RunOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    /// Expander used when [`RunOptions::jsonld`] is set.
    pub fn with_expander(mut self, expander: &'a dyn Expander) -> Self {
        self.expander = Some(expander);
        self
    }

    /// Validate one payload. An empty result means valid.
    ///
    /// Errors are ordered by the pre-order position of the offending node.
    /// Fetch and schema failures never abort the run: the affected node is
    /// skipped and the failure logged.
    pub fn validate(&self, payload: &Value, store: &mut SchemaStore) -> Vec<ValidationError> {
        let root = root_pointer(payload, self.config);
        let composed_root = root.as_ref().filter(|p| p.is_composed());

        let mut errors = Vec::new();
        let mut expanded = None;
        if self.options.jsonld {
            match (composed_root, self.expander) {
                (Some(pointer), Some(expander)) => {
                    tracing::info!(context = %pointer, "expanding payload with composed context");
                    let expansion = expander.expand(payload, pointer);
                    if expansion.errors.is_empty() {
                        expanded = Some(expansion.document);
                    } else {
                        tracing::warn!("expansion failed; validating original payload");
                        errors.extend(
                            expansion
                                .errors
                                .into_iter()
                                .map(|message| ValidationError::new("", message)),
                        );
                    }
                }
                (Some(_), None) => tracing::warn!("no expander configured; validating original payload"),
                (None, _) => tracing::debug!("root context is not composed; expansion skipped"),
            }
        }
        let target = expanded.as_ref().unwrap_or(payload);

        let mut dispatcher = Dispatcher::new(self.config, self.loader, self.checker, self.options, store)
            .with_root_pointer(composed_root);
        Walker::new(&self.config.annotation_property, &self.config.type_property)
            .walk(target, &mut dispatcher);
        errors.extend(dispatcher.finish());
        errors
    }
}

/// The payload's own pointer, else that of `message`, else that of the
/// first object under `message` that declares one.
pub fn find_root_pointer<'p>(payload: &'p Value, annotation_property: &str) -> Option<&'p str> {
    let object = payload.as_object()?;
    if let Some(own) = object.get(annotation_property) {
        return own.as_str();
    }
    let message = object.get("message")?.as_object()?;
    if let Some(own) = message.get(annotation_property) {
        return own.as_str();
    }
    message
        .values()
        .filter_map(Value::as_object)
        .find_map(|child| child.get(annotation_property))
        .and_then(Value::as_str)
}

/// Root pointer as a classified [`Pointer`].
pub fn root_pointer(payload: &Value, config: &ValidatorConfig) -> Option<Pointer> {
    find_root_pointer(payload, &config.annotation_property)
        .map(|raw| config.conventions.pointer(raw))
}
