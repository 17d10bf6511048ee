//! Validator configuration.
//!
//! Sources are layered, later wins: built-in defaults, an optional YAML
//! file, then environment variables. Command-line flags are applied by the
//! CLI on top of the result.
//!
//! Environment variables:
//! - `LDV_CORE_NAMESPACE`: namespace prefix of core-protocol type names.
//! - `LDV_BRANCH_FALLBACKS`: comma-separated alternate branches, in order.

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::pointer::PointerConventions;

/// Everything the engine needs to route and classify annotated objects.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidatorConfig {
    /// Property holding the type-annotation pointer.
    pub annotation_property: String,
    /// Property holding the type name.
    pub type_property: String,
    /// Namespace prefix that marks core-protocol type names.
    pub core_namespace: String,
    /// Suffix and segment conventions of the schema repository.
    pub conventions: PointerConventions,
    /// Alternate branches retried, in order, when the declared one fails.
    pub branch_fallbacks: Vec<String>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            annotation_property: "@context".to_string(),
            type_property: "@type".to_string(),
            core_namespace: "beckn".to_string(),
            conventions: PointerConventions::default(),
            branch_fallbacks: Vec::new(),
        }
    }
}

impl ValidatorConfig {
    /// Defaults, then `path` when given, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        base.with_overrides(|key| std::env::var(key).ok())
    }

    /// Parse a YAML configuration file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Parse YAML configuration text.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        Self::parse(content, "<inline>")
    }

    fn parse(content: &str, origin: &str) -> Result<Self, ConfigError> {
        // An empty file deserializes to unit, not to a mapping.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content).map_err(|e| ConfigError::Parse {
            origin: origin.to_string(),
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `LDV_*` overrides looked up through `lookup`.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(ns) = lookup("LDV_CORE_NAMESPACE") {
            tracing::debug!(core_namespace = %ns, "core namespace overridden from environment");
            self.core_namespace = ns;
        }
        if let Some(list) = lookup("LDV_BRANCH_FALLBACKS") {
            self.branch_fallbacks = list
                .split(',')
                .map(str::trim)
                .filter(|b| !b.is_empty())
                .map(str::to_string)
                .collect();
            tracing::debug!(fallbacks = ?self.branch_fallbacks, "branch fallbacks overridden from environment");
        }
        self.validate()?;
        Ok(self)
    }

    /// Append branches to the fallback chain, skipping duplicates.
    pub fn push_fallbacks<I, S>(&mut self, branches: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for branch in branches {
            let branch = branch.into();
            if !self.branch_fallbacks.contains(&branch) {
                self.branch_fallbacks.push(branch);
            }
        }
    }

    /// Reject settings the translator cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("annotation_property", &self.annotation_property),
            ("type_property", &self.type_property),
            ("core_namespace", &self.core_namespace),
            ("conventions.context_suffix", &self.conventions.context_suffix),
            ("conventions.attributes_suffix", &self.conventions.attributes_suffix),
            ("conventions.constraints_suffix", &self.conventions.constraints_suffix),
            ("conventions.branch_marker", &self.conventions.branch_marker),
            ("conventions.schema_segment", &self.conventions.schema_segment),
            ("conventions.core_segment", &self.conventions.core_segment),
            ("conventions.composed_segment", &self.conventions.composed_segment),
        ];
        for (key, value) in required {
            if value.is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    reason: "must not be empty".to_string(),
                });
            }
        }
        if self.core_namespace.contains(':') {
            return Err(ConfigError::InvalidValue {
                key: "core_namespace".to_string(),
                reason: "must not contain ':'".to_string(),
            });
        }
        if let Some(bad) = self.branch_fallbacks.iter().find(|b| b.contains('/')) {
            return Err(ConfigError::InvalidValue {
                key: "branch_fallbacks".to_string(),
                reason: format!("branch name {bad:?} contains '/'"),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_repository_layout() {
        let cfg = ValidatorConfig::default();
        assert_eq!(cfg.annotation_property, "@context");
        assert_eq!(cfg.type_property, "@type");
        assert_eq!(cfg.core_namespace, "beckn");
        assert!(cfg.branch_fallbacks.is_empty());
        cfg.validate().unwrap();
    }

    #[test]
    fn yaml_overrides_only_given_keys() {
        let cfg = ValidatorConfig::from_yaml_str(
            "core_namespace: ns\nbranch_fallbacks: [main, draft]\nconventions:\n  attributes_suffix: /attributes.json\n",
        )
        .unwrap();
        assert_eq!(cfg.core_namespace, "ns");
        assert_eq!(cfg.branch_fallbacks, vec!["main", "draft"]);
        assert_eq!(cfg.conventions.attributes_suffix, "/attributes.json");
        assert_eq!(cfg.conventions.context_suffix, "/context.jsonld");
        assert_eq!(cfg.type_property, "@type");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = ValidatorConfig::from_yaml_str("core_namspace: typo\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }), "got {err}");
    }

    #[test]
    fn empty_text_is_defaults() {
        assert_eq!(
            ValidatorConfig::from_yaml_str("  \n").unwrap(),
            ValidatorConfig::default()
        );
    }

    #[test]
    fn env_overrides_apply_after_file() {
        let cfg = ValidatorConfig::from_yaml_str("core_namespace: ns\n")
            .unwrap()
            .with_overrides(env(&[
                ("LDV_CORE_NAMESPACE", "proto"),
                ("LDV_BRANCH_FALLBACKS", " main, ,draft "),
            ]))
            .unwrap();
        assert_eq!(cfg.core_namespace, "proto");
        assert_eq!(cfg.branch_fallbacks, vec!["main", "draft"]);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = ValidatorConfig::default()
            .with_overrides(env(&[("LDV_CORE_NAMESPACE", "a:b")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "core_namespace"));

        let err = ValidatorConfig::from_yaml_str("type_property: ''\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "type_property"));

        let err = ValidatorConfig::from_yaml_str("branch_fallbacks: [feature/x]\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn push_fallbacks_deduplicates() {
        let mut cfg = ValidatorConfig::default();
        cfg.push_fallbacks(["main", "draft", "main"]);
        cfg.push_fallbacks(vec!["draft".to_string()]);
        assert_eq!(cfg.branch_fallbacks, vec!["main", "draft"]);
    }

    #[test]
    fn from_file_reads_yaml() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("ldv.yaml");
        std::fs::write(&path, "annotation_property: \"@ctx\"\n").unwrap();
        let cfg = ValidatorConfig::from_file(&path).unwrap();
        assert_eq!(cfg.annotation_property, "@ctx");
    }

    #[test]
    fn from_file_missing_is_read_error() {
        let err = ValidatorConfig::from_file(Path::new("/nonexistent/ldv.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("/nonexistent/ldv.yaml"));
    }
}
