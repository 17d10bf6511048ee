//! # Pointer Translation
//!
//! Maps a type-annotation pointer (the `@context` URL of an object) to the
//! resources the validator needs: the attribute schema document, the
//! optional constraints document of a composed package, the branch the
//! pointer was published on, and the package name/version.
//!
//! ## URL Convention
//!
//! ```text
//! https://<host>/<owner>/<repo>/refs/heads/<branch>/schema/<package>/<version>/context.jsonld
//!                               ^^^^^^^^^^^ branch marker  ^^^^^^ schema segment
//! ```
//!
//! - `schema/core/<version>/` marks the shared base package.
//! - `schema/composed/<domain>/<version>/` marks a composed package.
//! - Everything else is a domain-attribute package.
//!
//! Suffixes and segments come from [`PointerConventions`], so a deployment
//! with different file names only changes configuration.
//!
//! All functions are total: unroutable input yields `None` or `false`.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Locations and pointers
// ---------------------------------------------------------------------------

/// Absolute address of a fetchable schema or constraints document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaLocation(String);

impl SchemaLocation {
    /// Wrap an already-absolute address.
    pub fn new(location: impl Into<String>) -> Self {
        Self(location.into())
    }

    /// Borrow the address.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `<location>#<fragment>`: a reference into this document.
    pub fn reference(&self, fragment: &str) -> String {
        format!("{}#{}", self.0, fragment)
    }
}

impl std::fmt::Display for SchemaLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Closed classification of a pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerKind {
    /// Shared base package (`schema/core/...`).
    Core,
    /// Package aggregating attribute types (`schema/composed/...`).
    Composed,
    /// Package-specific attribute schema.
    Attribute,
}

/// A type-annotation pointer together with its classification.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pointer {
    raw: String,
    kind: PointerKind,
}

impl Pointer {
    /// The pointer exactly as written in the payload.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The classification computed when the pointer was parsed.
    pub fn kind(&self) -> PointerKind {
        self.kind
    }

    pub fn is_core(&self) -> bool {
        self.kind == PointerKind::Core
    }

    pub fn is_composed(&self) -> bool {
        self.kind == PointerKind::Composed
    }
}

impl std::fmt::Display for Pointer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

// ---------------------------------------------------------------------------
// Conventions
// ---------------------------------------------------------------------------

/// File-name and path-segment conventions of the schema repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PointerConventions {
    /// Suffix of the pointer itself.
    pub context_suffix: String,
    /// Suffix of the attribute schema document.
    pub attributes_suffix: String,
    /// Suffix of a composed package's constraints document.
    pub constraints_suffix: String,
    /// Marker preceding the branch name.
    pub branch_marker: String,
    /// Path segment that follows the branch name.
    pub schema_segment: String,
    /// Package segment of the core package.
    pub core_segment: String,
    /// Package segment of composed packages.
    pub composed_segment: String,
}

impl Default for PointerConventions {
    fn default() -> Self {
        Self {
            context_suffix: "/context.jsonld".to_string(),
            attributes_suffix: "/attributes.yaml".to_string(),
            constraints_suffix: "/constraints.yaml".to_string(),
            branch_marker: "/refs/heads/".to_string(),
            schema_segment: "schema".to_string(),
            core_segment: "core".to_string(),
            composed_segment: "composed".to_string(),
        }
    }
}

impl PointerConventions {
    /// Classify a raw pointer once.
    pub fn pointer(&self, raw: impl Into<String>) -> Pointer {
        let raw = raw.into();
        let kind = self.classify(&raw);
        Pointer { raw, kind }
    }

    /// `Core` and `Composed` by path segment, `Attribute` otherwise.
    pub fn classify(&self, pointer: &str) -> PointerKind {
        if self.is_core(pointer) {
            PointerKind::Core
        } else if self.is_composed(pointer) {
            PointerKind::Composed
        } else {
            PointerKind::Attribute
        }
    }

    pub fn is_core(&self, pointer: &str) -> bool {
        pointer.contains(&self.package_segment(&self.core_segment))
    }

    pub fn is_composed(&self, pointer: &str) -> bool {
        pointer.contains(&self.package_segment(&self.composed_segment))
    }

    /// Replace the context suffix with the attributes suffix.
    ///
    /// A pointer without the context suffix is taken as-is.
    pub fn schema_location(&self, pointer: &str) -> SchemaLocation {
        match pointer.strip_suffix(&self.context_suffix) {
            Some(stem) => SchemaLocation(format!("{stem}{}", self.attributes_suffix)),
            None => SchemaLocation(pointer.to_string()),
        }
    }

    /// Location of the constraints document; defined for composed pointers only.
    pub fn constraints_location(&self, pointer: &str) -> Option<SchemaLocation> {
        if !self.is_composed(pointer) {
            return None;
        }
        let stem = pointer.strip_suffix(&self.context_suffix)?;
        Some(SchemaLocation(format!("{stem}{}", self.constraints_suffix)))
    }

    /// Branch name between the branch marker and the schema segment.
    pub fn branch_of<'a>(&self, pointer: &'a str) -> Option<&'a str> {
        let start = pointer.find(&self.branch_marker)? + self.branch_marker.len();
        let rest = &pointer[start..];
        let end = rest.find(&format!("/{}/", self.schema_segment))?;
        let branch = &rest[..end];
        if branch.is_empty() || branch.contains('/') {
            return None;
        }
        Some(branch)
    }

    /// `(package, version)` from `.../schema/<package>/<version>/attributes.yaml`.
    pub fn package_name_and_version<'a>(&self, location: &'a str) -> Option<(&'a str, &'a str)> {
        let stem = location.strip_suffix(&self.attributes_suffix)?;
        let mut parts = stem.rsplitn(3, '/');
        let version = parts.next()?;
        let name = parts.next()?;
        let head = parts.next()?;
        if version.is_empty() || name.is_empty() {
            return None;
        }
        if !head.ends_with(&format!("/{}", self.schema_segment)) {
            return None;
        }
        Some((name, version))
    }

    /// The core pointer of the same branch and version.
    ///
    /// `.../schema/composed/<domain>/<version>/context.jsonld` becomes
    /// `.../schema/core/<version>/context.jsonld`. Non-composed pointers and
    /// composed pointers that do not carry a domain and version are returned
    /// unchanged.
    pub fn core_counterpart(&self, pointer: &Pointer) -> Pointer {
        if !pointer.is_composed() {
            return pointer.clone();
        }
        let marker = self.package_segment(&self.composed_segment);
        let rewritten = pointer.raw.find(&marker).and_then(|idx| {
            let base = &pointer.raw[..idx];
            let rest = &pointer.raw[idx + marker.len()..];
            let mut parts = rest.splitn(3, '/');
            let _domain = parts.next().filter(|d| !d.is_empty())?;
            let version = parts.next().filter(|v| !v.is_empty())?;
            let tail = parts.next()?;
            Some(format!(
                "{base}/{}/{}/{version}/{tail}",
                self.schema_segment, self.core_segment
            ))
        });
        match rewritten {
            Some(raw) => self.pointer(raw),
            None => pointer.clone(),
        }
    }

    /// Pointer of a package named by a composed package's `schemaMapping`.
    ///
    /// `mapping` is a `<package>/<version>` path relative to the schema
    /// segment of the composed pointer's repository.
    pub fn mapped_pointer(&self, composed: &Pointer, mapping: &str) -> Option<Pointer> {
        if !composed.is_composed() {
            return None;
        }
        let marker = self.package_segment(&self.composed_segment);
        let idx = composed.raw.find(&marker)?;
        let mapping = mapping.trim_matches('/');
        if mapping.is_empty() {
            return None;
        }
        let base = &composed.raw[..idx];
        Some(self.pointer(format!(
            "{base}/{}/{mapping}{}",
            self.schema_segment, self.context_suffix
        )))
    }

    /// Substitute the branch segment of a location.
    pub fn with_branch(&self, location: &SchemaLocation, from: &str, to: &str) -> Option<SchemaLocation> {
        let needle = format!("{}{from}/{}/", self.branch_marker, self.schema_segment);
        if !location.0.contains(&needle) {
            return None;
        }
        let replacement = format!("{}{to}/{}/", self.branch_marker, self.schema_segment);
        Some(SchemaLocation(location.0.replacen(&needle, &replacement, 1)))
    }

    fn package_segment(&self, package: &str) -> String {
        format!("/{}/{package}/", self.schema_segment)
    }
}

// ---------------------------------------------------------------------------
// Type names
// ---------------------------------------------------------------------------

/// How an annotated object is validated, decided by its type name alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeClass {
    /// Type name carries the core namespace prefix (`beckn:Order`).
    Core,
    /// Anything else (`ChargingOffer`).
    Attribute,
}

impl NodeClass {
    pub fn of(type_name: &str, core_namespace: &str) -> Self {
        match type_name.split_once(':') {
            Some((ns, _)) if ns == core_namespace => Self::Core,
            _ => Self::Attribute,
        }
    }
}

/// Type name without its namespace prefix.
pub fn local_type_name(type_name: &str) -> &str {
    type_name.rsplit(':').next().unwrap_or(type_name)
}
