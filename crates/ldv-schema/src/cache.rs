//! # Run-Scoped Schema Store
//!
//! Three append-only indexes live for exactly one validation run:
//!
//! - [`SchemaCache`]: `SchemaLocation → document`. A location present here
//!   is never fetched again during the run.
//! - [`AttributeIndex`]: `pointer → (package, document, location)`. Keyed by
//!   pointer because a pointer can resolve through an alternate branch while
//!   the cache is keyed by the location actually fetched.
//! - [`ConstraintIndex`](crate::constraints::ConstraintIndex): constraint
//!   sets of composed packages.
//!
//! [`SchemaStore`] bundles them. The caller of the top-level entry point owns
//! it and passes it by `&mut`; there is no global registry.
//!
//! ## Branch Fallback
//!
//! When the declared branch cannot be fetched, [`SchemaCache::resolve`]
//! retries each configured alternate branch in order. A hit on an alternate
//! is stored under both the requested and the alternate location so later
//! lookups of the original pointer never walk the chain again. Failures are
//! never cached.

use std::collections::HashMap;
use std::sync::Arc;

use ldv_core::{parse_document, Pointer, PointerConventions, SchemaLoader, SchemaLocation};
use serde_json::Value;

use crate::constraints::ConstraintIndex;
use crate::error::FetchError;
use crate::fallback::first_success;

/// A fetched, decoded, immutable document.
pub type SchemaDocument = Arc<Value>;

// ---------------------------------------------------------------------------
// Branch chain
// ---------------------------------------------------------------------------

/// The ordered list of locations tried for one fetch.
#[derive(Debug, Clone, Copy)]
pub struct BranchChain<'a> {
    conventions: &'a PointerConventions,
    declared: Option<&'a str>,
    fallbacks: &'a [String],
}

impl<'a> BranchChain<'a> {
    pub fn new(
        conventions: &'a PointerConventions,
        declared: Option<&'a str>,
        fallbacks: &'a [String],
    ) -> Self {
        Self {
            conventions,
            declared,
            fallbacks,
        }
    }

    /// The requested location first, then one per usable alternate branch.
    ///
    /// Without a declared branch there is nothing to substitute and the
    /// chain is the requested location alone.
    pub fn candidates(&self, location: &SchemaLocation) -> Vec<SchemaLocation> {
        let mut out = vec![location.clone()];
        let Some(declared) = self.declared else {
            return out;
        };
        for alternate in self.fallbacks.iter().filter(|b| b.as_str() != declared) {
            if let Some(candidate) = self.conventions.with_branch(location, declared, alternate) {
                if !out.contains(&candidate) {
                    out.push(candidate);
                }
            }
        }
        out
    }
}

// ---------------------------------------------------------------------------
// SchemaCache
// ---------------------------------------------------------------------------

/// Location-keyed document cache for one run.
#[derive(Debug, Default)]
pub struct SchemaCache {
    documents: HashMap<SchemaLocation, SchemaDocument>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached locations (an alternate-branch hit counts twice).
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn contains(&self, location: &SchemaLocation) -> bool {
        self.documents.contains_key(location)
    }

    /// Cached document at `location`, without fetching.
    pub fn get(&self, location: &SchemaLocation) -> Option<SchemaDocument> {
        self.documents.get(location).cloned()
    }

    /// All cached documents, for registry construction.
    pub fn documents(&self) -> impl Iterator<Item = (&SchemaLocation, &SchemaDocument)> {
        self.documents.iter()
    }

    /// Return the cached document or fetch, decode and store it.
    ///
    /// # Errors
    ///
    /// The loader or decode failure. The cache is left unchanged.
    pub fn fetch_and_store(
        &mut self,
        location: &SchemaLocation,
        loader: &dyn SchemaLoader,
    ) -> Result<SchemaDocument, FetchError> {
        if let Some(document) = self.get(location) {
            return Ok(document);
        }
        let document = fetch_document(location, loader)?;
        tracing::info!(%location, "loaded schema document");
        self.documents.insert(location.clone(), Arc::clone(&document));
        Ok(document)
    }

    /// Like [`fetch_and_store`](Self::fetch_and_store), walking `chain` on failure.
    ///
    /// # Errors
    ///
    /// The failure of the requested location when every candidate failed.
    pub fn resolve(
        &mut self,
        location: &SchemaLocation,
        chain: &BranchChain<'_>,
        loader: &dyn SchemaLoader,
    ) -> Result<SchemaDocument, FetchError> {
        if let Some(document) = self.get(location) {
            return Ok(document);
        }

        let requested = match fetch_document(location, loader) {
            Ok(document) => {
                tracing::info!(%location, "loaded schema document");
                self.documents.insert(location.clone(), Arc::clone(&document));
                return Ok(document);
            }
            Err(e) => e,
        };

        let alternates = chain.candidates(location).into_iter().skip(1);
        let attempt = first_success(alternates, |candidate| match self.get(&candidate) {
            Some(document) => Ok((candidate, document)),
            None => fetch_document(&candidate, loader).map(|document| (candidate, document)),
        });

        match attempt {
            Ok((used, document)) => {
                tracing::info!(
                    requested = %location,
                    fallback = %used,
                    "loaded schema document from fallback branch"
                );
                self.documents
                    .entry(used)
                    .or_insert_with(|| Arc::clone(&document));
                self.documents.insert(location.clone(), Arc::clone(&document));
                Ok(document)
            }
            Err(_) => Err(requested),
        }
    }
}

/// Load and decode one location, bypassing any cache.
pub(crate) fn fetch_document(
    location: &SchemaLocation,
    loader: &dyn SchemaLoader,
) -> Result<SchemaDocument, FetchError> {
    let text = loader.load(location)?;
    let value = parse_document(&text).map_err(|source| FetchError::Decode {
        location: location.to_string(),
        source,
    })?;
    Ok(Arc::new(value))
}

// ---------------------------------------------------------------------------
// AttributeIndex
// ---------------------------------------------------------------------------

/// A resolved domain-attribute package.
#[derive(Debug, Clone)]
pub struct AttributeEntry {
    /// Package name from the location (`EvChargingOffer`).
    pub package: String,
    /// Package version from the location (`v1`).
    pub version: String,
    /// The attribute schema document.
    pub document: SchemaDocument,
    /// Location the document is cached under (the requested one).
    pub location: SchemaLocation,
}

/// Pointer-keyed index of resolved attribute packages.
#[derive(Debug, Default)]
pub struct AttributeIndex {
    entries: HashMap<String, AttributeEntry>,
}

impl AttributeIndex {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, pointer: &str) -> Option<&AttributeEntry> {
        self.entries.get(pointer)
    }

    /// Resolve `pointer`, fetching on miss through `cache` and the fallback chain.
    ///
    /// Returns `None` when the pointer has no branch segment, when its
    /// location does not name a package and version, or when every fetch
    /// failed (logged as a warning).
    pub fn resolve(
        &mut self,
        pointer: &Pointer,
        cache: &mut SchemaCache,
        conventions: &PointerConventions,
        fallbacks: &[String],
        loader: &dyn SchemaLoader,
    ) -> Option<AttributeEntry> {
        if let Some(entry) = self.entries.get(pointer.as_str()) {
            return Some(entry.clone());
        }

        let Some(branch) = conventions.branch_of(pointer.as_str()) else {
            tracing::debug!(%pointer, "pointer has no branch segment; not routable");
            return None;
        };
        let location = conventions.schema_location(pointer.as_str());
        let Some((package, version)) = conventions.package_name_and_version(location.as_str())
        else {
            tracing::debug!(%location, "location does not name a package and version");
            return None;
        };
        let (package, version) = (package.to_string(), version.to_string());

        let chain = BranchChain::new(conventions, Some(branch), fallbacks);
        match cache.resolve(&location, &chain, loader) {
            Ok(document) => {
                tracing::info!(%package, %version, %branch, "loaded attribute package");
                let entry = AttributeEntry {
                    package,
                    version,
                    document,
                    location,
                };
                self.entries.insert(pointer.as_str().to_string(), entry.clone());
                Some(entry)
            }
            Err(e) => {
                tracing::warn!(%package, %version, %location, error = %e, "failed to load attribute package");
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// SchemaStore
// ---------------------------------------------------------------------------

/// All run-scoped state, owned by the caller of the validation entry point.
#[derive(Debug, Default)]
pub struct SchemaStore {
    pub(crate) cache: SchemaCache,
    pub(crate) attributes: AttributeIndex,
    pub(crate) constraints: ConstraintIndex,
}

impl SchemaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache(&self) -> &SchemaCache {
        &self.cache
    }

    pub fn attributes(&self) -> &AttributeIndex {
        &self.attributes
    }

    pub fn constraints(&self) -> &ConstraintIndex {
        &self.constraints
    }
}
