//! The fetch seam between the engine and the outside world.
//!
//! The engine asks for raw text by [`SchemaLocation`] and decodes it itself
//! (see [`crate::document`]). Implementations decide how to reach the
//! location; the engine decides when, and caches the result for the run.

use crate::error::LoadError;
use crate::pointer::SchemaLocation;

/// Fetches the raw text of a schema, constraints or context document.
///
/// Calls are synchronous: a validation run blocks on each fetch at the
/// point the document is first needed.
pub trait SchemaLoader {
    /// Fetch the resource at `location`.
    ///
    /// # Errors
    ///
    /// [`LoadError::NotFound`] when the resource definitively does not
    /// exist; any other variant for failures that may be transient.
    fn load(&self, location: &SchemaLocation) -> Result<String, LoadError>;
}

impl<L: SchemaLoader + ?Sized> SchemaLoader for &L {
    fn load(&self, location: &SchemaLocation) -> Result<String, LoadError> {
        (**self).load(location)
    }
}

impl<L: SchemaLoader + ?Sized> SchemaLoader for Box<L> {
    fn load(&self, location: &SchemaLocation) -> Result<String, LoadError> {
        (**self).load(location)
    }
}
