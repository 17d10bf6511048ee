//! In-memory loader for unit tests.

use std::cell::RefCell;
use std::collections::HashMap;

use ldv_core::{LoadError, SchemaLoader, SchemaLocation};

#[derive(Default)]
pub(crate) struct MemoryLoader {
    documents: HashMap<String, Result<String, u16>>,
    fetches: RefCell<HashMap<String, usize>>,
}

impl MemoryLoader {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with(mut self, location: &str, body: &str) -> Self {
        self.documents.insert(location.to_string(), Ok(body.to_string()));
        self
    }

    pub(crate) fn failing(mut self, location: &str, status: u16) -> Self {
        self.documents.insert(location.to_string(), Err(status));
        self
    }

    pub(crate) fn fetch_count(&self, location: &str) -> usize {
        self.fetches.borrow().get(location).copied().unwrap_or(0)
    }

    pub(crate) fn total_fetches(&self) -> usize {
        self.fetches.borrow().values().sum()
    }
}

impl SchemaLoader for MemoryLoader {
    fn load(&self, location: &SchemaLocation) -> Result<String, LoadError> {
        *self
            .fetches
            .borrow_mut()
            .entry(location.as_str().to_string())
            .or_insert(0) += 1;
        match self.documents.get(location.as_str()) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(status)) => Err(LoadError::Status {
                location: location.to_string(),
                status: *status,
            }),
            None => Err(LoadError::NotFound {
                location: location.to_string(),
            }),
        }
    }
}
