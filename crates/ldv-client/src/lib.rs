//! # ldv-client: HTTP Schema Loader
//!
//! Blocking implementation of [`SchemaLoader`] on `reqwest`. A validation
//! run is synchronous and fetches each document at the moment the walker
//! first needs it, so there is no runtime to host an async client.
//!
//! ## Status Mapping
//!
//! | Response             | Result                    |
//! |----------------------|---------------------------|
//! | 2xx                  | body text                 |
//! | 404 / 410            | [`LoadError::NotFound`]   |
//! | other status         | [`LoadError::Status`]     |
//! | connect/timeout/body | [`LoadError::Transport`]  |
//!
//! `NotFound` matters: a composed package without a constraints document is
//! normal and must not be reported as a failure.

pub mod config;

pub use config::HttpConfig;

use ldv_core::{LoadError, SchemaLoader, SchemaLocation};

/// Errors constructing the HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Fetches schema documents over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpLoader {
    http: reqwest::blocking::Client,
}

impl HttpLoader {
    /// Create a loader from configuration.
    pub fn new(config: &HttpConfig) -> Result<Self, ClientError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { http })
    }
}

impl SchemaLoader for HttpLoader {
    fn load(&self, location: &SchemaLocation) -> Result<String, LoadError> {
        tracing::debug!(%location, "fetching");
        let response = self
            .http
            .get(location.as_str())
            .send()
            .map_err(|e| transport(location, &e))?;

        let status = response.status();
        if let Some(err) = classify_status(location, status.as_u16()) {
            tracing::debug!(%location, status = status.as_u16(), "fetch rejected");
            return Err(err);
        }
        response.text().map_err(|e| transport(location, &e))
    }
}

/// Map a non-success status to a [`LoadError`]; `None` for 2xx.
fn classify_status(location: &SchemaLocation, status: u16) -> Option<LoadError> {
    match status {
        200..=299 => None,
        404 | 410 => Some(LoadError::NotFound {
            location: location.to_string(),
        }),
        _ => Some(LoadError::Status {
            location: location.to_string(),
            status,
        }),
    }
}

fn transport(location: &SchemaLocation, err: &reqwest::Error) -> LoadError {
    LoadError::Transport {
        location: location.to_string(),
        reason: err.to_string(),
    }
}
