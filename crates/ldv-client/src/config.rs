//! HTTP loader configuration.
//!
//! Defaults suit fetching from a public raw-content host. Override via
//! environment variables or explicit construction for testing.

use std::time::Duration;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for [`HttpLoader`](crate::HttpLoader).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: default_user_agent(),
        }
    }
}

impl HttpConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `LDV_HTTP_TIMEOUT_SECS` (default: 30; unparseable or zero values fall back to the default)
    /// - `LDV_HTTP_USER_AGENT` (default: `ldv/<crate version>`)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            timeout_secs: lookup("LDV_HTTP_TIMEOUT_SECS")
                .and_then(|s| s.trim().parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            user_agent: lookup("LDV_HTTP_USER_AGENT")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(default_user_agent),
        }
    }

    /// The timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_user_agent() -> String {
    format!("ldv/{}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_env_absent() {
        let cfg = HttpConfig::from_lookup(|_| None);
        assert_eq!(cfg, HttpConfig::default());
        assert_eq!(cfg.timeout(), Duration::from_secs(30));
        assert!(cfg.user_agent.starts_with("ldv/"));
    }

    #[test]
    fn env_values_override_defaults() {
        let cfg = HttpConfig::from_lookup(|key| match key {
            "LDV_HTTP_TIMEOUT_SECS" => Some("5".into()),
            "LDV_HTTP_USER_AGENT" => Some("ci-validator".into()),
            _ => None,
        });
        assert_eq!(cfg.timeout_secs, 5);
        assert_eq!(cfg.user_agent, "ci-validator");
    }

    #[test]
    fn bad_timeout_falls_back() {
        for raw in ["abc", "0", "-3", ""] {
            let cfg = HttpConfig::from_lookup(|key| {
                (key == "LDV_HTTP_TIMEOUT_SECS").then(|| raw.to_string())
            });
            assert_eq!(cfg.timeout_secs, 30, "input {raw:?}");
        }
    }
}
