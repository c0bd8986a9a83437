//! Data service connection settings.
//!
//! Read from the environment:
//!
//! - `LEDGER_BACKEND_URL`: base URL of the data service
//!   (default `http://localhost:8000`).
//! - `LEDGER_HTTP_TIMEOUT_SECS`: per-request timeout (default 30).

use std::time::Duration;

/// Base URL used when `LEDGER_BACKEND_URL` is unset.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Request timeout used when `LEDGER_HTTP_TIMEOUT_SECS` is unset or invalid.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where and how to reach the data service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ServiceConfig {
    /// Builds the configuration from process environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base_url = lookup("LEDGER_BACKEND_URL")
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout_secs = lookup("LEDGER_HTTP_TIMEOUT_SECS")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self::default()
            .with_base_url(&base_url)
            .with_timeout(Duration::from_secs(timeout_secs))
    }

    /// Replaces the base URL. Trailing slashes are dropped.
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim().trim_end_matches('/').to_string();
        self
    }

    /// Replaces the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Joins `path` onto the base URL.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}
