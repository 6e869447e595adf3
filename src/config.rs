//! Backend connection configuration with sensible defaults.
//!
//! [`BackendConfig`] controls where the HTTP backend lives, how it
//! authenticates and how long a single request may take. It can be built in
//! code or loaded from a TOML file; missing fields fall back to defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::SearchError;

/// Configuration for the HTTP search backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the search service, e.g. `http://localhost:8108`.
    pub base_url: String,
    /// API key sent with every request.
    pub api_key: String,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
    /// Custom User-Agent string. If `None`, `federated-search/<version>` is used.
    pub user_agent: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8108".into(),
            api_key: String::new(),
            timeout_seconds: 5,
            user_agent: None,
        }
    }
}

impl BackendConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, SearchError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SearchError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if the TOML is malformed.
    pub fn from_toml_str(content: &str) -> Result<Self, SearchError> {
        toml::from_str(content).map_err(|e| SearchError::Config(e.to_string()))
    }

    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `timeout_seconds` must be greater than 0
    /// - `base_url` must parse as an `http` or `https` URL
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.timeout_seconds == 0 {
            return Err(SearchError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        self.parsed_base_url().map(|_| ())
    }

    /// Parse `base_url`, requiring an `http` or `https` scheme.
    pub(crate) fn parsed_base_url(&self) -> Result<Url, SearchError> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| SearchError::Config(format!("invalid base_url `{}`: {e}", self.base_url)))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(SearchError::Config(format!(
                "base_url scheme must be http or https, got `{other}`"
            ))),
        }
    }
}
