//! Shared HTTP client construction for the search backend.
//!
//! Provides a configured [`reqwest::Client`] carrying the API key header,
//! request timeout and User-Agent from [`BackendConfig`].

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};

use crate::config::BackendConfig;
use crate::error::SearchError;

/// Header carrying the backend API key.
pub const API_KEY_HEADER: &str = "x-typesense-api-key";

/// Default User-Agent when none is configured.
pub fn default_user_agent() -> String {
    format!("federated-search/{}", env!("CARGO_PKG_VERSION"))
}

/// Build a [`reqwest::Client`] configured for the search backend.
///
/// The client has:
/// - The API key as a default header (marked sensitive so it never shows in debug output)
/// - Timeout from config
/// - Custom or default User-Agent
/// - gzip decompression
///
/// # Errors
///
/// Returns [`SearchError::Config`] if the API key is not a valid header value,
/// or [`SearchError::Http`] if the client cannot be constructed.
pub fn build_client(config: &BackendConfig) -> Result<reqwest::Client, SearchError> {
    let mut headers = HeaderMap::new();
    let mut key = HeaderValue::from_str(&config.api_key)
        .map_err(|_| SearchError::Config("api_key contains invalid header characters".into()))?;
    key.set_sensitive(true);
    headers.insert(API_KEY_HEADER, key);

    let ua = match config.user_agent {
        Some(ref custom) => custom.clone(),
        None => default_user_agent(),
    };

    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(ua)
        .build()
        .map_err(|e| SearchError::Http(format!("failed to build HTTP client: {e}")))
}
