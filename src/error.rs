//! Error types for the federated-search crate.
//!
//! All errors use stable string messages suitable for display to users
//! and for recording in a response's per-collection error map. No API keys
//! or sensitive data appear in error messages.

/// Errors that can occur while planning or executing a multi-collection search.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The backend rejected a request (unknown collection, bad parameter, ...).
    ///
    /// Displays the backend's message verbatim so it can be surfaced to callers
    /// unchanged.
    #[error("{0}")]
    Backend(String),

    /// An HTTP request to the backend failed at the transport level.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Failed to decode a backend response body.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid backend configuration.
    #[error("config error: {0}")]
    Config(String),

    /// A collection's schema could not be resolved and no explicit fields were given.
    #[error("schema unavailable: {0}")]
    Schema(String),

    /// The request is structurally invalid and cannot be planned.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Convenience type alias for federated-search results.
pub type Result<T> = std::result::Result<T, SearchError>;
