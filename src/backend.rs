//! Trait definition for the external search service.
//!
//! The orchestrator consumes the backend through two operations only:
//! a single-collection search and a schema lookup. [`crate::backends`]
//! provides an HTTP implementation; tests use in-memory mocks.

use serde::{Deserialize, Serialize};

use crate::error::SearchError;
use crate::types::{BackendResponse, CollectionSchema};

/// A planned single-collection search request.
///
/// Serializes to the backend's query-string parameter names. Unset optional
/// fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    /// Query text.
    pub q: String,
    /// Comma-separated search fields.
    pub query_by: String,
    /// Sort expression, e.g. `price:desc`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    /// Filter expression.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_by: Option<String>,
    /// Page size.
    pub per_page: usize,
    /// Comma-separated facet fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facet_by: Option<String>,
    /// Markup inserted before highlighted tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight_start_tag: Option<String>,
    /// Markup inserted after highlighted tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight_end_tag: Option<String>,
    /// Context tokens kept around highlights.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight_affix_num_tokens: Option<u32>,
    /// Comma-separated fields to include in documents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_fields: Option<String>,
    /// Comma-separated fields to exclude from documents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_fields: Option<String>,
}

/// The external search service.
///
/// Implementations must be `Send + Sync`; the orchestrator issues one call
/// per collection concurrently against the same backend value.
pub trait SearchBackend: Send + Sync {
    /// Search one collection.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] if the backend rejects the request or cannot
    /// be reached. The orchestrator records the error against `collection`
    /// and carries on with the other collections.
    fn search(
        &self,
        collection: &str,
        params: &SearchParams,
    ) -> impl std::future::Future<Output = Result<BackendResponse, SearchError>> + Send;

    /// Fetch a collection's schema.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] if the schema cannot be retrieved.
    fn get_schema(
        &self,
        collection: &str,
    ) -> impl std::future::Future<Output = Result<CollectionSchema, SearchError>> + Send;
}
