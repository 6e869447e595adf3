//! # federated-search
//!
//! Concurrent search across several collections of one search service,
//! merged into a single ranked result.
//!
//! Each collection is configured independently (search fields, sort,
//! filters, facets, page size and a relevance weight). One query fans out
//! to every collection at once; the per-collection results are scored,
//! normalised and merged into one list, grouped by collection, or both.
//!
//! ## Design
//!
//! - Searches every collection concurrently; total latency tracks the slowest collection
//! - Isolates failures: a failing collection is reported in `errors_by_collection`
//!   and never fails the call
//! - Min-max normalises scores within each collection so weights compare fairly
//! - Three deterministic merge strategies: relevance, round-robin, collection order
//! - Fills in search fields, sort and facets from a per-instance schema cache
//!
//! ## Security
//!
//! - API keys are sent as a sensitive header and never logged
//! - Search queries are logged only at trace level

pub mod backend;
pub mod backends;
pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod orchestrator;
pub mod request;
pub mod types;

pub use backend::{SearchBackend, SearchParams};
pub use backends::TypesenseBackend;
pub use cache::SchemaCache;
pub use config::BackendConfig;
pub use error::{Result, SearchError};
pub use orchestrator::FederatedSearch;
pub use request::{
    CollectionSearchConfig, HighlightConfig, MergeStrategy, MultiCollectionSearchRequest,
    ResultMode, DEFAULT_MAX_RESULTS,
};
pub use types::{
    BackendHit, BackendResponse, CollectionSchema, FacetCount, FacetValue,
    MultiCollectionSearchHit, MultiCollectionSearchResponse, SchemaField,
};

/// Search several collections of a Typesense-compatible service in one call.
///
/// Convenience wrapper that builds a [`TypesenseBackend`] from `config` and
/// runs a single search with a fresh [`FederatedSearch`]. Reuse a
/// [`FederatedSearch`] directly to keep schemas cached between calls.
///
/// # Errors
///
/// Returns [`SearchError::Config`] for invalid configuration and
/// [`SearchError::InvalidRequest`] for a malformed request. Per-collection
/// failures are reported inside the response.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> federated_search::Result<()> {
/// use federated_search::{BackendConfig, CollectionSearchConfig, MultiCollectionSearchRequest};
///
/// let request = MultiCollectionSearchRequest::new(
///     "running shoes",
///     vec![
///         CollectionSearchConfig::new("products"),
///         CollectionSearchConfig::new("categories").with_weight(0.8),
///     ],
/// );
/// let response = federated_search::search(&BackendConfig::default(), &request).await?;
/// for hit in &response.hits {
///     println!("{} #{}: {:.2}", hit.collection, hit.collection_rank, hit.merged_score);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn search(
    config: &BackendConfig,
    request: &MultiCollectionSearchRequest,
) -> Result<MultiCollectionSearchResponse> {
    let backend = TypesenseBackend::new(config)?;
    FederatedSearch::new(backend)
        .search_multiple_collections(request)
        .await
}
