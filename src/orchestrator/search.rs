//! Multi-collection search orchestrator: plan, fan out, score, merge, assemble.

use std::time::Instant;

use crate::backend::SearchBackend;
use crate::cache::SchemaCache;
use crate::error::SearchError;
use crate::request::MultiCollectionSearchRequest;
use crate::types::MultiCollectionSearchResponse;

use super::assemble::assemble;
use super::executor::execute_all;

/// Searches several collections of one backend and merges the results.
///
/// Owns a [`SchemaCache`]; independent orchestrators never share schemas.
/// Callers issuing a new query while an earlier one is in flight should
/// discard the earlier result: there is no built-in cancellation.
#[derive(Debug)]
pub struct FederatedSearch<B> {
    backend: B,
    schemas: SchemaCache,
}

impl<B: SearchBackend> FederatedSearch<B> {
    /// Create an orchestrator over `backend` with an empty schema cache.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            schemas: SchemaCache::new(),
        }
    }

    /// The wrapped backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The orchestrator's schema cache.
    pub fn schema_cache(&self) -> &SchemaCache {
        &self.schemas
    }

    /// Search every collection in `request` concurrently and merge the results.
    ///
    /// # Pipeline
    ///
    /// 1. Validate the request structure
    /// 2. Plan each collection (resolving defaults from cached schemas)
    /// 3. Fan out searches concurrently with [`futures::future::join_all`]
    /// 4. Score hits and min-max normalise per collection
    /// 5. Merge by the request's [`MergeStrategy`](crate::request::MergeStrategy)
    /// 6. Truncate the merged list to `global_max_results`
    /// 7. Assemble per-collection counts, timings, facets and errors
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidRequest`] only when the request itself is
    /// malformed. Per-collection failures are reported in
    /// `errors_by_collection` and never fail the call.
    pub async fn search_multiple_collections(
        &self,
        request: &MultiCollectionSearchRequest,
    ) -> Result<MultiCollectionSearchResponse, SearchError> {
        request.validate()?;
        tracing::trace!(
            query = %request.query,
            collections = request.collections.len(),
            strategy = %request.merge_strategy,
            mode = %request.result_mode,
            "multi-collection search"
        );

        let started = Instant::now();
        let outcomes = execute_all(&self.backend, &self.schemas, request).await;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
        let response = assemble(request, outcomes, elapsed_ms);
        tracing::debug!(
            hits = response.hits.len(),
            found = response.found,
            failed,
            elapsed_ms,
            "multi-collection search complete"
        );
        Ok(response)
    }

    /// Drop all cached schemas; the next search re-fetches them.
    pub fn clear_schema_cache(&self) {
        tracing::debug!("clearing schema cache");
        self.schemas.clear();
    }
}
