//! Per-orchestrator schema cache.
//!
//! Memoises collection schemas keyed by collection name. The cache is
//! unbounded and entries never expire or get evicted on their own;
//! [`SchemaCache::clear`] drops them all. Uses [`moka`]
//! for async-friendly concurrent access. Concurrent lookups for the same
//! uncached collection may each fetch; the last insert wins.

use std::sync::Arc;

use moka::future::Cache;

use crate::backend::SearchBackend;
use crate::error::SearchError;
use crate::types::CollectionSchema;

/// Collection name → schema, owned by one orchestrator instance.
///
/// Not `Clone`: clones of a moka cache share one store.
pub struct SchemaCache {
    entries: Cache<String, Arc<CollectionSchema>>,
}

impl std::fmt::Debug for SchemaCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaCache").finish_non_exhaustive()
    }
}

impl Default for SchemaCache {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaCache {
    /// Create an empty, unbounded cache with no TTL.
    pub fn new() -> Self {
        Self {
            entries: Cache::builder().build(),
        }
    }

    /// Return the cached schema for `collection`, fetching it from `backend` on a miss.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the schema is not cached and the fetch
    /// fails. Failures are not cached.
    pub async fn get<B: SearchBackend>(
        &self,
        backend: &B,
        collection: &str,
    ) -> Result<Arc<CollectionSchema>, SearchError> {
        if let Some(schema) = self.entries.get(collection).await {
            tracing::trace!(collection, "schema cache hit");
            return Ok(schema);
        }

        tracing::debug!(collection, "schema cache miss, fetching");
        let schema = Arc::new(backend.get_schema(collection).await?);
        self.entries
            .insert(collection.to_string(), Arc::clone(&schema))
            .await;
        Ok(schema)
    }

    /// Look up a schema without fetching.
    pub async fn peek(&self, collection: &str) -> Option<Arc<CollectionSchema>> {
        self.entries.get(collection).await
    }

    /// Drop every cached schema, forcing a re-fetch on next use.
    pub fn clear(&self) {
        self.entries.invalidate_all();
    }
}
