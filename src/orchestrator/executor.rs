//! Concurrent per-collection fan-out with failure isolation.
//!
//! Every collection is planned and searched inside its own future. All
//! futures are created before any is polled and are driven together with
//! [`futures::future::join_all`], so a slow or failing collection never
//! delays or cancels its siblings. Outcomes come back in declaration order
//! regardless of completion order.

use crate::backend::SearchBackend;
use crate::cache::SchemaCache;
use crate::request::MultiCollectionSearchRequest;
use crate::types::BackendResponse;

use super::planner::plan_collection;

/// The settled result of one collection's search.
#[derive(Debug, Clone)]
pub struct CollectionOutcome {
    /// Position of the collection in the request.
    pub index: usize,
    /// Collection name.
    pub collection: String,
    /// The backend response, or the failure message.
    pub result: Result<BackendResponse, String>,
}

impl CollectionOutcome {
    /// Whether this collection's search succeeded.
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Plan and search every collection of `request` concurrently.
///
/// Never fails as a whole: planning and backend errors are captured as
/// strings in the matching [`CollectionOutcome`].
pub async fn execute_all<B: SearchBackend>(
    backend: &B,
    cache: &SchemaCache,
    request: &MultiCollectionSearchRequest,
) -> Vec<CollectionOutcome> {
    let highlight = request.highlight.as_ref();
    let query = request.query.as_str();

    let futures: Vec<_> = request
        .collections
        .iter()
        .enumerate()
        .map(|(index, config)| async move {
            let result = match plan_collection(backend, cache, query, config, highlight).await {
                Ok(params) => backend
                    .search(&config.collection, &params)
                    .await
                    .map_err(|err| err.to_string()),
                Err(err) => Err(err.to_string()),
            };
            CollectionOutcome {
                index,
                collection: config.collection.clone(),
                result,
            }
        })
        .collect();

    let outcomes = futures::future::join_all(futures).await;

    for outcome in &outcomes {
        match &outcome.result {
            Ok(response) => {
                tracing::debug!(
                    collection = %outcome.collection,
                    count = response.hits.len(),
                    found = response.found,
                    "collection returned results"
                );
            }
            Err(error) => {
                tracing::warn!(collection = %outcome.collection, %error, "collection search failed");
            }
        }
    }

    outcomes
}
