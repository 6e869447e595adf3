//! Cross-collection merge strategies.
//!
//! Input is one ranked hit list per successful collection, in request
//! declaration order. Every strategy is deterministic given that input;
//! completion order of the fan-out plays no part.

use std::cmp::Ordering;

use crate::request::MergeStrategy;
use crate::types::MultiCollectionSearchHit;

/// One collection's scored hits, in backend rank order.
#[derive(Debug, Clone)]
pub struct RankedCollection {
    /// Position of the collection in the request.
    pub index: usize,
    /// Collection name.
    pub collection: String,
    /// Hits in rank order.
    pub hits: Vec<MultiCollectionSearchHit>,
}

/// Merge per-collection hit lists into one list under `strategy`.
///
/// No truncation happens here; callers apply any global cap afterwards.
pub fn merge(collections: &[RankedCollection], strategy: MergeStrategy) -> Vec<MultiCollectionSearchHit> {
    match strategy {
        MergeStrategy::Relevance => merge_relevance(collections),
        MergeStrategy::RoundRobin => merge_round_robin(collections),
        MergeStrategy::CollectionOrder => merge_collection_order(collections),
    }
}

/// Pool everything and sort by merged score, descending.
///
/// Ties fall back to collection declaration order, then to rank within the
/// collection.
fn merge_relevance(collections: &[RankedCollection]) -> Vec<MultiCollectionSearchHit> {
    let mut pooled: Vec<(usize, &MultiCollectionSearchHit)> = collections
        .iter()
        .flat_map(|c| c.hits.iter().map(move |hit| (c.index, hit)))
        .collect();

    pooled.sort_by(|(a_index, a), (b_index, b)| {
        b.merged_score
            .partial_cmp(&a.merged_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a_index.cmp(b_index))
            .then_with(|| a.collection_rank.cmp(&b.collection_rank))
    });

    pooled.into_iter().map(|(_, hit)| hit.clone()).collect()
}

/// First hit of each collection, then the second of each, and so on.
fn merge_round_robin(collections: &[RankedCollection]) -> Vec<MultiCollectionSearchHit> {
    let total: usize = collections.iter().map(|c| c.hits.len()).sum();
    let depth = collections.iter().map(|c| c.hits.len()).max().unwrap_or(0);

    let mut merged = Vec::with_capacity(total);
    for position in 0..depth {
        merged.extend(collections.iter().filter_map(|c| c.hits.get(position)).cloned());
    }
    merged
}

/// Each collection's hits in turn, in declaration order.
fn merge_collection_order(collections: &[RankedCollection]) -> Vec<MultiCollectionSearchHit> {
    collections.iter().flat_map(|c| c.hits.iter().cloned()).collect()
}
