//! Response assembly: scoring, merging, truncation and per-collection maps.
//!
//! Turns settled [`CollectionOutcome`]s into a
//! [`MultiCollectionSearchResponse`] shaped by the request's
//! [`ResultMode`](crate::request::ResultMode). The global cap applies only
//! to the merged list; per-collection lists keep their own page size.

use std::collections::BTreeMap;

use crate::request::{CollectionSearchConfig, MultiCollectionSearchRequest};
use crate::types::{MultiCollectionSearchHit, MultiCollectionSearchResponse};

use super::executor::CollectionOutcome;
use super::merge::{merge, RankedCollection};
use super::scoring::score_hits;

/// Build the final response.
///
/// `outcomes` must be in request declaration order, one per collection.
/// `search_time_ms` is the wall-clock duration of the whole fan-out.
pub fn assemble(
    request: &MultiCollectionSearchRequest,
    outcomes: Vec<CollectionOutcome>,
    search_time_ms: u64,
) -> MultiCollectionSearchResponse {
    let mode = request.result_mode;
    let mut total_found_by_collection = BTreeMap::new();
    let mut search_time_by_collection = BTreeMap::new();
    let mut facets_by_collection = BTreeMap::new();
    let mut errors_by_collection = BTreeMap::new();
    let mut ranked = Vec::with_capacity(outcomes.len());

    for outcome in outcomes {
        let Some(config) = request.collections.get(outcome.index) else {
            continue;
        };
        let name = outcome.collection;

        match outcome.result {
            Ok(response) => {
                total_found_by_collection.insert(name.clone(), response.found);
                search_time_by_collection.insert(name.clone(), response.search_time_ms);
                if config.include_facets {
                    if let Some(facets) = response.facet_counts {
                        facets_by_collection.insert(name.clone(), facets);
                    }
                }
                let mut hits = score_hits(config, response.hits, request.normalize_scores);
                hits.truncate(config.effective_max_results());
                ranked.push(RankedCollection {
                    index: outcome.index,
                    collection: name,
                    hits,
                });
            }
            Err(message) => {
                total_found_by_collection.insert(name.clone(), 0);
                search_time_by_collection.insert(name.clone(), 0);
                errors_by_collection.insert(name.clone(), message);
                ranked.push(RankedCollection {
                    index: outcome.index,
                    collection: name,
                    hits: Vec::new(),
                });
            }
        }
    }

    let hits = if mode.includes_merged() {
        let mut merged = merge(&ranked, request.merge_strategy);
        if let Some(cap) = request.global_max_results {
            merged.truncate(cap);
        }
        merged
    } else {
        Vec::new()
    };

    let included_by_collection = if mode.includes_merged() {
        count_by_collection(&request.collections, &hits)
    } else {
        ranked
            .iter()
            .map(|c| (c.collection.clone(), c.hits.len()))
            .collect()
    };

    let total: u64 = total_found_by_collection.values().sum();
    let found = match request.global_max_results {
        Some(cap) => total.min(cap as u64),
        None => total,
    };

    let hits_by_collection = mode.includes_per_collection().then(|| {
        ranked
            .into_iter()
            .map(|c| (c.collection, c.hits))
            .collect::<BTreeMap<_, _>>()
    });

    MultiCollectionSearchResponse {
        hits,
        found,
        total_found_by_collection,
        included_by_collection,
        search_time_ms,
        search_time_by_collection,
        query: request.query.clone(),
        facets_by_collection: non_empty(facets_by_collection),
        errors_by_collection: non_empty(errors_by_collection),
        hits_by_collection,
        result_mode: mode,
    }
}

/// Hits per requested collection in `hits`, with an entry for every collection.
fn count_by_collection(
    collections: &[CollectionSearchConfig],
    hits: &[MultiCollectionSearchHit],
) -> BTreeMap<String, usize> {
    let mut counts: BTreeMap<String, usize> = collections
        .iter()
        .map(|c| (c.collection.clone(), 0))
        .collect();
    for hit in hits {
        if let Some(count) = counts.get_mut(&hit.collection) {
            *count += 1;
        }
    }
    counts
}

fn non_empty<V>(map: BTreeMap<String, V>) -> Option<BTreeMap<String, V>> {
    (!map.is_empty()).then_some(map)
}
