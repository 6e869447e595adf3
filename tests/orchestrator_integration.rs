//! Integration tests for the multi-collection search orchestrator.
//!
//! These tests drive `FederatedSearch` end to end against an in-memory
//! backend (no network calls): fan-out, failure isolation, merge strategies,
//! result modes and the global result cap.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use federated_search::{
    BackendHit, BackendResponse, CollectionSchema, CollectionSearchConfig, FederatedSearch,
    MergeStrategy, MultiCollectionSearchHit, MultiCollectionSearchRequest, ResultMode,
    SchemaField, SearchBackend, SearchError, SearchParams,
};
use serde_json::json;

/// Canned per-collection behaviour.
#[derive(Clone)]
enum Canned {
    Hits {
        ids_and_scores: Vec<(&'static str, u64)>,
        found: u64,
        delay_ms: u64,
    },
    Fail(&'static str),
}

#[derive(Default)]
struct InMemoryBackend {
    collections: HashMap<&'static str, Canned>,
    calls: AtomicUsize,
    params: Mutex<Vec<(String, SearchParams)>>,
}

impl InMemoryBackend {
    fn with(mut self, collection: &'static str, ids_and_scores: &[(&'static str, u64)]) -> Self {
        self.collections.insert(
            collection,
            Canned::Hits {
                ids_and_scores: ids_and_scores.to_vec(),
                found: ids_and_scores.len() as u64,
                delay_ms: 0,
            },
        );
        self
    }

    fn with_delay(mut self, collection: &'static str, ids: &[&'static str], delay_ms: u64) -> Self {
        self.collections.insert(
            collection,
            Canned::Hits {
                ids_and_scores: ids.iter().map(|id| (*id, 1)).collect(),
                found: ids.len() as u64,
                delay_ms,
            },
        );
        self
    }

    fn failing(mut self, collection: &'static str, message: &'static str) -> Self {
        self.collections.insert(collection, Canned::Fail(message));
        self
    }

    fn recorded_params(&self, collection: &str) -> Option<SearchParams> {
        self.params.lock().ok().and_then(|params| {
            params
                .iter()
                .find(|(name, _)| name == collection)
                .map(|(_, p)| p.clone())
        })
    }
}

impl SearchBackend for InMemoryBackend {
    async fn search(
        &self,
        collection: &str,
        params: &SearchParams,
    ) -> Result<BackendResponse, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut recorded) = self.params.lock() {
            recorded.push((collection.to_string(), params.clone()));
        }

        match self.collections.get(collection).cloned() {
            Some(Canned::Hits {
                ids_and_scores,
                found,
                delay_ms,
            }) => {
                if delay_ms > 0 {
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
                let hits = ids_and_scores
                    .iter()
                    .take(params.per_page)
                    .map(|(id, score)| {
                        let mut document = serde_json::Map::new();
                        document.insert("id".into(), json!(id));
                        BackendHit {
                            document,
                            text_match: Some(json!(score)),
                            ..Default::default()
                        }
                    })
                    .collect();
                Ok(BackendResponse {
                    hits,
                    found,
                    search_time_ms: delay_ms,
                    ..Default::default()
                })
            }
            Some(Canned::Fail(message)) => Err(SearchError::Backend(message.into())),
            None => Err(SearchError::Backend("Collection not found".into())),
        }
    }

    async fn get_schema(&self, collection: &str) -> Result<CollectionSchema, SearchError> {
        if !self.collections.contains_key(collection) {
            return Err(SearchError::Backend("Not Found".into()));
        }
        Ok(CollectionSchema {
            name: collection.to_string(),
            fields: vec![
                SchemaField::new("title", "string"),
                SchemaField::new("popularity", "int32"),
            ],
            default_sorting_field: Some("popularity".into()),
        })
    }
}

fn ids(hits: &[MultiCollectionSearchHit]) -> Vec<String> {
    hits.iter()
        .map(|h| h.document["id"].as_str().unwrap_or_default().to_string())
        .collect()
}

fn products_and_categories(strategy: MergeStrategy) -> MultiCollectionSearchRequest {
    MultiCollectionSearchRequest {
        merge_strategy: strategy,
        ..MultiCollectionSearchRequest::new(
            "shoe",
            vec![
                CollectionSearchConfig::new("products").with_query_by(["title"]),
                CollectionSearchConfig::new("categories")
                    .with_query_by(["title"])
                    .with_weight(0.8),
            ],
        )
    }
}

#[tokio::test]
async fn scenario_a_weighted_relevance_merge() {
    let backend = InMemoryBackend::default()
        .with("products", &[("p1", 100), ("p2", 90)])
        .with("categories", &[("c1", 95)]);
    let search = FederatedSearch::new(backend);

    let response = search
        .search_multiple_collections(&products_and_categories(MergeStrategy::Relevance))
        .await
        .expect("search");

    assert_eq!(search.backend().calls.load(Ordering::SeqCst), 2);
    // c1: 95 * 0.8 = 76, below both products.
    assert_eq!(ids(&response.hits), vec!["p1", "p2", "c1"]);
    let c1 = &response.hits[2];
    assert!((c1.merged_score - 76.0).abs() < 1e-9);
    assert!((c1.original_score - 95.0).abs() < f64::EPSILON);
    assert!((c1.weight - 0.8).abs() < f64::EPSILON);
    assert_eq!(c1.collection, "categories");
    assert_eq!(response.found, 3);
}

#[tokio::test]
async fn relevance_with_normalization_lets_weights_decide() {
    let backend = InMemoryBackend::default()
        .with("products", &[("p1", 100), ("p2", 90)])
        .with("categories", &[("c1", 95)]);
    let search = FederatedSearch::new(backend);
    let mut request = products_and_categories(MergeStrategy::Relevance);
    request.normalize_scores = true;

    let response = search.search_multiple_collections(&request).await.expect("search");

    // p1 = 1.0, c1 = 0.8 (tied collection normalises to 1), p2 = 0.0.
    assert_eq!(ids(&response.hits), vec!["p1", "c1", "p2"]);
    assert!(response.hits[2].normalized_score.abs() < f64::EPSILON);
}

#[tokio::test]
async fn scenario_b_round_robin() {
    let backend = InMemoryBackend::default()
        .with("products", &[("p1", 1), ("p2", 1), ("p3", 1)])
        .with("categories", &[("c1", 99), ("c2", 99)]);
    let search = FederatedSearch::new(backend);

    let response = search
        .search_multiple_collections(&products_and_categories(MergeStrategy::RoundRobin))
        .await
        .expect("search");

    assert_eq!(ids(&response.hits), vec!["p1", "c1", "p2", "c2", "p3"]);
}

#[tokio::test]
async fn scenario_c_collection_order() {
    let backend = InMemoryBackend::default()
        .with("products", &[("p1", 1), ("p2", 1)])
        .with("categories", &[("c1", 99), ("c2", 99)]);
    let search = FederatedSearch::new(backend);

    let response = search
        .search_multiple_collections(&products_and_categories(MergeStrategy::CollectionOrder))
        .await
        .expect("search");

    assert_eq!(ids(&response.hits), vec!["p1", "p2", "c1", "c2"]);
}

#[tokio::test]
async fn scenario_d_failed_collection_is_isolated() {
    let backend = InMemoryBackend::default()
        .with("products", &[("p1", 100), ("p2", 90)])
        .failing("categories", "Collection not found");
    let search = FederatedSearch::new(backend);

    let response = search
        .search_multiple_collections(&products_and_categories(MergeStrategy::Relevance))
        .await
        .expect("partial failure is not an error");

    let errors = response.errors_by_collection.expect("errors");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors["categories"], "Collection not found");
    assert_eq!(ids(&response.hits), vec!["p1", "p2"]);
    assert_eq!(response.total_found_by_collection["categories"], 0);
    assert_eq!(response.total_found_by_collection["products"], 2);
}

#[tokio::test]
async fn scenario_e_global_cap() {
    let ten: Vec<(&'static str, u64)> = ["a", "b", "c", "d", "e", "f", "g", "h", "i", "j"]
        .iter()
        .map(|id| (*id, 10))
        .collect();
    let backend = InMemoryBackend::default()
        .with("products", &ten)
        .with("categories", &ten);
    let search = FederatedSearch::new(backend);
    let mut request = products_and_categories(MergeStrategy::Relevance);
    request.global_max_results = Some(5);

    let response = search.search_multiple_collections(&request).await.expect("search");

    assert_eq!(response.hits.len(), 5);
    assert_eq!(response.found, 5);
}

#[tokio::test]
async fn scenario_f_per_collection_mode() {
    let backend = InMemoryBackend::default()
        .with("products", &[("p1", 100), ("p2", 90)])
        .with("categories", &[("c1", 95)]);
    let search = FederatedSearch::new(backend);
    let mut request = products_and_categories(MergeStrategy::Relevance);
    request.result_mode = ResultMode::PerCollection;

    let response = search.search_multiple_collections(&request).await.expect("search");

    assert!(response.hits.is_empty());
    let grouped = response.hits_by_collection.expect("grouped");
    assert_eq!(grouped["products"].len(), 2);
    assert_eq!(grouped["categories"].len(), 1);
    assert_eq!(response.found, 3);
    assert_eq!(response.result_mode, ResultMode::PerCollection);
}

#[tokio::test]
async fn both_mode_grouped_ids_match_merged_ids_before_cap() {
    let backend = InMemoryBackend::default()
        .with("products", &[("p1", 5), ("p2", 3), ("p3", 1)])
        .with("categories", &[("c1", 4), ("c2", 2)]);
    let search = FederatedSearch::new(backend);
    let mut request = products_and_categories(MergeStrategy::Relevance);
    request.result_mode = ResultMode::Both;

    let response = search.search_multiple_collections(&request).await.expect("search");
    let grouped = response.hits_by_collection.clone().expect("grouped");

    for (collection, hits) in &grouped {
        let mut from_group = ids(hits);
        let mut from_merged: Vec<String> = response
            .hits
            .iter()
            .filter(|h| &h.collection == collection)
            .map(|h| h.document["id"].as_str().unwrap_or_default().to_string())
            .collect();
        from_group.sort();
        from_merged.sort();
        assert_eq!(from_group, from_merged, "collection {collection}");
    }

    // A global cap trims the merged list only.
    request.global_max_results = Some(2);
    let capped = search.search_multiple_collections(&request).await.expect("search");
    assert_eq!(capped.hits.len(), 2);
    let grouped = capped.hits_by_collection.expect("grouped");
    assert_eq!(grouped["products"].len(), 3);
    assert_eq!(grouped["categories"].len(), 2);
}

#[tokio::test]
async fn merge_order_independent_of_completion_order() {
    // products finishes last, yet still leads in round-robin and collection order.
    let backend = InMemoryBackend::default()
        .with_delay("products", &["p1", "p2"], 40)
        .with_delay("categories", &["c1", "c2"], 1);
    let search = FederatedSearch::new(backend);

    let rr = search
        .search_multiple_collections(&products_and_categories(MergeStrategy::RoundRobin))
        .await
        .expect("search");
    assert_eq!(ids(&rr.hits), vec!["p1", "c1", "p2", "c2"]);

    let ordered = search
        .search_multiple_collections(&products_and_categories(MergeStrategy::CollectionOrder))
        .await
        .expect("search");
    assert_eq!(ids(&ordered.hits), vec!["p1", "p2", "c1", "c2"]);

    // All scores tie at 1.0 * weight; products' higher weight leads.
    let relevance = search
        .search_multiple_collections(&products_and_categories(MergeStrategy::Relevance))
        .await
        .expect("search");
    assert_eq!(ids(&relevance.hits), vec!["p1", "p2", "c1", "c2"]);
}

#[tokio::test]
async fn fan_out_latency_tracks_slowest_collection() {
    let backend = InMemoryBackend::default()
        .with_delay("a", &["a1"], 60)
        .with_delay("b", &["b1"], 60)
        .with_delay("c", &["c1"], 60);
    let search = FederatedSearch::new(backend);
    let request = MultiCollectionSearchRequest::new(
        "q",
        ["a", "b", "c"]
            .iter()
            .map(|c| CollectionSearchConfig::new(*c).with_query_by(["title"]))
            .collect(),
    );

    let started = std::time::Instant::now();
    let response = search.search_multiple_collections(&request).await.expect("search");
    let elapsed = started.elapsed();

    assert_eq!(response.hits.len(), 3);
    assert!(elapsed < Duration::from_millis(170), "took {elapsed:?}");
    assert_eq!(response.search_time_by_collection["b"], 60);
}

#[tokio::test]
async fn relevance_output_is_non_increasing_and_scores_bounded() {
    let backend = InMemoryBackend::default()
        .with("products", &[("p1", 70), ("p2", 50), ("p3", 10)])
        .with("categories", &[("c1", 120), ("c2", 30)])
        .with("brands", &[("b1", 5), ("b2", 5)]);
    let search = FederatedSearch::new(backend);
    let mut request = products_and_categories(MergeStrategy::Relevance);
    request
        .collections
        .push(CollectionSearchConfig::new("brands").with_query_by(["title"]).with_weight(3.0));

    for normalize in [false, true] {
        request.normalize_scores = normalize;
        let response = search.search_multiple_collections(&request).await.expect("search");
        assert_eq!(response.hits.len(), 7);
        assert!(response
            .hits
            .windows(2)
            .all(|w| w[0].merged_score >= w[1].merged_score));
        assert!(response
            .hits
            .iter()
            .all(|h| (0.0..=1.0).contains(&h.normalized_score)));
        let requested = ["products", "categories", "brands"];
        assert!(response
            .hits
            .iter()
            .all(|h| requested.contains(&h.collection.as_str())));
    }
}

#[tokio::test]
async fn schema_defaults_reach_the_backend() {
    let backend = InMemoryBackend::default().with("products", &[("p1", 1)]);
    let search = FederatedSearch::new(backend);
    let request = MultiCollectionSearchRequest {
        highlight: Some(federated_search::HighlightConfig {
            start_tag: "<em>".into(),
            end_tag: "</em>".into(),
            affix_num_tokens: Some(3),
        }),
        ..MultiCollectionSearchRequest::new(
            "shoe",
            vec![CollectionSearchConfig::new("products").with_max_results(3)],
        )
    };

    search.search_multiple_collections(&request).await.expect("search");

    let params = search.backend().recorded_params("products").expect("params");
    assert_eq!(params.query_by, "title");
    assert_eq!(params.sort_by.as_deref(), Some("popularity:desc"));
    assert_eq!(params.per_page, 3);
    assert_eq!(params.highlight_start_tag.as_deref(), Some("<em>"));
    assert_eq!(params.highlight_affix_num_tokens, Some(3));
}

#[tokio::test]
async fn unknown_collection_without_query_by_reports_schema_error() {
    let backend = InMemoryBackend::default().with("products", &[("p1", 1)]);
    let search = FederatedSearch::new(backend);
    let request = MultiCollectionSearchRequest::new(
        "shoe",
        vec![
            CollectionSearchConfig::new("products"),
            CollectionSearchConfig::new("ghosts"),
        ],
    );

    let response = search.search_multiple_collections(&request).await.expect("search");

    let errors = response.errors_by_collection.expect("errors");
    assert!(errors["ghosts"].starts_with("schema unavailable"));
    assert_eq!(response.total_found_by_collection.len(), 2);
    assert_eq!(ids(&response.hits), vec!["p1"]);
    assert_eq!(search.backend().calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn namespace_and_rank_annotate_hits() {
    let backend = InMemoryBackend::default()
        .with("products", &[("p1", 2), ("p2", 1)]);
    let search = FederatedSearch::new(backend);
    let request = MultiCollectionSearchRequest::new(
        "q",
        vec![CollectionSearchConfig::new("products")
            .with_query_by(["title"])
            .with_namespace("shop")],
    );

    let response = search.search_multiple_collections(&request).await.expect("search");

    assert!(response.hits.iter().all(|h| h.namespace.as_deref() == Some("shop")));
    assert_eq!(response.hits[0].collection_rank, 1);
    assert_eq!(response.hits[1].collection_rank, 2);
}

#[tokio::test]
async fn independent_orchestrators_do_not_share_schema_cache() {
    let first = FederatedSearch::new(InMemoryBackend::default().with("products", &[("p1", 1)]));
    let second = FederatedSearch::new(InMemoryBackend::default().with("products", &[("p1", 1)]));
    let request = MultiCollectionSearchRequest::new("q", vec![CollectionSearchConfig::new("products")]);

    first.search_multiple_collections(&request).await.expect("search");

    assert!(first.schema_cache().peek("products").await.is_some());
    assert!(second.schema_cache().peek("products").await.is_none());
}
