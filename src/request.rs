//! Request records for a multi-collection search.
//!
//! A [`MultiCollectionSearchRequest`] carries one shared query and an ordered
//! list of [`CollectionSearchConfig`]s. Declaration order matters: it breaks
//! relevance ties and drives the `roundRobin` and `collectionOrder` merges.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// Page size used for a collection when `max_results` is not given.
pub const DEFAULT_MAX_RESULTS: usize = 10;

/// How hits from several collections are combined into one list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MergeStrategy {
    /// Pool all hits and sort by merged score, descending.
    #[default]
    Relevance,
    /// Take one hit from each collection in turn.
    RoundRobin,
    /// Concatenate collections in declaration order.
    CollectionOrder,
}

impl MergeStrategy {
    /// Returns the canonical name of this strategy.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::RoundRobin => "roundRobin",
            Self::CollectionOrder => "collectionOrder",
        }
    }
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MergeStrategy {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalise_name(s).as_str() {
            "relevance" => Ok(Self::Relevance),
            "roundrobin" => Ok(Self::RoundRobin),
            "collectionorder" => Ok(Self::CollectionOrder),
            _ => Err(SearchError::InvalidRequest(format!(
                "unknown merge strategy `{s}`"
            ))),
        }
    }
}

/// Shape of the returned hits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResultMode {
    /// One merged list in `hits`.
    #[default]
    Interleaved,
    /// Only `hits_by_collection`; `hits` is empty.
    PerCollection,
    /// Both the merged list and the per-collection lists.
    Both,
}

impl ResultMode {
    /// Returns the canonical name of this mode.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Interleaved => "interleaved",
            Self::PerCollection => "perCollection",
            Self::Both => "both",
        }
    }

    /// Whether the merged `hits` list is populated.
    pub fn includes_merged(&self) -> bool {
        matches!(self, Self::Interleaved | Self::Both)
    }

    /// Whether `hits_by_collection` is populated.
    pub fn includes_per_collection(&self) -> bool {
        matches!(self, Self::PerCollection | Self::Both)
    }
}

impl fmt::Display for ResultMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ResultMode {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalise_name(s).as_str() {
            "interleaved" => Ok(Self::Interleaved),
            "percollection" => Ok(Self::PerCollection),
            "both" => Ok(Self::Both),
            _ => Err(SearchError::InvalidRequest(format!(
                "unknown result mode `{s}`"
            ))),
        }
    }
}

/// Lowercase and strip `_`/`-` so `roundRobin`, `round_robin` and `round-robin` agree.
fn normalise_name(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Highlight markup applied uniformly to every collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// Markup inserted before a highlighted token.
    pub start_tag: String,
    /// Markup inserted after a highlighted token.
    pub end_tag: String,
    /// Tokens of context kept around each highlight.
    pub affix_num_tokens: Option<u32>,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            start_tag: "<mark>".into(),
            end_tag: "</mark>".into(),
            affix_num_tokens: None,
        }
    }
}

/// Per-collection search settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionSearchConfig {
    /// Collection to search.
    pub collection: String,
    /// Label attached to every hit from this collection.
    pub namespace: Option<String>,
    /// Fields to search. Derived from the schema when `None`.
    pub query_by: Option<Vec<String>>,
    /// Sort expression. Derived from the schema's default sorting field when `None`.
    pub sort_by: Option<String>,
    /// Filter expression passed through to the backend.
    pub filter_by: Option<String>,
    /// Page size for this collection; `DEFAULT_MAX_RESULTS` when `None`.
    pub max_results: Option<usize>,
    /// Relevance multiplier used when merging.
    pub weight: f64,
    /// Whether to request facet counts.
    pub include_facets: bool,
    /// Fields to facet on. Derived from the schema when `None` and facets are requested.
    pub facet_by: Option<Vec<String>>,
    /// Fields to include in returned documents.
    pub include_fields: Option<Vec<String>>,
    /// Fields to strip from returned documents.
    pub exclude_fields: Option<Vec<String>>,
}

impl Default for CollectionSearchConfig {
    fn default() -> Self {
        Self {
            collection: String::new(),
            namespace: None,
            query_by: None,
            sort_by: None,
            filter_by: None,
            max_results: None,
            weight: 1.0,
            include_facets: false,
            facet_by: None,
            include_fields: None,
            exclude_fields: None,
        }
    }
}

impl CollectionSearchConfig {
    /// Config for `collection` with all defaults.
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            ..Default::default()
        }
    }

    /// Set the relevance weight.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Set the namespace label.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Set explicit search fields.
    pub fn with_query_by<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query_by = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Set an explicit sort expression.
    pub fn with_sort_by(mut self, sort_by: impl Into<String>) -> Self {
        self.sort_by = Some(sort_by.into());
        self
    }

    /// Set the per-collection page size.
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = Some(max_results);
        self
    }

    /// Request facet counts, optionally on explicit fields.
    pub fn with_facets(mut self, facet_by: Option<Vec<String>>) -> Self {
        self.include_facets = true;
        self.facet_by = facet_by;
        self
    }

    /// Effective page size.
    pub fn effective_max_results(&self) -> usize {
        self.max_results.unwrap_or(DEFAULT_MAX_RESULTS)
    }
}

/// A search across several collections with one shared query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiCollectionSearchRequest {
    /// Query text shared by every collection.
    pub query: String,
    /// Target collections, in declaration order.
    pub collections: Vec<CollectionSearchConfig>,
    /// Cap on the merged hit list.
    pub global_max_results: Option<usize>,
    /// Highlight settings; `None` leaves the backend defaults in place.
    pub highlight: Option<HighlightConfig>,
    /// How collections are merged into `hits`.
    pub merge_strategy: MergeStrategy,
    /// Merge on normalised rather than raw scores.
    pub normalize_scores: bool,
    /// Response shape.
    pub result_mode: ResultMode,
}

impl Default for MultiCollectionSearchRequest {
    fn default() -> Self {
        Self {
            query: String::new(),
            collections: Vec::new(),
            global_max_results: None,
            highlight: None,
            merge_strategy: MergeStrategy::default(),
            normalize_scores: false,
            result_mode: ResultMode::default(),
        }
    }
}

impl MultiCollectionSearchRequest {
    /// Request for `query` across `collections`, with default merge settings.
    pub fn new(query: impl Into<String>, collections: Vec<CollectionSearchConfig>) -> Self {
        Self {
            query: query.into(),
            collections,
            ..Default::default()
        }
    }

    /// Validates this request, returning an error if it cannot be planned.
    ///
    /// Checks:
    /// - every collection name is non-empty and unique
    /// - every weight is finite and non-negative
    /// - per-collection `max_results`, when given, is greater than 0
    /// - `global_max_results`, when given, is greater than 0
    pub fn validate(&self) -> Result<(), SearchError> {
        let mut seen = HashSet::with_capacity(self.collections.len());
        for config in &self.collections {
            let name = config.collection.trim();
            if name.is_empty() {
                return Err(SearchError::InvalidRequest(
                    "collection name must not be empty".into(),
                ));
            }
            if !seen.insert(name) {
                return Err(SearchError::InvalidRequest(format!(
                    "duplicate collection `{name}`"
                )));
            }
            if !config.weight.is_finite() || config.weight < 0.0 {
                return Err(SearchError::InvalidRequest(format!(
                    "weight for `{name}` must be a finite, non-negative number"
                )));
            }
            if config.max_results == Some(0) {
                return Err(SearchError::InvalidRequest(format!(
                    "max_results for `{name}` must be greater than 0"
                )));
            }
        }
        if self.global_max_results == Some(0) {
            return Err(SearchError::InvalidRequest(
                "global_max_results must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}
