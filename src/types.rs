//! Core types: backend response shapes, collection schemas, merged hits and
//! the multi-collection response.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::request::ResultMode;

/// A JSON document as stored in a collection.
pub type Document = Map<String, Value>;

/// A single hit as returned by the backend for one collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendHit {
    /// The matched document.
    pub document: Document,
    /// Per-field highlight snippets, if highlighting was requested.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub highlights: Vec<Value>,
    /// Nested highlight object (newer backends).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<Value>,
    /// Backend text-match score. Usually an integer, sometimes a string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_match: Option<Value>,
    /// Detailed text-match breakdown; `score` is consulted when `text_match` is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_match_info: Option<Value>,
}

/// One value bucket inside a facet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetValue {
    /// The facet value.
    pub value: String,
    /// Number of matching documents with this value.
    pub count: u64,
    /// Highlighted form of the value, when the backend provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlighted: Option<String>,
}

/// Facet counts for one field of one collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetCount {
    /// Name of the faceted field.
    pub field_name: String,
    /// Value buckets, in backend order.
    #[serde(default)]
    pub counts: Vec<FacetValue>,
    /// Numeric stats (min/max/avg...) for numeric facets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<Value>,
}

/// A successful single-collection search response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendResponse {
    /// Hits in backend rank order.
    #[serde(default)]
    pub hits: Vec<BackendHit>,
    /// Total number of matching documents (not just the returned page).
    #[serde(default)]
    pub found: u64,
    /// Facet counts, when faceting was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facet_counts: Option<Vec<FacetCount>>,
    /// Backend-reported processing time.
    #[serde(default)]
    pub search_time_ms: u64,
    /// Parameters echoed by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_params: Option<Value>,
}

/// A field declaration inside a [`CollectionSchema`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaField {
    /// Field name; may contain `*` for wildcard declarations.
    pub name: String,
    /// Backend type name, e.g. `string`, `string[]`, `int64`, `float`.
    #[serde(rename = "type")]
    pub field_type: String,
    /// Whether the field is facetable.
    #[serde(default)]
    pub facet: bool,
    /// Whether the field is sortable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<bool>,
    /// Whether the field is indexed. Absent means indexed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<bool>,
    /// Whether the field may be missing from documents.
    #[serde(default)]
    pub optional: bool,
}

impl SchemaField {
    /// Convenience constructor for an indexed, non-facet field.
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            facet: false,
            sort: None,
            index: None,
            optional: false,
        }
    }

    /// Mark this field as facetable.
    pub fn with_facet(mut self) -> Self {
        self.facet = true;
        self
    }

    /// Returns `true` unless the schema explicitly disables indexing.
    pub fn is_indexed(&self) -> bool {
        self.index.unwrap_or(true)
    }

    /// Returns `true` if the name is a wildcard pattern rather than a concrete field.
    pub fn is_wildcard(&self) -> bool {
        self.name.contains('*')
    }

    /// Returns `true` for `string`, `string[]` and `string*` fields.
    pub fn is_string(&self) -> bool {
        self.field_type.starts_with("string")
    }

    /// Returns `true` for numeric field types.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self.field_type.as_str(),
            "int32" | "int64" | "float" | "int32[]" | "int64[]" | "float[]"
        )
    }
}

/// A collection's field schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionSchema {
    /// Collection name.
    pub name: String,
    /// Declared fields, in schema order.
    #[serde(default)]
    pub fields: Vec<SchemaField>,
    /// Field used for sorting when a query gives no explicit sort.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_sorting_field: Option<String>,
}

impl CollectionSchema {
    /// Look up a declared field by exact name.
    pub fn field(&self, name: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A hit in the multi-collection response, annotated with merge metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiCollectionSearchHit {
    /// The matched document.
    pub document: Document,
    /// Per-field highlight snippets, passed through from the backend.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub highlights: Vec<Value>,
    /// Nested highlight object, passed through from the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<Value>,
    /// Collection the hit came from.
    pub collection: String,
    /// Caller-supplied label for the owning collection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// 1-based rank within the owning collection's result list.
    pub collection_rank: usize,
    /// Raw backend relevance score.
    pub original_score: f64,
    /// Raw score min-max normalised within the owning collection, in `[0, 1]`.
    pub normalized_score: f64,
    /// Score used for cross-collection ranking.
    pub merged_score: f64,
    /// Weight applied to this hit's collection.
    pub weight: f64,
}

/// The result of a multi-collection search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MultiCollectionSearchResponse {
    /// Merged hits. Empty in [`ResultMode::PerCollection`].
    pub hits: Vec<MultiCollectionSearchHit>,
    /// Total matches across collections, capped by `global_max_results` when set.
    pub found: u64,
    /// Backend `found` per requested collection; 0 for failed collections.
    pub total_found_by_collection: BTreeMap<String, u64>,
    /// Number of hits per collection present in the returned structure.
    pub included_by_collection: BTreeMap<String, usize>,
    /// Wall-clock time of the whole fan-out.
    pub search_time_ms: u64,
    /// Backend-reported time per collection; 0 for failed collections.
    pub search_time_by_collection: BTreeMap<String, u64>,
    /// The query that was executed.
    pub query: String,
    /// Facet counts for collections that requested them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facets_by_collection: Option<BTreeMap<String, Vec<FacetCount>>>,
    /// Error messages for collections whose search failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors_by_collection: Option<BTreeMap<String, String>>,
    /// Unmerged per-collection hit lists, for `perCollection` and `both` modes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hits_by_collection: Option<BTreeMap<String, Vec<MultiCollectionSearchHit>>>,
    /// The result mode that produced this shape.
    pub result_mode: ResultMode,
}
