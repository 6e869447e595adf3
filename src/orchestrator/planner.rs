//! Query planning: one [`CollectionSearchConfig`] becomes one [`SearchParams`].
//!
//! Explicit settings always win. Missing search fields, sort and facet
//! fields are derived from the collection's schema, which is only fetched
//! when at least one of them is needed.

use crate::backend::{SearchBackend, SearchParams};
use crate::cache::SchemaCache;
use crate::error::SearchError;
use crate::request::{CollectionSearchConfig, HighlightConfig};
use crate::types::CollectionSchema;

/// Sort direction applied to a schema's default sorting field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

impl SortDirection {
    fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Build the search parameters for one collection.
///
/// The schema is looked up through `cache` only when `query_by`, `sort_by`
/// or (with facets requested) `facet_by` is missing. If that lookup fails:
///
/// - without `query_by`, planning fails with [`SearchError::Schema`];
/// - with `query_by`, planning proceeds without a default sort or facets.
///
/// # Errors
///
/// Returns [`SearchError::Schema`] when search fields cannot be resolved.
pub async fn plan_collection<B: SearchBackend>(
    backend: &B,
    cache: &SchemaCache,
    query: &str,
    config: &CollectionSearchConfig,
    highlight: Option<&HighlightConfig>,
) -> Result<SearchParams, SearchError> {
    let query_by = non_empty(config.query_by.as_deref());
    let facet_by = non_empty(config.facet_by.as_deref());
    let sort_by = non_blank(config.sort_by.as_deref());
    let needs_schema = query_by.is_none()
        || sort_by.is_none()
        || (config.include_facets && facet_by.is_none());

    let schema = if needs_schema {
        match cache.get(backend, &config.collection).await {
            Ok(schema) => Some(schema),
            Err(err) if query_by.is_some() => {
                tracing::warn!(
                    collection = %config.collection,
                    error = %err,
                    "schema unavailable, searching without default sort or facets"
                );
                None
            }
            Err(err) => {
                return Err(SearchError::Schema(format!("{}: {err}", config.collection)));
            }
        }
    } else {
        None
    };
    let schema = schema.as_deref();

    let query_by = match query_by {
        Some(fields) => fields.join(","),
        None => {
            let derived = schema.map(searchable_fields).unwrap_or_default();
            if derived.is_empty() {
                return Err(SearchError::Schema(format!(
                    "{}: no indexed string fields to search",
                    config.collection
                )));
            }
            derived.join(",")
        }
    };

    let sort_by = sort_by
        .map(str::to_string)
        .or_else(|| schema.and_then(default_sort));

    let facet_by = if config.include_facets {
        match facet_by {
            Some(fields) => Some(fields.join(",")),
            None => Some(schema.map(facet_fields).unwrap_or_default())
                .filter(|fields| !fields.is_empty())
                .map(|fields| fields.join(",")),
        }
    } else {
        None
    };

    Ok(SearchParams {
        q: query.to_string(),
        query_by,
        sort_by,
        filter_by: non_blank(config.filter_by.as_deref()).map(str::to_string),
        per_page: config.effective_max_results(),
        facet_by,
        highlight_start_tag: highlight.map(|h| h.start_tag.clone()),
        highlight_end_tag: highlight.map(|h| h.end_tag.clone()),
        highlight_affix_num_tokens: highlight.and_then(|h| h.affix_num_tokens),
        include_fields: non_empty(config.include_fields.as_deref()).map(|f| f.join(",")),
        exclude_fields: non_empty(config.exclude_fields.as_deref()).map(|f| f.join(",")),
    })
}

/// Trimmed, non-blank field names; `None` when nothing is left.
fn non_empty(fields: Option<&[String]>) -> Option<Vec<&str>> {
    let names: Vec<&str> = fields?
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .collect();
    (!names.is_empty()).then_some(names)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Indexed, non-wildcard string fields in schema order.
pub fn searchable_fields(schema: &CollectionSchema) -> Vec<String> {
    schema
        .fields
        .iter()
        .filter(|f| f.is_string() && f.is_indexed() && !f.is_wildcard())
        .map(|f| f.name.clone())
        .collect()
}

/// Facetable, non-wildcard fields in schema order.
pub fn facet_fields(schema: &CollectionSchema) -> Vec<String> {
    schema
        .fields
        .iter()
        .filter(|f| f.facet && !f.is_wildcard())
        .map(|f| f.name.clone())
        .collect()
}

/// `field:direction` for the schema's default sorting field, if it has one.
pub fn default_sort(schema: &CollectionSchema) -> Option<String> {
    let field = schema
        .default_sorting_field
        .as_deref()
        .filter(|f| !f.is_empty())?;
    let direction = sort_direction(schema, field);
    Some(format!("{field}:{}", direction.as_str()))
}

/// Numeric and timestamp-like fields sort descending, everything else ascending.
pub fn sort_direction(schema: &CollectionSchema, field: &str) -> SortDirection {
    let numeric = schema.field(field).is_some_and(|f| f.is_numeric());
    if numeric || looks_like_timestamp(field) {
        SortDirection::Desc
    } else {
        SortDirection::Asc
    }
}

fn looks_like_timestamp(field: &str) -> bool {
    let name = field.to_ascii_lowercase();
    name.ends_with("_at") || name.contains("time") || name.contains("date")
}
