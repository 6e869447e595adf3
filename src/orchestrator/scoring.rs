//! Raw score extraction and per-collection min-max normalisation.
//!
//! Each collection's backend computes relevance on its own scale, so raw
//! scores are only comparable within one collection. Normalisation maps a
//! collection's scores onto `[0, 1]`:
//!
//! ```text
//! normalized = (raw - min) / (max - min)
//! ```
//!
//! When every hit in a collection has the same raw score the range is zero
//! and every hit normalises to `1.0`.

use serde_json::Value;

use crate::request::CollectionSearchConfig;
use crate::types::{BackendHit, MultiCollectionSearchHit};

/// Score assumed for hits that carry no usable relevance score.
pub const DEFAULT_RAW_SCORE: f64 = 1.0;

/// Extract the raw relevance score of a backend hit.
///
/// Reads `text_match`, falling back to `text_match_info.score`. Either may be
/// a JSON number or a numeric string. Missing, unparsable, non-finite and
/// negative values yield [`DEFAULT_RAW_SCORE`].
pub fn extract_score(hit: &BackendHit) -> f64 {
    hit.text_match
        .as_ref()
        .and_then(numeric)
        .or_else(|| {
            hit.text_match_info
                .as_ref()
                .and_then(|info| info.get("score"))
                .and_then(numeric)
        })
        .filter(|score| score.is_finite() && *score >= 0.0)
        .unwrap_or(DEFAULT_RAW_SCORE)
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Min-max normalise one collection's raw scores into `[0, 1]`.
///
/// The output has the same length and order as the input. The highest raw
/// score maps to `1.0`; a zero range maps every score to `1.0`.
pub fn normalize_scores(raw: &[f64]) -> Vec<f64> {
    let Some(first) = raw.first() else {
        return Vec::new();
    };
    let (min, max) = raw
        .iter()
        .fold((*first, *first), |(lo, hi), s| (lo.min(*s), hi.max(*s)));
    let range = max - min;

    if range > 0.0 {
        raw.iter()
            .map(|s| ((s - min) / range).clamp(0.0, 1.0))
            .collect()
    } else {
        vec![1.0; raw.len()]
    }
}

/// Combine a collection weight with either the raw or the normalised score.
pub fn merged_score(weight: f64, raw: f64, normalized: f64, use_normalized: bool) -> f64 {
    weight * if use_normalized { normalized } else { raw }
}

/// Score one collection's hits and attach merge metadata.
///
/// Hits keep their backend order; `collection_rank` is 1-based. The
/// normalised score is always computed, `use_normalized` only decides which
/// score feeds the merged score.
pub fn score_hits(
    config: &CollectionSearchConfig,
    hits: Vec<BackendHit>,
    use_normalized: bool,
) -> Vec<MultiCollectionSearchHit> {
    let raw: Vec<f64> = hits.iter().map(extract_score).collect();
    let normalized = normalize_scores(&raw);

    hits.into_iter()
        .zip(raw.into_iter().zip(normalized))
        .enumerate()
        .map(|(position, (hit, (original, normalized)))| MultiCollectionSearchHit {
            document: hit.document,
            highlights: hit.highlights,
            highlight: hit.highlight,
            collection: config.collection.clone(),
            namespace: config.namespace.clone(),
            collection_rank: position + 1,
            original_score: original,
            normalized_score: normalized,
            merged_score: merged_score(config.weight, original, normalized, use_normalized),
            weight: config.weight,
        })
        .collect()
}
