//! Search orchestrator: planning, concurrent fan-out, scoring, merging.
//!
//! This module plans one search per collection, fans them out concurrently,
//! normalises each collection's scores, merges the hit lists under the
//! requested strategy and assembles the final response.

pub mod assemble;
pub mod executor;
pub mod merge;
pub mod planner;
pub mod scoring;
pub mod search;

pub use search::FederatedSearch;
