//! Search backend implementations.
//!
//! Each module provides a struct implementing [`crate::backend::SearchBackend`]
//! against a concrete search service.

pub mod typesense;

pub use typesense::TypesenseBackend;
