//! Typesense-compatible HTTP backend.
//!
//! Searches with `GET /collections/{name}/documents/search` and reads schemas
//! with `GET /collections/{name}`. Rejections carry the service's JSON
//! `message` so that errors like "Collection not found" surface unchanged.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::backend::{SearchBackend, SearchParams};
use crate::config::BackendConfig;
use crate::error::SearchError;
use crate::http;
use crate::types::{BackendResponse, CollectionSchema};

/// HTTP client for a Typesense-compatible search service.
#[derive(Debug, Clone)]
pub struct TypesenseBackend {
    client: reqwest::Client,
    base_url: Url,
}

/// Error body returned by the service on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl TypesenseBackend {
    /// Build a backend from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if the configuration is invalid, or
    /// [`SearchError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &BackendConfig) -> Result<Self, SearchError> {
        config.validate()?;
        let base_url = config.parsed_base_url()?;
        let client = http::build_client(config)?;
        Ok(Self { client, base_url })
    }

    /// The service base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build `{base}/collections/{collection}/{extra...}` with each segment percent-encoded.
    fn collection_url(&self, collection: &str, extra: &[&str]) -> Result<Url, SearchError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                SearchError::Config(format!("base_url `{}` cannot have a path", self.base_url))
            })?;
            segments.pop_if_empty().push("collections").push(collection);
            segments.extend(extra);
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        collection: &str,
    ) -> Result<T, SearchError> {
        let response = request.send().await.map_err(|e| {
            SearchError::Http(format!("request for `{collection}` failed: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(rejection(status, &body));
        }

        let body = response.text().await.map_err(|e| {
            SearchError::Http(format!("response read for `{collection}` failed: {e}"))
        })?;
        tracing::trace!(collection, bytes = body.len(), "backend response received");

        serde_json::from_str(&body)
            .map_err(|e| SearchError::Parse(format!("invalid response for `{collection}`: {e}")))
    }
}

/// Map a non-2xx response to a backend error, preferring the service's own message.
fn rejection(status: reqwest::StatusCode, body: &str) -> SearchError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) if !parsed.message.is_empty() => SearchError::Backend(parsed.message),
        _ => SearchError::Backend(format!(
            "backend returned {}",
            status
                .canonical_reason()
                .map_or_else(|| status.as_u16().to_string(), |r| format!("{} {r}", status.as_u16()))
        )),
    }
}

impl SearchBackend for TypesenseBackend {
    async fn search(
        &self,
        collection: &str,
        params: &SearchParams,
    ) -> Result<BackendResponse, SearchError> {
        tracing::trace!(collection, query = %params.q, "backend search");
        let url = self.collection_url(collection, &["documents", "search"])?;
        self.get_json(self.client.get(url).query(params), collection)
            .await
    }

    async fn get_schema(&self, collection: &str) -> Result<CollectionSchema, SearchError> {
        tracing::trace!(collection, "backend schema lookup");
        let url = self.collection_url(collection, &[])?;
        self.get_json(self.client.get(url), collection).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(base_url: &str) -> TypesenseBackend {
        TypesenseBackend::new(&BackendConfig {
            base_url: base_url.into(),
            ..Default::default()
        })
        .expect("backend")
    }

    #[test]
    fn is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TypesenseBackend>();
    }

    #[test]
    fn invalid_config_rejected() {
        let config = BackendConfig {
            timeout_seconds: 0,
            ..Default::default()
        };
        assert!(TypesenseBackend::new(&config).is_err());
    }

    #[test]
    fn search_url_layout() {
        let url = backend("http://localhost:8108")
            .collection_url("products", &["documents", "search"])
            .expect("url");
        assert_eq!(url.as_str(), "http://localhost:8108/collections/products/documents/search");
    }

    #[test]
    fn base_url_path_prefix_and_trailing_slash_preserved() {
        let url = backend("https://search.example.com/api/")
            .collection_url("products", &[])
            .expect("url");
        assert_eq!(url.as_str(), "https://search.example.com/api/collections/products");
    }

    #[test]
    fn collection_name_is_percent_encoded() {
        let url = backend("http://localhost:8108")
            .collection_url("odd name/x", &[])
            .expect("url");
        assert_eq!(url.as_str(), "http://localhost:8108/collections/odd%20name%2Fx");
    }

    #[test]
    fn rejection_prefers_service_message() {
        let err = rejection(
            reqwest::StatusCode::NOT_FOUND,
            r#"{"message": "Collection not found"}"#,
        );
        assert_eq!(err.to_string(), "Collection not found");
    }

    #[test]
    fn rejection_falls_back_to_status() {
        let err = rejection(reqwest::StatusCode::SERVICE_UNAVAILABLE, "<html>down</html>");
        assert_eq!(err.to_string(), "backend returned 503 Service Unavailable");
    }
}
