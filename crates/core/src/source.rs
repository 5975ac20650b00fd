//! Remote content API client.
//!
//! [`ContentSource`] is the seam between the widget and the network. The
//! production implementation, [`HttpContentSource`], talks to a WordPress-style
//! REST API; tests substitute in-memory sources.

use std::future::Future;

use tracing::debug;

use crate::error::FetchError;
use crate::types::ContentItem;

/// Something that can answer a search against one named collection.
///
/// Futures are not required to be `Send`: the widget runs on a single
/// cooperative event loop (the browser's, in the web build).
pub trait ContentSource {
    fn search(
        &self,
        content_type: &str,
        query: &str,
    ) -> impl Future<Output = Result<Vec<ContentItem>, FetchError>>;
}

/// Queries `{base_url}/{content_type}/?search={query}` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpContentSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpContentSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self { client, base_url: base_url.into() }
    }

    /// Endpoint for one collection, always with the trailing slash the API expects.
    pub fn collection_url(&self, content_type: &str) -> String {
        format!("{}/{}/", self.base_url.trim_end_matches('/'), content_type)
    }
}

impl ContentSource for HttpContentSource {
    async fn search(&self, content_type: &str, query: &str) -> Result<Vec<ContentItem>, FetchError> {
        let url = self.collection_url(content_type);
        debug!(content_type, query, url = url.as_str(), "Fetching collection");

        let response = self
            .client
            .get(&url)
            .query(&[("search", query)])
            .send()
            .await
            .map_err(|source| FetchError::Transport { url: url.clone(), source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { url, status: status.as_u16() });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| FetchError::Transport { url: url.clone(), source })?;
        let items: Vec<ContentItem> =
            serde_json::from_slice(&body).map_err(|source| FetchError::Decode { url: url.clone(), source })?;

        debug!(content_type, count = items.len(), "Collection fetched");
        Ok(items)
    }
}
