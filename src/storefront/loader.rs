//! Cache-first catalog loading.
//!
//! A non-empty cached snapshot is returned as is and never refreshed behind
//! the caller's back. Only when nothing usable is cached does the loader hit
//! the remote endpoint, writing the result through to the cache.

use std::sync::Arc;
use std::time::Duration;

use super::state::Catalog;
use super::storage::{KeyValueStore, StorageError, read_json, write_json};
use crate::models::Book;

/// Storage key holding the cached catalog
pub const CATALOG_KEY: &str = "books";

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("network error: {0}")]
    Network(String),
    #[error("server responded with HTTP {0}")]
    Status(u16),
    #[error("could not decode book list: {0}")]
    Decode(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl LoadError {
    /// Message shown to the shopper, embedding the underlying cause
    pub fn user_message(&self) -> String {
        format!(
            "Failed to load books from the server \u{1F641}\nPlease check your connection and try again\n({})",
            self
        )
    }
}

pub struct CatalogLoader {
    client: reqwest::Client,
    endpoint: String,
    storage: Arc<dyn KeyValueStore>,
}

impl CatalogLoader {
    pub fn new(
        endpoint: impl Into<String>,
        storage: Arc<dyn KeyValueStore>,
        timeout: Duration,
    ) -> Result<Self, LoadError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LoadError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            storage,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Return the cached catalog, or fetch and cache it.
    pub async fn load(&self) -> Result<Catalog, LoadError> {
        if let Some(books) = self.cached() {
            tracing::debug!("Serving {} books from local cache", books.len());
            return Ok(books.into());
        }

        let books = self.fetch().await?;
        tracing::info!("Fetched {} books from {}", books.len(), self.endpoint);

        if let Err(e) = write_json(self.storage.as_ref(), CATALOG_KEY, &books) {
            tracing::warn!("Failed to cache catalog: {}", e);
        }

        Ok(books.into())
    }

    /// Forget the cached snapshot and load again from the endpoint.
    pub async fn refresh(&self) -> Result<Catalog, LoadError> {
        self.storage.remove(CATALOG_KEY)?;
        self.load().await
    }

    fn cached(&self) -> Option<Vec<Book>> {
        read_json::<Vec<Book>>(self.storage.as_ref(), CATALOG_KEY).filter(|books| !books.is_empty())
    }

    async fn fetch(&self) -> Result<Vec<Book>, LoadError> {
        let resp = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| LoadError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(LoadError::Status(status.as_u16()));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| LoadError::Network(format!("Failed to read response body: {}", e)))?;

        serde_json::from_str(&body).map_err(|e| LoadError::Decode(e.to_string()))
    }
}
