use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::domain::MovieId;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Movie service request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Movie service error: {status} - {body}")]
    Status { status: StatusCode, body: String },

    #[error("Movie service is unhealthy: {0}")]
    Unhealthy(String),
}

/// A movie as served by the backend; only the fields the dashboard reads.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteMovie {
    #[serde(rename = "movieId", alias = "movie_id", alias = "id")]
    pub movie_id: i64,
    #[serde(default)]
    pub title: Option<String>,
    /// Pipe-separated genres, e.g. `Comedy|Drama`.
    #[serde(default)]
    pub genres: Option<String>,
}

/// Source of per-movie metadata.
#[async_trait]
pub trait MovieCatalog: Send + Sync {
    async fn health_check(&self) -> Result<(), CatalogError>;

    /// `Ok(None)` when the service does not know the movie.
    async fn get_movie(&self, id: MovieId) -> Result<Option<RemoteMovie>, CatalogError>;
}

#[derive(Clone)]
pub struct MovieClient {
    client: Client,
    base_url: String,
}

impl MovieClient {
    pub fn new(base_url: &str, timeout_seconds: u64) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .user_agent(concat!("movielens-explorer/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self::with_client(client, base_url))
    }

    #[must_use]
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl MovieCatalog for MovieClient {
    async fn health_check(&self) -> Result<(), CatalogError> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Unhealthy(format!("{status} - {body}")));
        }

        Ok(())
    }

    async fn get_movie(&self, id: MovieId) -> Result<Option<RemoteMovie>, CatalogError> {
        let url = format!("{}/movies/{}", self.base_url, id);
        let response = self.client.get(&url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Status { status, body });
        }

        Ok(Some(response.json().await?))
    }
}
