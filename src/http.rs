//! Outbound HTTP retrieval.
//!
//! All network access goes through the [`PageFetcher`] trait so adapters and
//! the enricher can be exercised against in-memory fixtures. The production
//! implementation, [`HttpFetcher`], shares one `reqwest::Client` configured
//! with a fixed `User-Agent` and per-request timeout. There is no retry: a
//! failed fetch is final for the run.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

/// Reasons a source or enrichment fetch produced nothing.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network failure, timeout or non-success status.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    /// Malformed syndication feed.
    #[error("feed parse error: {0}")]
    Feed(#[from] quick_xml::DeError),

    #[error("pdf extraction failed: {0}")]
    Pdf(String),

    /// The page does not exist upstream (HTTP 404), e.g. a withdrawn listing.
    #[error("not found: {0}")]
    NotFound(String),
}

/// Retrieval collaborator used by adapters and the enricher.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError>;
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// `reqwest`-backed [`PageFetcher`].
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        let resp = self.client.get(url).send().await?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(url.to_string()));
        }
        let resp = resp.error_for_status()?;
        debug!(status = %resp.status(), "GET ok");
        Ok(resp)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        Ok(self.get(url).await?.text().await?)
    }

    #[instrument(level = "debug", skip(self))]
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        Ok(self.get(url).await?.bytes().await?.to_vec())
    }
}
