//! State e-procurement portal scraper.
//!
//! The portal renders its active-tender listings as plain HTML tables where
//! every tender title is an anchor. We take every anchor on the page and rely
//! on [`CandidateFilter`] to throw away navigation links.
//!
//! # URL Pattern
//!
//! Tender links are relative (`/nicgep/app?component=...`) and are resolved
//! against the portal base URL.

use super::{CandidateFilter, SourceAdapter};
use crate::document;
use crate::http::{FetchError, PageFetcher};
use crate::models::{RawCandidate, SourceName};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use url::Url;

/// Adapter for one portal listing page.
pub struct PortalAdapter {
    fetcher: Arc<dyn PageFetcher>,
    name: String,
    listing_url: String,
    base_url: String,
    filter: CandidateFilter,
}

impl PortalAdapter {
    /// Creates an adapter for one listing page.
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Shared retrieval collaborator
    /// * `listing_url` - Page holding the tender anchors
    /// * `base_url` - Portal root used to resolve relative links
    /// * `filter` - Title noise filter
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        listing_url: impl Into<String>,
        base_url: impl Into<String>,
        filter: CandidateFilter,
    ) -> Self {
        let listing_url = listing_url.into();
        Self {
            fetcher,
            name: format!("portal {listing_url}"),
            listing_url,
            base_url: base_url.into(),
            filter,
        }
    }
}

#[async_trait]
impl SourceAdapter for PortalAdapter {
    #[instrument(level = "info", skip(self), fields(url = %self.listing_url))]
    async fn fetch(&self) -> Result<Vec<RawCandidate>, FetchError> {
        let html = self.fetcher.fetch_text(&self.listing_url).await?;
        let candidates = parse_listing(&html, &self.base_url, &self.filter)?;
        info!(count = candidates.len(), "Indexed portal tenders");
        Ok(candidates)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn source(&self) -> SourceName {
        SourceName::Portal
    }
}

/// Extract candidates from a listing page.
///
/// Anchors without a usable `href` fall back to `base_url` and are marked as
/// having no detail page.
///
/// # Returns
///
/// Candidates in document order, or [`FetchError::Url`] if `base_url` does
/// not parse.
pub fn parse_listing(
    html: &str,
    base_url: &str,
    filter: &CandidateFilter,
) -> Result<Vec<RawCandidate>, FetchError> {
    let base = Url::parse(base_url)?;
    let mut candidates = Vec::new();

    for anchor in document::anchors(html) {
        if !filter.accepts(&anchor.text) {
            continue;
        }
        let resolved = anchor
            .href
            .as_deref()
            .filter(|href| !href.trim().is_empty())
            .and_then(|href| base.join(href.trim()).ok())
            .map(|u| u.to_string());
        debug!(title = %anchor.text, link = ?resolved, "Portal candidate");
        let candidate = match resolved {
            Some(link) => RawCandidate::new(anchor.text, link, SourceName::Portal),
            None => RawCandidate::new(anchor.text, base_url, SourceName::Portal).without_detail(),
        };
        candidates.push(candidate);
    }

    Ok(candidates)
}
