//! Government marketplace bid scraper.
//!
//! The marketplace search page exposes no stable markup for individual bids,
//! so this adapter works on the page's visible text: every line containing the
//! record marker (`"bid no"` by default) is taken as one bid. All candidates
//! share the search page URL as their link because bid detail pages are not
//! addressable without a session, so none of them is a detail link.

use super::{CandidateFilter, SourceAdapter};
use crate::document;
use crate::http::{FetchError, PageFetcher};
use crate::models::{RawCandidate, SourceName};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, instrument};

/// Adapter for the marketplace bid search page.
pub struct MarketplaceAdapter {
    fetcher: Arc<dyn PageFetcher>,
    url: String,
    marker: String,
    filter: CandidateFilter,
}

impl MarketplaceAdapter {
    /// # Arguments
    ///
    /// * `fetcher` - Shared retrieval collaborator
    /// * `url` - Search page URL, also the link of every bid
    /// * `marker` - Case-insensitive text that identifies a bid line
    /// * `filter` - Title noise filter
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        url: impl Into<String>,
        marker: &str,
        filter: CandidateFilter,
    ) -> Self {
        Self {
            fetcher,
            url: url.into(),
            marker: marker.to_lowercase(),
            filter,
        }
    }
}

#[async_trait]
impl SourceAdapter for MarketplaceAdapter {
    #[instrument(level = "info", skip(self), fields(url = %self.url))]
    async fn fetch(&self) -> Result<Vec<RawCandidate>, FetchError> {
        let html = self.fetcher.fetch_text(&self.url).await?;
        let candidates = scan_bids(&html, &self.marker, &self.url, &self.filter);
        info!(count = candidates.len(), "Indexed marketplace bids");
        Ok(candidates)
    }

    fn name(&self) -> &str {
        "marketplace"
    }

    fn source(&self) -> SourceName {
        SourceName::Marketplace
    }
}

/// Scan page text line by line for bid records.
///
/// # Arguments
///
/// * `html` - Raw search page
/// * `marker` - Lower-cased record marker
/// * `link` - Shared link given to every bid
/// * `filter` - Title noise filter
///
/// # Returns
///
/// One candidate per accepted marker line, in page order, none of them with a
/// detail link.
pub fn scan_bids(
    html: &str,
    marker: &str,
    link: &str,
    filter: &CandidateFilter,
) -> Vec<RawCandidate> {
    document::page_text(html)
        .lines()
        .map(str::trim)
        .filter(|line| line.to_lowercase().contains(marker))
        .filter(|line| filter.accepts(line))
        .map(|line| RawCandidate::new(line, link, SourceName::Marketplace).without_detail())
        .collect()
}
