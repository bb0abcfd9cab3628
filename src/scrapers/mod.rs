//! Source adapters that turn upstream pages into raw tender candidates.
//!
//! Each adapter wraps one upstream origin behind the [`SourceAdapter`]
//! contract and returns `(title, link, source)` candidates. Adapters report
//! failures as [`FetchError`] instead of panicking; the orchestrator turns an
//! error into an empty yield so one outage never aborts a run.
//!
//! # Supported Sources
//!
//! | Source | Module | Method | Notes |
//! |--------|--------|--------|-------|
//! | State e-procurement portal | [`portal`] | HTML anchors | One adapter per listing page |
//! | Government marketplace | [`marketplace`] | Line scan of page text | No usable markup; `"bid no"` marks a record |
//! | News search feeds | [`feed`] | RSS | Only source that knows a publish date |
//!
//! # Common Patterns
//!
//! Every adapter applies the same [`CandidateFilter`]: titles shorter than the
//! noise threshold (menu entries, pagination links) and titles containing a
//! blocked word (corrigenda, cancellations, date extensions) are dropped.

use crate::config::Config;
use crate::http::{FetchError, PageFetcher};
use crate::models::{RawCandidate, SourceName};
use crate::orchestrator::Tier;
use async_trait::async_trait;
use std::sync::Arc;

pub mod feed;
pub mod marketplace;
pub mod portal;

/// One upstream origin of tender candidates.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Fetch and parse the source.
    async fn fetch(&self) -> Result<Vec<RawCandidate>, FetchError>;

    /// Human-readable adapter name for logs.
    fn name(&self) -> &str;

    fn source(&self) -> SourceName;
}

/// Title noise filter shared by all adapters.
#[derive(Debug, Clone)]
pub struct CandidateFilter {
    min_len: usize,
    blocked: Vec<String>,
}

impl Default for CandidateFilter {
    fn default() -> Self {
        Self::new(15, ["corrigendum", "cancelled", "extension"])
    }
}

impl CandidateFilter {
    /// # Arguments
    ///
    /// * `min_len` - Minimum title length in characters
    /// * `blocked` - Words that reject a title, matched case-insensitively
    pub fn new<I, S>(min_len: usize, blocked: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            min_len,
            blocked: blocked.into_iter().map(|w| w.as_ref().to_lowercase()).collect(),
        }
    }

    /// `true` if the title contains any blocked word, ignoring case.
    pub fn is_blocked(&self, title: &str) -> bool {
        let t = title.to_lowercase();
        self.blocked.iter().any(|w| t.contains(w.as_str()))
    }

    /// `true` if the (already trimmed) title should become a candidate.
    pub fn accepts(&self, title: &str) -> bool {
        title.chars().count() >= self.min_len && !self.is_blocked(title)
    }
}

/// Build the primary, secondary and tertiary tiers described by `config`.
pub fn tiers_from_config(config: &Config, fetcher: Arc<dyn PageFetcher>) -> Vec<Tier> {
    let filter = CandidateFilter::new(config.min_title_len, &config.blocked_words);

    let primary: Vec<Box<dyn SourceAdapter>> = config
        .portal
        .listing_urls
        .iter()
        .map(|url| {
            Box::new(portal::PortalAdapter::new(
                fetcher.clone(),
                url.as_str(),
                config.portal.base_url.as_str(),
                filter.clone(),
            )) as Box<dyn SourceAdapter>
        })
        .collect();

    let secondary: Vec<Box<dyn SourceAdapter>> = vec![Box::new(marketplace::MarketplaceAdapter::new(
        fetcher.clone(),
        config.marketplace.url.as_str(),
        &config.marketplace.marker,
        filter.clone(),
    )) as Box<dyn SourceAdapter>];

    let tertiary: Vec<Box<dyn SourceAdapter>> = config
        .feed
        .queries
        .iter()
        .map(|query| {
            Box::new(feed::FeedAdapter::for_query(
                fetcher.clone(),
                query,
                config.feed.max_items,
                filter.clone(),
            )) as Box<dyn SourceAdapter>
        })
        .collect();

    vec![
        Tier::new("primary", primary),
        Tier::new("secondary", secondary),
        Tier::new("tertiary", tertiary),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::StaticFetcher;

    #[test]
    fn test_tiers_from_default_config() {
        let tiers = tiers_from_config(&Config::default(), Arc::new(StaticFetcher::new()));
        let shape: Vec<(&str, usize)> = tiers.iter().map(|t| (t.name.as_str(), t.adapters.len())).collect();
        assert_eq!(shape, vec![("primary", 2), ("secondary", 1), ("tertiary", 2)]);
        assert_eq!(tiers[0].adapters[0].source(), SourceName::Portal);
        assert_eq!(tiers[1].adapters[0].source(), SourceName::Marketplace);
        assert_eq!(tiers[2].adapters[1].source(), SourceName::Feed);
    }

    #[test]
    fn test_filter_rejects_short_titles() {
        let f = CandidateFilter::default();
        assert!(!f.accepts("Home"));
        assert!(!f.accepts("Active Tenders"));
        assert!(f.accepts("Construction of road at Pune"));
    }

    #[test]
    fn test_filter_blocks_case_insensitive() {
        let f = CandidateFilter::default();
        assert!(!f.accepts("CORRIGENDUM for Construction of road"));
        assert!(!f.accepts("Tender Cancelled: supply of buses"));
        assert!(!f.accepts("Date extension for bid submission"));
        assert!(f.is_blocked("Corrigendum"));
    }

    #[test]
    fn test_filter_counts_chars_not_bytes() {
        let f = CandidateFilter::new(5, Vec::<String>::new());
        assert!(!f.accepts("₹₹₹₹"));
        assert!(f.accepts("₹₹₹₹₹"));
    }
}
