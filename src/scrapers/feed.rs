//! News search feed scraper.
//!
//! Uses the Google News RSS search endpoint to find recent news items that
//! mention tenders. Feed titles carry the publishing site as a `" - Site"`
//! suffix, which is stripped. This is the only source with a real publish
//! date; an unparseable `pubDate` is left unset and the normalizer falls back
//! to the run time.

use super::{CandidateFilter, SourceAdapter};
use crate::http::{FetchError, PageFetcher};
use crate::models::{RawCandidate, SourceName};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// `pubDate` layout used by the search feed, e.g. `Mon, 01 Jan 2024 08:30:00 GMT`.
pub const FEED_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %Z";

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
}

/// Build the search feed URL for a query.
pub fn search_url(query: &str) -> String {
    format!(
        "https://news.google.com/rss/search?q={}&hl=en-IN&gl=IN&ceid=IN:en",
        urlencoding::encode(query)
    )
}

/// Adapter for one feed search query.
pub struct FeedAdapter {
    fetcher: Arc<dyn PageFetcher>,
    name: String,
    url: String,
    max_items: usize,
    filter: CandidateFilter,
}

impl FeedAdapter {
    /// Creates an adapter for an RSS document at a fixed URL.
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Shared retrieval collaborator
    /// * `url` - Feed URL, also used as the link of items that have none
    /// * `max_items` - Items read from the top of the feed
    /// * `filter` - Title noise filter
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        url: impl Into<String>,
        max_items: usize,
        filter: CandidateFilter,
    ) -> Self {
        let url = url.into();
        Self {
            fetcher,
            name: format!("feed {url}"),
            url,
            max_items,
            filter,
        }
    }

    /// Creates an adapter for one news search query.
    ///
    /// The adapter is named after the query so a failing search can be told
    /// apart from its siblings in the tier report.
    pub fn for_query(
        fetcher: Arc<dyn PageFetcher>,
        query: &str,
        max_items: usize,
        filter: CandidateFilter,
    ) -> Self {
        let mut adapter = Self::new(fetcher, search_url(query), max_items, filter);
        adapter.name = format!("feed \"{query}\"");
        adapter
    }
}

#[async_trait]
impl SourceAdapter for FeedAdapter {
    #[instrument(level = "info", skip(self), fields(url = %self.url))]
    async fn fetch(&self) -> Result<Vec<RawCandidate>, FetchError> {
        let xml = self.fetcher.fetch_text(&self.url).await?;
        let candidates = parse_feed(&xml, &self.url, self.max_items, &self.filter)?;
        info!(count = candidates.len(), "Indexed feed items");
        Ok(candidates)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn source(&self) -> SourceName {
        SourceName::Feed
    }
}

/// Parse an RSS document into candidates, keeping at most `max_items`.
pub fn parse_feed(
    xml: &str,
    fallback_link: &str,
    max_items: usize,
    filter: &CandidateFilter,
) -> Result<Vec<RawCandidate>, FetchError> {
    let rss: Rss = quick_xml::de::from_str(&scrub_html_entities_for_xml(xml))?;

    let candidates = rss
        .channel
        .items
        .into_iter()
        .take(max_items)
        .filter_map(|item| {
            let title = strip_site_suffix(item.title.as_deref()?);
            if !filter.accepts(&title) {
                debug!(%title, "Dropping feed item");
                return None;
            }
            let link = item
                .link
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty());
            let mut candidate = match link {
                Some(link) => RawCandidate::new(title, link, SourceName::Feed),
                None => RawCandidate::new(title, fallback_link, SourceName::Feed).without_detail(),
            };
            candidate.published = item.pub_date.as_deref().and_then(parse_pub_date);
            Some(candidate)
        })
        .collect();

    Ok(candidates)
}

/// `"Road tender floated - Times of India"` -> `"Road tender floated"`.
fn strip_site_suffix(title: &str) -> String {
    title.split(" - ").next().unwrap_or(title).trim().to_string()
}

pub fn parse_pub_date(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), FEED_DATE_FORMAT).ok()
}

fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&rsquo;", "'")
        .replace("&lsquo;", "'")
        .replace("&rdquo;", "\"")
        .replace("&ldquo;", "\"")
}
