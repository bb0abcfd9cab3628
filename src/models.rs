//! Data models for scraped candidates and normalized tenders.
//!
//! This module defines the core data structures used throughout the pipeline:
//! - [`RawCandidate`]: Unprocessed `(title, link, source)` record from an adapter
//! - [`Tender`]: Normalized, deduplicated record written to the snapshot
//! - [`RunSnapshot`]: The complete output of one pipeline run
//! - Enumerations: [`SourceName`], [`Category`]

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upstream origin of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceName {
    /// Government e-procurement portal listing pages.
    Portal,
    /// Marketplace bid search page.
    Marketplace,
    /// News-feed search results.
    Feed,
}

impl fmt::Display for SourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SourceName::Portal => "portal",
            SourceName::Marketplace => "marketplace",
            SourceName::Feed => "feed",
        };
        f.write_str(s)
    }
}

/// Keyword-derived tender category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Category {
    Civil,
    Electrical,
    Transport,
    IT,
    General,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::Civil => "Civil",
            Category::Electrical => "Electrical",
            Category::Transport => "Transport",
            Category::IT => "IT",
            Category::General => "General",
        };
        f.write_str(s)
    }
}

/// A raw record as produced by a source adapter.
///
/// Candidates are transient: they flow from the orchestrator straight into
/// the normalizer and never reach the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCandidate {
    /// Trimmed title text that passed the adapter's noise filter.
    pub title: String,
    /// Absolute URL, or the source's base URL when none could be resolved.
    pub link: String,
    /// Which adapter produced this candidate.
    pub source: SourceName,
    /// Upstream publish time. Only feed adapters know it.
    pub published: Option<NaiveDateTime>,
    /// `link` addresses this posting's own page. Shared listing URLs and
    /// base-URL fallbacks are `false` and are never enriched.
    pub detail: bool,
}

impl RawCandidate {
    /// Creates a candidate whose link is its own detail page.
    pub fn new(title: impl Into<String>, link: impl Into<String>, source: SourceName) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            source,
            published: None,
            detail: true,
        }
    }

    /// Mark `link` as a shared page rather than this posting's detail page.
    pub fn without_detail(mut self) -> Self {
        self.detail = false;
        self
    }

    pub fn with_published(mut self, published: NaiveDateTime) -> Self {
        self.published = Some(published);
        self
    }
}

/// A location resolved from free text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// `"<City>, <Region>"`, or the default region on its own.
    pub display: String,
    /// The city when one matched, otherwise the default region.
    pub district: String,
}

/// A normalized procurement posting.
///
/// Tenders are built once by the normalizer and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Tender {
    /// Hex digest of the title; the run-wide identity key.
    pub id: String,
    pub title: String,
    pub link: String,
    pub source: SourceName,
    pub category: Category,
    pub location: String,
    pub district: String,
    /// Normalized monetary value, or `"Not specified"`.
    pub value: String,
    pub published: NaiveDate,
    pub expiry: NaiveDate,
    pub summary: String,
}

/// The full output of one pipeline run.
///
/// Each run replaces the previous snapshot entirely.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RunSnapshot {
    /// Run timestamp, e.g. `"01 Jan 2024 09:30"`.
    pub updated: String,
    pub total: usize,
    /// Tenders in first-seen order.
    pub data: Vec<Tender>,
}

impl RunSnapshot {
    pub fn new(updated: String, data: Vec<Tender>) -> Self {
        Self {
            updated,
            total: data.len(),
            data,
        }
    }
}
