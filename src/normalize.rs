//! Deduplication and field normalization.
//!
//! Raw candidates become [`Tender`]s in two steps:
//!
//! 1. **Dedup**: a single ordered fold keyed on the SHA-256 of the title.
//!    The first occurrence wins, so a posting mirrored on a lower tier never
//!    replaces the one the portal already produced.
//! 2. **Build**: every surviving candidate whose link is its own detail page
//!    is (optionally) enriched, then each field is filled from the best
//!    available layer: enrichment, then title and link heuristics, then a
//!    fixed default. Candidates sharing a listing URL are never enriched,
//!    since the listing page describes every posting on it at once.
//!
//! Enrichment fetches run through an ordered bounded stream, so the output
//! keeps candidate order whatever order the fetches finish in.

use crate::classify::{Classifiers, extract_monetary_value};
use crate::enrich::{Enrich, Enrichment};
use crate::models::{RawCandidate, Tender};
use crate::scrapers::CandidateFilter;
use crate::utils::truncate_for_log;
use chrono::{Days, NaiveDate, NaiveDateTime};
use futures::stream::{self, StreamExt};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Value reported when no monetary amount could be found.
pub const VALUE_NOT_SPECIFIED: &str = "Not specified";

/// Deterministic identity key of a tender: hex SHA-256 of its title.
pub fn identity_key(title: &str) -> String {
    format!("{:x}", Sha256::digest(title.as_bytes()))
}

/// Counters describing what normalization dropped or improved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeStats {
    pub duplicates: usize,
    pub blocked: usize,
    pub enriched: usize,
}

/// Turns raw candidates into deduplicated tenders.
pub struct Normalizer {
    classifiers: Classifiers,
    filter: CandidateFilter,
    enricher: Option<Arc<dyn Enrich>>,
    enrich_concurrency: usize,
    expiry_days: u64,
}

impl Normalizer {
    /// Creates a normalizer without enrichment and with a 15 day expiry.
    ///
    /// # Arguments
    ///
    /// * `classifiers` - Keyword classifiers for the heuristic layer
    /// * `filter` - Blocked-word filter applied again during dedup
    pub fn new(classifiers: Classifiers, filter: CandidateFilter) -> Self {
        Self {
            classifiers,
            filter,
            enricher: None,
            enrich_concurrency: 4,
            expiry_days: 15,
        }
    }

    /// Enrich detail links with `enricher`, at most `concurrency` at a time.
    pub fn with_enricher(mut self, enricher: Arc<dyn Enrich>, concurrency: usize) -> Self {
        self.enricher = Some(enricher);
        self.enrich_concurrency = concurrency.max(1);
        self
    }

    pub fn with_expiry_days(mut self, days: u64) -> Self {
        self.expiry_days = days;
        self
    }

    /// Drop blocked titles and repeated titles, keeping first occurrences.
    pub fn dedup(
        &self,
        candidates: Vec<RawCandidate>,
    ) -> (Vec<(String, RawCandidate)>, NormalizeStats) {
        let mut stats = NormalizeStats::default();
        let mut seen: HashSet<String> = HashSet::new();
        let mut unique = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            if self.filter.is_blocked(&candidate.title) {
                stats.blocked += 1;
                continue;
            }
            let id = identity_key(&candidate.title);
            if !seen.insert(id.clone()) {
                debug!(
                    title = %truncate_for_log(&candidate.title, 80),
                    source = %candidate.source,
                    "Duplicate title dropped"
                );
                stats.duplicates += 1;
                continue;
            }
            unique.push((id, candidate));
        }

        (unique, stats)
    }

    /// Dedup, enrich and build tenders. `now` is the run time.
    #[instrument(level = "info", skip_all, fields(candidates = candidates.len()))]
    pub async fn normalize(
        &self,
        candidates: Vec<RawCandidate>,
        now: NaiveDateTime,
    ) -> (Vec<Tender>, NormalizeStats) {
        let (unique, mut stats) = self.dedup(candidates);

        let enricher = self.enricher.as_deref();
        let enriched: Vec<(String, RawCandidate, Enrichment)> = stream::iter(unique)
            .map(|(id, candidate)| async move {
                let enrichment = match enricher {
                    Some(e) if candidate.detail => e.enrich(&candidate.link).await,
                    _ => Enrichment::default(),
                };
                (id, candidate, enrichment)
            })
            .buffered(self.enrich_concurrency)
            .collect()
            .await;

        let tenders: Vec<Tender> = enriched
            .into_iter()
            .map(|(id, candidate, enrichment)| {
                if !enrichment.is_empty() {
                    stats.enriched += 1;
                }
                self.build(id, candidate, enrichment, now)
            })
            .collect();

        info!(
            tenders = tenders.len(),
            duplicates = stats.duplicates,
            blocked = stats.blocked,
            enriched = stats.enriched,
            "Normalized candidates"
        );
        (tenders, stats)
    }

    /// Fill every tender field from enrichment, heuristics or defaults.
    pub fn build(
        &self,
        id: String,
        candidate: RawCandidate,
        enrichment: Enrichment,
        now: NaiveDateTime,
    ) -> Tender {
        let heuristic_text = format!("{} {}", candidate.title, candidate.link);

        let category = self.classifiers.classify_category(&candidate.title);
        let location = enrichment
            .location
            .or_else(|| self.classifiers.match_location(&heuristic_text))
            .unwrap_or_else(|| self.classifiers.default_loc());
        let value = enrichment
            .value
            .or_else(|| extract_monetary_value(&heuristic_text))
            .unwrap_or_else(|| VALUE_NOT_SPECIFIED.to_string());

        let published = candidate.published.unwrap_or(now).date();
        let expiry = published
            .checked_add_days(Days::new(self.expiry_days))
            .unwrap_or(NaiveDate::MAX);
        let summary = self.classifiers.build_summary(category, &location.display);

        Tender {
            id,
            title: candidate.title,
            link: candidate.link,
            source: candidate.source,
            category,
            location: location.display,
            district: location.district,
            value,
            published,
            expiry,
            summary,
        }
    }
}
