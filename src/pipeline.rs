//! One aggregation run: collect, normalize, snapshot.
//!
//! [`run`] is the whole core. It performs no file I/O and reads the time only
//! through a [`Clock`], so callers decide where the snapshot goes and tests can
//! pin the run time.

use crate::models::RunSnapshot;
use crate::normalize::Normalizer;
use crate::orchestrator::FallbackOrchestrator;
use chrono::{Local, NaiveDateTime};
use tracing::{info, instrument, warn};

/// Human-readable layout of [`RunSnapshot::updated`], e.g. `01 Jan 2024 09:30`.
pub const UPDATED_FORMAT: &str = "%d %b %Y %H:%M";

/// Source of the run time.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock in the local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Run the pipeline once and return the snapshot.
///
/// # Arguments
///
/// * `orchestrator` - Tiered sources to collect from
/// * `normalizer` - Dedup, enrichment and field layering
/// * `clock` - Source of the run time stamped into `updated`
///
/// # Returns
///
/// The snapshot of this run. Source outages only shrink it; they never fail
/// the run.
#[instrument(level = "info", skip_all)]
pub async fn run(
    orchestrator: &FallbackOrchestrator,
    normalizer: &Normalizer,
    clock: &dyn Clock,
) -> RunSnapshot {
    let now = clock.now();

    let collection = orchestrator.collect().await;
    let raw_count = collection.candidates.len();
    let failed_sources = collection.failed_sources();
    let tiers_invoked = collection.tiers_invoked();

    let (tenders, stats) = normalizer.normalize(collection.candidates, now).await;

    if failed_sources > 0 {
        warn!(failed_sources, "Some sources were unavailable; snapshot may be incomplete");
    }
    if raw_count < orchestrator.min_yield() {
        warn!(
            raw_count,
            min_yield = orchestrator.min_yield(),
            "All tiers exhausted below minimum yield"
        );
    }
    info!(
        tiers_invoked,
        raw_count,
        tenders = tenders.len(),
        duplicates = stats.duplicates,
        blocked = stats.blocked,
        enriched = stats.enriched,
        "Run complete"
    );

    RunSnapshot::new(now.format(UPDATED_FORMAT).to_string(), tenders)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Classifiers;
    use crate::http::testing::StaticFetcher;
    use crate::models::{Category, SourceName};
    use crate::orchestrator::Tier;
    use crate::scrapers::{CandidateFilter, SourceAdapter};
    use crate::scrapers::feed::{FeedAdapter, search_url};
    use crate::scrapers::marketplace::MarketplaceAdapter;
    use crate::scrapers::portal::PortalAdapter;
    use chrono::NaiveDate;
    use std::sync::Arc;

    const PORTAL_URL: &str = "https://portal.test/listing";
    const MARKET_URL: &str = "https://market.test/all-bids";

    fn clock() -> FixedClock {
        FixedClock(
            NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
        )
    }

    fn orchestrator(fetcher: Arc<StaticFetcher>, min_yield: usize) -> FallbackOrchestrator {
        let filter = CandidateFilter::default();
        FallbackOrchestrator::new(
            vec![
                Tier::new(
                    "primary",
                    vec![Box::new(PortalAdapter::new(
                        fetcher.clone(),
                        PORTAL_URL,
                        "https://portal.test",
                        filter.clone(),
                    )) as Box<dyn SourceAdapter>],
                ),
                Tier::new(
                    "secondary",
                    vec![Box::new(MarketplaceAdapter::new(
                        fetcher.clone(),
                        MARKET_URL,
                        "bid no",
                        filter.clone(),
                    )) as Box<dyn SourceAdapter>],
                ),
                Tier::new(
                    "tertiary",
                    vec![
                        Box::new(FeedAdapter::for_query(fetcher, "tender", 10, filter))
                            as Box<dyn SourceAdapter>,
                    ],
                ),
            ],
            min_yield,
        )
    }

    #[tokio::test]
    async fn test_run_with_portal_down_falls_back() {
        let market = r#"<p>Bid No: GEM/2024/B/1 Supply of transformer, Nashik</p>"#;
        let feed = r#"<rss><channel>
            <item><title>Bid No: GEM/2024/B/1 Supply of transformer, Nashik - News</title>
                  <link>https://news.test/1</link>
                  <pubDate>Fri, 29 Dec 2023 10:00:00 GMT</pubDate></item>
            <item><title>Mumbai civic body floats Rs 25 crore road tender - News</title>
                  <link>https://news.test/2</link>
                  <pubDate>Sat, 30 Dec 2023 10:00:00 GMT</pubDate></item>
        </channel></rss>"#;
        let fetcher = Arc::new(
            StaticFetcher::new()
                .with_page(MARKET_URL, market)
                .with_page(&search_url("tender"), feed),
        );
        let normalizer = Normalizer::new(Classifiers::default(), CandidateFilter::default());

        let snapshot = run(&orchestrator(fetcher, 5), &normalizer, &clock()).await;

        assert_eq!(snapshot.updated, "01 Jan 2024 09:30");
        assert_eq!(snapshot.total, 2);
        assert_eq!(snapshot.data[0].source, SourceName::Marketplace);
        assert_eq!(snapshot.data[0].category, Category::Electrical);
        assert_eq!(snapshot.data[0].published, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());

        let feed_tender = &snapshot.data[1];
        assert_eq!(feed_tender.source, SourceName::Feed);
        assert_eq!(feed_tender.location, "Mumbai, Maharashtra");
        assert_eq!(feed_tender.value, "25 Cr");
        assert_eq!(feed_tender.published, NaiveDate::from_ymd_opt(2023, 12, 30).unwrap());
        assert_eq!(feed_tender.expiry, NaiveDate::from_ymd_opt(2024, 1, 14).unwrap());
    }

    #[tokio::test]
    async fn test_run_all_sources_down_is_empty_snapshot() {
        let normalizer = Normalizer::new(Classifiers::default(), CandidateFilter::default());
        let snapshot = run(
            &orchestrator(Arc::new(StaticFetcher::new()), 5),
            &normalizer,
            &clock(),
        )
        .await;
        assert_eq!(snapshot.total, 0);
        assert!(snapshot.data.is_empty());
    }

    #[test]
    fn test_system_clock_is_recent() {
        let now = SystemClock.now();
        assert!(now.date() >= NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }
}
