//! Tiered source fallback.
//!
//! Sources are grouped into tiers ranked by data quality: the portal first,
//! then the marketplace, then news-feed search. A tier is only invoked when
//! everything collected so far is below the minimum yield. Escalation is
//! monotone: no tier is retried, and a skipped tier is never revisited.
//!
//! Adapters inside one tier have no ordering dependency, so they are fetched
//! concurrently. Their results are appended in adapter order once the whole
//! tier completes, which keeps the candidate sequence and the escalation
//! decision independent of network timing.

use crate::models::RawCandidate;
use crate::scrapers::SourceAdapter;
use futures::future::join_all;
use itertools::Itertools;
use tracing::{debug, info, instrument, warn};

/// A priority rank of source adapters.
pub struct Tier {
    pub name: String,
    pub adapters: Vec<Box<dyn SourceAdapter>>,
}

impl Tier {
    pub fn new(name: impl Into<String>, adapters: Vec<Box<dyn SourceAdapter>>) -> Self {
        Self {
            name: name.into(),
            adapters,
        }
    }
}

/// What one invoked tier contributed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierReport {
    pub tier: String,
    /// Raw candidates from this tier, before deduplication.
    pub yielded: usize,
    /// Names of adapters whose fetch failed.
    pub failed_sources: Vec<String>,
}

/// Candidates gathered by one orchestrator pass.
#[derive(Debug, Default)]
pub struct Collection {
    /// Raw candidates in tier order, then adapter order.
    pub candidates: Vec<RawCandidate>,
    /// One report per invoked tier; skipped tiers have none.
    pub reports: Vec<TierReport>,
}

impl Collection {
    /// Adapters that failed across all invoked tiers.
    pub fn failed_sources(&self) -> usize {
        self.reports.iter().map(|r| r.failed_sources.len()).sum()
    }

    pub fn tiers_invoked(&self) -> usize {
        self.reports.len()
    }
}

/// Runs tiers in priority order and stops escalating once enough raw
/// candidates have been collected.
pub struct FallbackOrchestrator {
    tiers: Vec<Tier>,
    min_yield: usize,
}

impl FallbackOrchestrator {
    /// Creates an orchestrator over `tiers`, highest priority first.
    ///
    /// # Arguments
    ///
    /// * `tiers` - Tiers in escalation order
    /// * `min_yield` - Raw candidate count at which lower tiers are skipped
    pub fn new(tiers: Vec<Tier>, min_yield: usize) -> Self {
        Self { tiers, min_yield }
    }

    pub fn min_yield(&self) -> usize {
        self.min_yield
    }

    /// Invoke tiers in priority order until the running raw total reaches
    /// `min_yield`. The first tier always runs.
    #[instrument(level = "info", skip_all, fields(min_yield = self.min_yield))]
    pub async fn collect(&self) -> Collection {
        let mut collection = Collection::default();

        for (index, tier) in self.tiers.iter().enumerate() {
            let results = join_all(tier.adapters.iter().map(|a| a.fetch())).await;

            let mut report = TierReport {
                tier: tier.name.clone(),
                yielded: 0,
                failed_sources: Vec::new(),
            };
            for (adapter, result) in tier.adapters.iter().zip(results) {
                match result {
                    Ok(mut found) => {
                        debug!(
                            tier = %tier.name,
                            source = %adapter.source(),
                            adapter = adapter.name(),
                            count = found.len(),
                            "Source fetched"
                        );
                        report.yielded += found.len();
                        collection.candidates.append(&mut found);
                    }
                    Err(e) => {
                        warn!(
                            tier = %tier.name,
                            source = %adapter.source(),
                            adapter = adapter.name(),
                            error = %e,
                            "Source unavailable; treating as empty"
                        );
                        report.failed_sources.push(adapter.name().to_string());
                    }
                }
            }

            let total = collection.candidates.len();
            info!(
                tier = %tier.name,
                yielded = report.yielded,
                total,
                failed = report.failed_sources.len(),
                "Tier completed"
            );
            collection.reports.push(report);

            if total >= self.min_yield {
                let skipped = self.tiers[index + 1..].iter().map(|t| t.name.as_str()).join(", ");
                if !skipped.is_empty() {
                    info!(total, %skipped, "Minimum yield reached; skipping lower tiers");
                }
                break;
            }
        }

        collection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::FetchError;
    use crate::models::SourceName;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Adapter yielding a fixed number of candidates and counting calls.
    struct Scripted {
        label: &'static str,
        yield_count: Option<usize>,
        calls: Arc<AtomicUsize>,
    }

    impl Scripted {
        fn boxed(
            label: &'static str,
            yield_count: Option<usize>,
        ) -> (Box<dyn SourceAdapter>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let adapter = Scripted {
                label,
                yield_count,
                calls: calls.clone(),
            };
            (Box::new(adapter), calls)
        }
    }

    #[async_trait]
    impl SourceAdapter for Scripted {
        async fn fetch(&self) -> Result<Vec<RawCandidate>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let n = self
                .yield_count
                .ok_or_else(|| FetchError::NotFound(self.label.to_string()))?;
            Ok((0..n)
                .map(|i| {
                    RawCandidate::new(
                        format!("{} tender number {}", self.label, i),
                        "https://example.test",
                        SourceName::Portal,
                    )
                })
                .collect())
        }

        fn name(&self) -> &str {
            self.label
        }

        fn source(&self) -> SourceName {
            SourceName::Portal
        }
    }

    fn three_tiers(
        a: Option<usize>,
        b: Option<usize>,
        c: Option<usize>,
    ) -> (Vec<Tier>, [Arc<AtomicUsize>; 3]) {
        let (ta, ca) = Scripted::boxed("primary", a);
        let (tb, cb) = Scripted::boxed("secondary", b);
        let (tc, cc) = Scripted::boxed("tertiary", c);
        (
            vec![
                Tier::new("primary", vec![ta]),
                Tier::new("secondary", vec![tb]),
                Tier::new("tertiary", vec![tc]),
            ],
            [ca, cb, cc],
        )
    }

    #[tokio::test]
    async fn test_threshold_reached_skips_tertiary() {
        let (tiers, calls) = three_tiers(Some(4), Some(7), Some(5));
        let collection = FallbackOrchestrator::new(tiers, 10).collect().await;
        assert_eq!(collection.candidates.len(), 11);
        assert_eq!(calls[2].load(Ordering::SeqCst), 0);
        assert_eq!(collection.tiers_invoked(), 2);
    }

    #[tokio::test]
    async fn test_threshold_missed_invokes_tertiary() {
        let (tiers, calls) = three_tiers(Some(4), Some(3), Some(5));
        let collection = FallbackOrchestrator::new(tiers, 10).collect().await;
        assert_eq!(collection.candidates.len(), 12);
        assert_eq!(calls[2].load(Ordering::SeqCst), 1);
        assert_eq!(collection.tiers_invoked(), 3);
    }

    #[tokio::test]
    async fn test_primary_enough_runs_only_primary() {
        let (tiers, calls) = three_tiers(Some(5), Some(3), Some(3));
        let collection = FallbackOrchestrator::new(tiers, 5).collect().await;
        assert_eq!(collection.candidates.len(), 5);
        assert_eq!(calls[1].load(Ordering::SeqCst), 0);
        assert_eq!(calls[2].load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_tier_counts_as_empty() {
        let (tiers, calls) = three_tiers(None, Some(2), None);
        let collection = FallbackOrchestrator::new(tiers, 5).collect().await;
        assert_eq!(collection.candidates.len(), 2);
        assert!(calls.iter().all(|c| c.load(Ordering::SeqCst) == 1));
        assert_eq!(collection.failed_sources(), 2);
        assert_eq!(collection.reports[0].failed_sources, vec!["primary".to_string()]);
        assert_eq!(collection.reports[1].yielded, 2);
    }

    #[tokio::test]
    async fn test_adapter_order_preserved_within_tier() {
        let (a, _) = Scripted::boxed("first", Some(2));
        let (b, _) = Scripted::boxed("second", Some(1));
        let orchestrator = FallbackOrchestrator::new(vec![Tier::new("primary", vec![a, b])], 1);
        let titles: Vec<String> = orchestrator
            .collect()
            .await
            .candidates
            .into_iter()
            .map(|c| c.title)
            .collect();
        assert_eq!(
            titles,
            vec!["first tender number 0", "first tender number 1", "second tender number 0"]
        );
    }

    #[tokio::test]
    async fn test_no_tiers_yields_nothing() {
        let collection = FallbackOrchestrator::new(Vec::new(), 5).collect().await;
        assert!(collection.candidates.is_empty());
        assert_eq!(collection.tiers_invoked(), 0);
    }
}
