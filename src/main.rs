//! # Tender Aggregator
//!
//! Scrapes procurement tenders from a state e-procurement portal, falls back
//! to the government marketplace and news search feeds when the portal yields
//! too little, and writes one normalized JSON snapshot.
//!
//! ## Usage
//!
//! ```sh
//! tender_aggregator -o ./public/tenders.json
//! ```

use clap::Parser;
use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tender_aggregator::classify::Classifiers;
use tender_aggregator::config::Config;
use tender_aggregator::enrich::DetailEnricher;
use tender_aggregator::http::{HttpFetcher, PageFetcher};
use tender_aggregator::normalize::Normalizer;
use tender_aggregator::orchestrator::FallbackOrchestrator;
use tender_aggregator::outputs::json;
use tender_aggregator::pipeline::{self, SystemClock};
use tender_aggregator::scrapers::{self, CandidateFilter};
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;

use cli::Cli;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("tender_aggregator starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    // --- Configuration ---
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(min_yield) = args.min_yield {
        config.min_yield = min_yield;
    }
    if let Some(concurrency) = args.enrich_concurrency {
        config.enrich_concurrency = concurrency;
    }
    if args.no_enrich {
        config.enrich = false;
    }

    // --- Collaborators ---
    let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpFetcher::new(
        &config.user_agent,
        Duration::from_secs(config.timeout_secs),
    )?);
    let classifiers = Classifiers::new(&config.keywords);

    let orchestrator = FallbackOrchestrator::new(
        scrapers::tiers_from_config(&config, fetcher.clone()),
        config.min_yield,
    );

    let mut normalizer = Normalizer::new(
        classifiers.clone(),
        CandidateFilter::new(config.min_title_len, &config.blocked_words),
    )
    .with_expiry_days(config.expiry_days);
    if config.enrich {
        let enricher = DetailEnricher::new(
            fetcher,
            classifiers,
            &config.document_extensions,
            config.pdf_max_chars,
        );
        normalizer = normalizer.with_enricher(Arc::new(enricher), config.enrich_concurrency);
        info!(concurrency = config.enrich_concurrency, "Detail enrichment enabled");
    }

    // --- Run ---
    let snapshot = pipeline::run(&orchestrator, &normalizer, &SystemClock).await;
    info!(total = snapshot.total, updated = %snapshot.updated, "Final tenders");

    if let Err(e) = json::write_snapshot(&snapshot, Path::new(&args.output)).await {
        error!(path = %args.output, error = %e, "Failed to write snapshot");
        return Err(e);
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
