//! Command-line interface definitions.
//!
//! All options can also be provided through environment variables, which is
//! how the scheduled job passes them.

use clap::Parser;

/// Command-line arguments for the tender aggregator.
///
/// # Examples
///
/// ```sh
/// # Defaults: write ./tenders.json with built-in sources
/// tender_aggregator
///
/// # Custom config and output location, no detail page fetching
/// tender_aggregator -c sources.yaml -o public/tenders.json --no-enrich
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path of the JSON snapshot to write
    #[arg(short, long, env = "TENDERS_OUTPUT", default_value = "tenders.json")]
    pub output: String,

    /// Optional path to a YAML config file
    #[arg(short, long, env = "TENDERS_CONFIG")]
    pub config: Option<String>,

    /// Override the raw candidate count that stops tier escalation
    #[arg(long)]
    pub min_yield: Option<usize>,

    /// Skip detail page and document enrichment
    #[arg(long)]
    pub no_enrich: bool,

    /// Concurrent enrichment fetches
    #[arg(long)]
    pub enrich_concurrency: Option<usize>,
}
