//! # Tender Aggregator
//!
//! Collects public procurement tenders from unreliable public sources and
//! normalizes them into one deduplicated snapshot.
//!
//! ## Architecture
//!
//! The pipeline runs once per invocation:
//! 1. **Collection**: [`orchestrator`] invokes [`scrapers`] tier by tier
//!    (portal, marketplace, news feeds) until enough raw candidates exist
//! 2. **Deduplication**: [`normalize`] keeps the first candidate per title
//! 3. **Enrichment**: [`enrich`] optionally reads detail pages and linked PDFs
//! 4. **Classification**: [`classify`] fills category, location and value
//!    from keyword tables, with fixed defaults as the last resort
//! 5. **Output**: the binary writes the [`models::RunSnapshot`] through
//!    [`outputs::json`]
//!
//! Source outages, unparseable dates and missing fields never abort a run;
//! they degrade the snapshot and are reported in the logs.

pub mod classify;
pub mod config;
pub mod document;
pub mod enrich;
pub mod http;
pub mod models;
pub mod normalize;
pub mod orchestrator;
pub mod outputs;
pub mod pipeline;
pub mod scrapers;
pub mod utils;
