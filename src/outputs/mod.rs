//! Output generation.
//!
//! # Submodules
//!
//! - [`json`]: Writes the [`crate::models::RunSnapshot`] to a single JSON file
//!
//! # Output Structure
//!
//! ```text
//! tenders.json   # replaced on every run
//! ```

pub mod json;
