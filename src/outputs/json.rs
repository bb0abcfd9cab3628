//! JSON snapshot output.
//!
//! Each run writes one document that fully replaces the previous one:
//!
//! ```text
//! {
//!   "updated": "01 Jan 2024 09:30",
//!   "total": 2,
//!   "data": [ { "id": "...", "title": "...", ... } ]
//! }
//! ```
//!
//! The document is written to a sibling temp file first and then renamed
//! over the target, so readers never observe a half-written snapshot.

use crate::models::RunSnapshot;
use crate::utils::ensure_parent_dir;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

/// Serialize `snapshot` as pretty-printed JSON and replace `path` with it.
///
/// # Arguments
///
/// * `snapshot` - The run's output
/// * `path` - Target file; missing parent directories are created
///
/// # Returns
///
/// `Ok(())` once the rename succeeded, otherwise the serialization or I/O
/// error.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_snapshot(snapshot: &RunSnapshot, path: &Path) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(snapshot)?;

    ensure_parent_dir(path).await?;

    let tmp_path = path.with_extension("json.tmp");
    if let Err(e) = fs::write(&tmp_path, json).await {
        error!(path = %tmp_path.display(), error = %e, "Failed to write snapshot");
        return Err(e.into());
    }
    fs::rename(&tmp_path, path).await?;

    info!(total = snapshot.total, "Wrote tender snapshot");
    Ok(())
}
