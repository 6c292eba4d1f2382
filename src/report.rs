//! Report sink
//!
//! Persists the full classified list (idle and non-idle) as a pretty-printed
//! JSON array. Every run gets its own timestamped file; prior reports are
//! never overwritten.

use crate::error::{MonitorError, Result};
use crate::model::InstanceRecord;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::info;

/// Write the classified list to `<output_dir>/ec2_report_<YYYYMMDD_HHMMSS>.json`.
///
/// Creates the output directory if needed. If two runs land on the same
/// wall-clock second, a numeric suffix keeps the filenames distinct.
pub fn write_report(records: &[InstanceRecord], output_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir).map_err(|e| {
        MonitorError::Report(format!(
            "failed to create output directory {}: {}",
            output_dir.display(),
            e
        ))
    })?;

    let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
    let path = unique_report_path(output_dir, &timestamp.to_string());

    let json = serde_json::to_string_pretty(records)?;
    std::fs::write(&path, json).map_err(|e| {
        MonitorError::Report(format!("failed to write {}: {}", path.display(), e))
    })?;

    info!("EC2 instances report saved to {}", path.display());
    Ok(path)
}

fn unique_report_path(output_dir: &Path, timestamp: &str) -> PathBuf {
    let base = output_dir.join(format!("ec2_report_{}.json", timestamp));
    if !base.exists() {
        return base;
    }
    let mut counter = 1u32;
    loop {
        let candidate = output_dir.join(format!("ec2_report_{}_{}.json", timestamp, counter));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}
