//! Persistence layer.
//!
//! Reads inventory snapshots exported by the aggregation job and writes
//! action-queue reports, both as JSON files. The engines never touch disk;
//! only the binary and its runner go through here.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info};

use crate::engine::runner::ActionQueueReport;
use crate::types::{InventorySnapshot, ProfitIntelError};

/// Load and structurally validate an inventory snapshot.
pub fn load_snapshot(path: &str) -> Result<InventorySnapshot> {
    if !Path::new(path).exists() {
        return Err(ProfitIntelError::Storage(format!("snapshot not found: {path}")).into());
    }

    let json = std::fs::read_to_string(path)
        .context(format!("Failed to read snapshot from {path}"))?;

    let snapshot: InventorySnapshot = serde_json::from_str(&json)
        .context(format!("Failed to parse snapshot from {path}"))?;

    snapshot.validate()?;

    info!(
        path,
        dealer_id = %snapshot.dealer_id,
        vehicles = snapshot.vehicles.len(),
        "Snapshot loaded"
    );

    Ok(snapshot)
}

/// Save an action-queue report, creating parent directories as needed.
pub fn save_report(report: &ActionQueueReport, path: &str) -> Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .context(format!("Failed to create report directory for {path}"))?;
        }
    }

    let json = serde_json::to_string_pretty(report)
        .context("Failed to serialise action-queue report")?;

    std::fs::write(path, &json)
        .context(format!("Failed to write report to {path}"))?;

    debug!(path, run_id = %report.run_id, actions = report.actions.len(), "Report saved");
    Ok(())
}

/// Load a previously written report.
pub fn load_report(path: &str) -> Result<ActionQueueReport> {
    let json = std::fs::read_to_string(path)
        .context(format!("Failed to read report from {path}"))?;
    let report = serde_json::from_str(&json)
        .context(format!("Failed to parse report from {path}"))?;
    Ok(report)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
