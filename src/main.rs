//! Profit Intelligence: batch entry point.
//!
//! Loads configuration, initialises structured logging, reads the dealer's
//! inventory snapshot, evaluates every vehicle, and writes the ranked
//! action queue. Scheduling is left to whatever invokes the binary.

use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info};

use profit_intel::config::AppConfig;
use profit_intel::engine::runner::{self, ActionQueueReport};
use profit_intel::storage;
use profit_intel::strategy::DecisionEngine;

/// Number of actions echoed to the log after a run.
const LOG_TOP_ACTIONS: usize = 10;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let config_path = AppConfig::resolve_path();
    let cfg = AppConfig::load(&config_path)?;

    init_logging();

    info!(
        config = %config_path,
        dealer_id = %cfg.run.dealer_id,
        snapshot = %cfg.run.snapshot_path,
        max_concurrency = cfg.run.max_concurrency,
        "Profit Intelligence starting"
    );

    if let Err(e) = cfg.validate() {
        error!(error = %e, "Configuration error");
        return Err(e);
    }

    let snapshot = storage::load_snapshot(&cfg.run.snapshot_path)?;
    if snapshot.dealer_id != cfg.run.dealer_id {
        anyhow::bail!(
            "Snapshot belongs to dealer {} but config is for {}",
            snapshot.dealer_id,
            cfg.run.dealer_id
        );
    }

    let engine = Arc::new(DecisionEngine::from_config(&cfg.engine));
    let report = runner::run_batch(engine, &snapshot, cfg.run.max_concurrency).await?;

    log_report(&report);

    storage::save_report(&report, &cfg.run.report_path)?;
    info!(path = %cfg.run.report_path, run_id = %report.run_id, "Action queue written");

    Ok(())
}

/// Log a human-readable run summary.
fn log_report(report: &ActionQueueReport) {
    info!(
        run_id = %report.run_id,
        dealer_id = %report.dealer_id,
        evaluated = report.vehicles_evaluated,
        actions = report.actions.len(),
        holds = report.holds,
        no_action = report.no_action,
        expected_gain = format!("₹{}", report.total_expected_gain),
        dead_capital = format!("₹{:.0}", report.portfolio.total_dead_capital),
        lock_score = format!("{:.1}", report.portfolio.capital_lock_score),
        risk = %report.portfolio.portfolio_risk,
        "Run complete"
    );

    for (rank, action) in report.top(LOG_TOP_ACTIONS).iter().enumerate() {
        info!("  [{}] {}", rank + 1, action);
    }
    if report.actions.len() > LOG_TOP_ACTIONS {
        info!("  ... and {} more", report.actions.len() - LOG_TOP_ACTIONS);
    }
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("profit_intel=info"));

    let json_logging = std::env::var("PROFIT_INTEL_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
