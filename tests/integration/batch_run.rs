//! Full batch run: config → snapshot file → parallel evaluation → report file.

use std::sync::Arc;

use profit_intel::config::AppConfig;
use profit_intel::engine::runner;
use profit_intel::storage;
use profit_intel::strategy::DecisionEngine;
use profit_intel::types::{ActionType, InventorySnapshot, PortfolioRisk};

const SNAPSHOT_JSON: &str = r#"{
  "dealer_id": "DLR-TEST",
  "dealer_cost": { "cost_of_capital_percentage": 12.0, "average_marketing_cost_per_car": 5000.0 },
  "capital_metrics": { "total_inventory_value": 1500000.0, "cars_sold_last_30_days": 4 },
  "vehicles": [
    {
      "profile": { "car_id": "healthy", "acquisition_cost": 500000.0, "reconditioning_cost": 20000.0,
                   "expected_margin": 80000.0, "daily_holding_cost": 100.0 },
      "metrics": { "days_on_market": 10, "lead_velocity": 1.5, "price_deviation_percent": 1.0,
                   "segment_demand_score": 90.0 },
      "current_price": 606000.0, "avg_market_price": 600000.0
    },
    {
      "profile": { "car_id": "overpriced", "acquisition_cost": 500000.0, "reconditioning_cost": 20000.0,
                   "expected_margin": 80000.0, "daily_holding_cost": 100.0 },
      "metrics": { "days_on_market": 41, "lead_velocity": 0.3, "price_deviation_percent": 8.0,
                   "segment_demand_score": 60.0 },
      "current_price": 648000.0, "avg_market_price": 600000.0
    },
    {
      "profile": { "car_id": "stale", "acquisition_cost": 500000.0, "reconditioning_cost": 20000.0,
                   "expected_margin": 10000.0, "daily_holding_cost": 100.0 },
      "metrics": { "days_on_market": 60, "lead_velocity": 0.0, "price_deviation_percent": 0.0,
                   "segment_demand_score": 20.0 },
      "current_price": 600000.0, "avg_market_price": 600000.0
    }
  ]
}"#;

fn temp_path(kind: &str) -> String {
    let mut p = std::env::temp_dir();
    p.push(format!("profit_intel_it_{kind}_{}.json", uuid::Uuid::new_v4()));
    p.to_string_lossy().to_string()
}

fn config(snapshot_path: &str, report_path: &str, extra: &str) -> AppConfig {
    let toml = format!(
        "[run]\ndealer_id = \"DLR-TEST\"\nsnapshot_path = \"{snapshot_path}\"\nreport_path = \"{report_path}\"\nmax_concurrency = 2\n{extra}"
    );
    AppConfig::from_toml(&toml).expect("test config must parse")
}

#[test]
fn batch_run_round_trips_through_files() {
    let snapshot_path = temp_path("snapshot");
    let report_path = temp_path("report");
    std::fs::write(&snapshot_path, SNAPSHOT_JSON).unwrap();

    let cfg = config(&snapshot_path, &report_path, "");
    cfg.validate().unwrap();

    let snapshot = storage::load_snapshot(&cfg.run.snapshot_path).unwrap();
    let engine = Arc::new(DecisionEngine::from_config(&cfg.engine));
    let report = tokio_test::block_on(runner::run_batch(engine, &snapshot, cfg.run.max_concurrency)).unwrap();

    assert_eq!(report.vehicles_evaluated, 3);
    assert_eq!(report.holds, 1);
    assert_eq!(report.actions.len(), 2);
    assert_eq!(report.actions[0].car_id, "stale");
    assert_eq!(report.actions[0].action_type, ActionType::Liquidate);
    assert_eq!(report.actions[1].car_id, "overpriced");
    assert_eq!(report.actions[1].action_type, ActionType::ReducePrice);
    // 500000 dead / 1500000 total = 33.3% → High
    assert_eq!(report.portfolio.portfolio_risk, PortfolioRisk::High);

    storage::save_report(&report, &cfg.run.report_path).unwrap();
    let loaded = storage::load_report(&cfg.run.report_path).unwrap();
    assert_eq!(loaded.run_id, report.run_id);
    assert_eq!(loaded.actions, report.actions);
    assert_eq!(loaded.action_counts, report.action_counts);
    assert_eq!(loaded.evaluations.len(), 3);

    std::fs::remove_file(&snapshot_path).unwrap();
    std::fs::remove_file(&report_path).unwrap();
}

#[tokio::test]
async fn tuned_config_changes_decisions() {
    let snapshot: InventorySnapshot = serde_json::from_str(SNAPSHOT_JSON).unwrap();

    // Very elastic market: the price drop now pays for itself.
    let cfg = config(
        "unused.json",
        "unused_report.json",
        "[engine.pricing]\nelasticity_multiplier = 300.0\n",
    );
    cfg.validate().unwrap();

    let engine = Arc::new(DecisionEngine::from_config(&cfg.engine));
    let report = runner::run_batch(engine, &snapshot, 4).await.unwrap();

    let reprice = report
        .actions
        .iter()
        .find(|a| a.car_id == "overpriced")
        .expect("overpriced car must still be repriced");
    assert!(reprice.expected_profit_gain > 0.0);
    assert_eq!(reprice.impact_score, reprice.expected_profit_gain);
    // 75 + 41 / 2 = 95.5
    assert!((reprice.urgency - 95.5).abs() < 1e-9);
}

#[test]
fn report_written_into_missing_directory() {
    let snapshot: InventorySnapshot = serde_json::from_str(SNAPSHOT_JSON).unwrap();
    let report = runner::evaluate_snapshot(&DecisionEngine::default(), &snapshot);

    let mut dir = std::env::temp_dir();
    dir.push(format!("profit_intel_it_dir_{}", uuid::Uuid::new_v4()));
    let path = dir.join("nested").join("queue.json");
    let path = path.to_string_lossy().to_string();

    storage::save_report(&report, &path).unwrap();
    assert!(std::path::Path::new(&path).exists());

    std::fs::remove_dir_all(&dir).unwrap();
}
