//! Batch runner: evaluates a dealer's whole inventory snapshot.
//!
//! Vehicles are evaluated as independent tokio tasks behind a semaphore.
//! Evaluations come back in snapshot order before the action queue is
//! ranked, so a run is deterministic for a given snapshot.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info};

use crate::strategy::{Decision, DecisionEngine, Evaluation};
use crate::types::{
    ActionType, DealerCostProfile, InventorySnapshot, PortfolioHealth, StrategicAction,
    VehicleRecord,
};

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Everything one batch run produced for a dealer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionQueueReport {
    pub run_id: String,
    pub dealer_id: String,
    pub generated_at: DateTime<Utc>,
    pub vehicles_evaluated: usize,
    pub portfolio: PortfolioHealth,
    /// Ranked by urgency, then impact, then car_id.
    pub actions: Vec<StrategicAction>,
    pub action_counts: BTreeMap<ActionType, usize>,
    pub holds: usize,
    pub no_action: usize,
    /// Sum of expected profit gain over all actions, in rupees.
    pub total_expected_gain: Decimal,
    /// Per-vehicle scores and decisions, in snapshot order.
    pub evaluations: Vec<Evaluation>,
}

impl ActionQueueReport {
    /// The `n` most urgent actions.
    pub fn top(&self, n: usize) -> &[StrategicAction] {
        &self.actions[..n.min(self.actions.len())]
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

fn evaluate_vehicle(
    engine: &DecisionEngine,
    dealer_cost: &DealerCostProfile,
    vehicle: &VehicleRecord,
) -> Evaluation {
    engine.evaluate(
        &vehicle.profile,
        dealer_cost,
        &vehicle.metrics,
        vehicle.current_price,
        vehicle.avg_market_price,
    )
}

/// Evaluate every vehicle on the calling thread.
pub fn evaluate_snapshot(engine: &DecisionEngine, snapshot: &InventorySnapshot) -> ActionQueueReport {
    let evaluations = snapshot
        .vehicles
        .iter()
        .map(|v| evaluate_vehicle(engine, &snapshot.dealer_cost, v))
        .collect();
    build_report(engine, snapshot, evaluations)
}

/// Evaluate every vehicle as a tokio task, at most `max_concurrency` at a time.
pub async fn run_batch(
    engine: Arc<DecisionEngine>,
    snapshot: &InventorySnapshot,
    max_concurrency: usize,
) -> Result<ActionQueueReport> {
    let dealer_cost = Arc::new(snapshot.dealer_cost.clone());
    let semaphore = Arc::new(Semaphore::new(max_concurrency.max(1)));

    info!(
        dealer_id = %snapshot.dealer_id,
        vehicles = snapshot.vehicles.len(),
        max_concurrency,
        "Starting batch evaluation"
    );

    let mut tasks = Vec::with_capacity(snapshot.vehicles.len());
    for vehicle in snapshot.vehicles.iter().cloned() {
        let engine = Arc::clone(&engine);
        let dealer_cost = Arc::clone(&dealer_cost);
        let sem = Arc::clone(&semaphore);

        tasks.push(tokio::spawn(async move {
            let _permit = sem.acquire_owned().await.ok()?;
            Some(evaluate_vehicle(&engine, &dealer_cost, &vehicle))
        }));
    }

    // join_all yields in spawn order, which is snapshot order.
    let mut evaluations = Vec::with_capacity(tasks.len());
    for joined in join_all(tasks).await {
        let eval = joined
            .context("Vehicle evaluation task failed")?
            .context("Evaluation limiter closed")?;
        evaluations.push(eval);
    }

    Ok(build_report(&engine, snapshot, evaluations))
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

fn build_report(
    engine: &DecisionEngine,
    snapshot: &InventorySnapshot,
    evaluations: Vec<Evaluation>,
) -> ActionQueueReport {
    let days_by_car: HashMap<&str, u32> = snapshot
        .vehicles
        .iter()
        .map(|v| (v.profile.car_id.as_str(), v.metrics.days_on_market))
        .collect();

    let portfolio = engine.capital().calculate_portfolio_health(
        &snapshot.profiles(),
        &snapshot.capital_metrics,
        &snapshot.dealer_cost,
        |car_id| days_by_car.get(car_id).copied().unwrap_or(0),
    );

    let mut actions = Vec::new();
    let mut action_counts = BTreeMap::new();
    let mut holds = 0;
    let mut no_action = 0;

    for eval in &evaluations {
        match &eval.decision {
            Decision::Hold => holds += 1,
            Decision::NoAction => no_action += 1,
            Decision::Act { action, .. } => {
                *action_counts.entry(action.action_type).or_insert(0) += 1;
                actions.push(action.clone());
            }
        }
    }

    rank_actions(&mut actions);

    let total_expected_gain = actions
        .iter()
        .map(|a| Decimal::from_f64_retain(a.expected_profit_gain).unwrap_or(Decimal::ZERO))
        .sum::<Decimal>()
        .round_dp(2);

    debug!(
        actions = actions.len(),
        holds,
        no_action,
        "Action queue assembled"
    );

    ActionQueueReport {
        run_id: uuid::Uuid::new_v4().to_string(),
        dealer_id: snapshot.dealer_id.clone(),
        generated_at: Utc::now(),
        vehicles_evaluated: evaluations.len(),
        portfolio,
        actions,
        action_counts,
        holds,
        no_action,
        total_expected_gain,
        evaluations,
    }
}

/// Most urgent first; ties broken by impact, then car_id.
pub fn rank_actions(actions: &mut [StrategicAction]) {
    actions.sort_by(|a, b| {
        b.urgency
            .total_cmp(&a.urgency)
            .then_with(|| b.impact_score.total_cmp(&a.impact_score))
            .then_with(|| a.car_id.cmp(&b.car_id))
    });
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
