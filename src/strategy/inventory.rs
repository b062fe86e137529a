//! Inventory health scoring.
//!
//! Collapses four listing signals into a 0–100 health score:
//!
//!   score = 0.4 × velocity + 0.3 × price + 0.2 × demand + 0.1 × aging
//!
//! where
//!   velocity = min(lead_velocity / target × 100, 100)
//!   price    = max(100 − max(0, deviation%) × 5, 0)      (underpricing is not penalised)
//!   demand   = segment_demand_score
//!   aging    = max(100 − max(0, days − 30) × 2, 0)

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{CarEconomicProfile, InventoryMetrics, InventoryStatus};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Weights and thresholds for health scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    pub velocity_weight: f64,
    pub price_weight: f64,
    pub demand_weight: f64,
    pub aging_weight: f64,
    /// Leads/day that earn a full velocity score.
    pub target_lead_velocity: f64,
    /// Points lost per percent overpriced.
    pub overprice_penalty_per_percent: f64,
    /// Days on market before the aging penalty starts.
    pub aging_grace_days: u32,
    /// Points lost per day past the grace period.
    pub aging_penalty_per_day: f64,
    /// Scores at or above this are Healthy.
    pub healthy_threshold: u8,
    /// Scores below this are Dead Capital.
    pub dead_capital_threshold: u8,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            velocity_weight: 0.4,
            price_weight: 0.3,
            demand_weight: 0.2,
            aging_weight: 0.1,
            target_lead_velocity: 1.0,
            overprice_penalty_per_percent: 5.0,
            aging_grace_days: 30,
            aging_penalty_per_day: 2.0,
            healthy_threshold: 70,
            dead_capital_threshold: 40,
        }
    }
}

impl InventoryConfig {
    pub fn weight_sum(&self) -> f64 {
        self.velocity_weight + self.price_weight + self.demand_weight + self.aging_weight
    }
}

// ---------------------------------------------------------------------------
// Health breakdown
// ---------------------------------------------------------------------------

/// Sub-scores behind a health score, each on a 0–100 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthBreakdown {
    pub velocity_score: f64,
    pub price_score: f64,
    pub demand_score: f64,
    pub aging_score: f64,
    pub health_score: u8,
    pub status: InventoryStatus,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct InventoryEngine {
    config: InventoryConfig,
}

impl InventoryEngine {
    pub fn new(config: InventoryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &InventoryConfig {
        &self.config
    }

    /// Score a listing and classify it.
    pub fn evaluate(&self, metrics: &InventoryMetrics, profile: &CarEconomicProfile) -> HealthBreakdown {
        let cfg = &self.config;

        let velocity_score = if cfg.target_lead_velocity > 0.0 {
            (metrics.lead_velocity / cfg.target_lead_velocity * 100.0).min(100.0)
        } else {
            100.0
        };

        let price_score = (100.0
            - metrics.price_deviation_percent.max(0.0) * cfg.overprice_penalty_per_percent)
            .max(0.0);

        let demand_score = metrics.segment_demand_score;

        let overdue_days = metrics.days_on_market.saturating_sub(cfg.aging_grace_days);
        let aging_score = (100.0 - overdue_days as f64 * cfg.aging_penalty_per_day).max(0.0);

        let weighted = velocity_score * cfg.velocity_weight
            + price_score * cfg.price_weight
            + demand_score * cfg.demand_weight
            + aging_score * cfg.aging_weight;

        // NaN clamps to 0 through the `as u8` cast.
        let health_score = weighted.round().clamp(0.0, 100.0) as u8;
        let status = self.get_inventory_status(health_score);

        debug!(
            car_id = %profile.car_id,
            velocity = format!("{velocity_score:.1}"),
            price = format!("{price_score:.1}"),
            demand = format!("{demand_score:.1}"),
            aging = format!("{aging_score:.1}"),
            health_score,
            status = %status,
            "Health scored"
        );

        HealthBreakdown {
            velocity_score,
            price_score,
            demand_score,
            aging_score,
            health_score,
            status,
        }
    }

    /// Weighted 0–100 health score, rounded to the nearest integer.
    pub fn calculate_health_score(&self, metrics: &InventoryMetrics, profile: &CarEconomicProfile) -> u8 {
        self.evaluate(metrics, profile).health_score
    }

    pub fn get_inventory_status(&self, score: u8) -> InventoryStatus {
        if score >= self.config.healthy_threshold {
            InventoryStatus::Healthy
        } else if score >= self.config.dead_capital_threshold {
            InventoryStatus::SlowMoving
        } else {
            InventoryStatus::DeadCapital
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
