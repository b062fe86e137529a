//! Shared types for the profit intelligence engine.
//!
//! These types form the data model used across all modules. Inputs are
//! snapshots produced by the dealer's aggregation jobs; outputs are the
//! decision objects the engine emits. Nothing here is mutated by the engines.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Per-vehicle economics, frozen for one evaluation cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarEconomicProfile {
    pub car_id: String,
    pub acquisition_cost: f64,
    pub reconditioning_cost: f64,
    /// Gross margin before holding and capital costs.
    pub expected_margin: f64,
    pub daily_holding_cost: f64,
}

impl CarEconomicProfile {
    /// Acquisition plus reconditioning.
    pub fn total_investment(&self) -> f64 {
        self.acquisition_cost + self.reconditioning_cost
    }
}

/// Dealer-wide cost configuration, shared by every vehicle of a dealer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealerCostProfile {
    /// Annualized, in percent (12.0 = 12%).
    pub cost_of_capital_percentage: f64,
    pub average_marketing_cost_per_car: f64,
}

impl DealerCostProfile {
    /// Capital cost of holding `acquisition_cost` for one day.
    pub fn daily_capital_cost(&self, acquisition_cost: f64) -> f64 {
        acquisition_cost * (self.cost_of_capital_percentage / 100.0) / 365.0
    }
}

/// Listing performance signals for one vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryMetrics {
    pub days_on_market: u32,
    /// Leads per day.
    pub lead_velocity: f64,
    /// Positive = overpriced vs. market average.
    pub price_deviation_percent: f64,
    /// 0–100, computed upstream.
    pub segment_demand_score: f64,
}

/// Portfolio-wide aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapitalMetrics {
    pub total_inventory_value: f64,
    pub cars_sold_last_30_days: u32,
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// One vehicle as exported by the aggregation job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleRecord {
    pub profile: CarEconomicProfile,
    pub metrics: InventoryMetrics,
    pub current_price: f64,
    pub avg_market_price: f64,
}

/// A dealer's whole inventory at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    pub dealer_id: String,
    pub dealer_cost: DealerCostProfile,
    pub capital_metrics: CapitalMetrics,
    #[serde(default)]
    pub vehicles: Vec<VehicleRecord>,
}

impl InventorySnapshot {
    /// Structural checks only; numeric plausibility is the exporter's job.
    pub fn validate(&self) -> Result<(), ProfitIntelError> {
        if self.dealer_id.trim().is_empty() {
            return Err(ProfitIntelError::Snapshot("dealer_id is empty".into()));
        }
        let mut seen = std::collections::HashSet::new();
        for v in &self.vehicles {
            if v.profile.car_id.trim().is_empty() {
                return Err(ProfitIntelError::Snapshot("vehicle with empty car_id".into()));
            }
            if !seen.insert(v.profile.car_id.as_str()) {
                return Err(ProfitIntelError::Snapshot(format!(
                    "duplicate car_id: {}",
                    v.profile.car_id
                )));
            }
        }
        Ok(())
    }

    pub fn profiles(&self) -> Vec<CarEconomicProfile> {
        self.vehicles.iter().map(|v| v.profile.clone()).collect()
    }
}

// ---------------------------------------------------------------------------
// Status enums
// ---------------------------------------------------------------------------

/// Tri-state listing health derived from the health score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InventoryStatus {
    Healthy,
    SlowMoving,
    DeadCapital,
}

impl fmt::Display for InventoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InventoryStatus::Healthy => write!(f, "Healthy"),
            InventoryStatus::SlowMoving => write!(f, "Slow Moving"),
            InventoryStatus::DeadCapital => write!(f, "Dead Capital"),
        }
    }
}

/// Portfolio risk band derived from the capital-lock score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortfolioRisk {
    Low,
    Medium,
    High,
}

impl fmt::Display for PortfolioRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortfolioRisk::Low => write!(f, "Low"),
            PortfolioRisk::Medium => write!(f, "Medium"),
            PortfolioRisk::High => write!(f, "High"),
        }
    }
}

/// Kind of recommendation handed to the dealer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    ReducePrice,
    Liquidate,
    ImprovePhotos,
    Hold,
}

impl ActionType {
    pub const ALL: &'static [ActionType] = &[
        ActionType::ReducePrice,
        ActionType::Liquidate,
        ActionType::ImprovePhotos,
        ActionType::Hold,
    ];
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionType::ReducePrice => write!(f, "reduce_price"),
            ActionType::Liquidate => write!(f, "liquidate"),
            ActionType::ImprovePhotos => write!(f, "improve_photos"),
            ActionType::Hold => write!(f, "hold"),
        }
    }
}

impl std::str::FromStr for ActionType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reduce_price" => Ok(ActionType::ReducePrice),
            "liquidate" => Ok(ActionType::Liquidate),
            "improve_photos" => Ok(ActionType::ImprovePhotos),
            "hold" => Ok(ActionType::Hold),
            _ => Err(anyhow::anyhow!("Unknown action type: {s}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// One simulated price-drop step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingSimulationResult {
    pub price_drop: f64,
    pub new_margin: f64,
    /// Percent.
    pub predicted_lead_increase: f64,
    pub predicted_days_saved: f64,
    pub net_profit_impact: f64,
}

/// Portfolio-level dead-capital summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioHealth {
    pub total_dead_capital: f64,
    /// 0–100.
    pub capital_lock_score: f64,
    pub portfolio_risk: PortfolioRisk,
}

/// The single recommendation produced for a vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategicAction {
    pub car_id: String,
    pub action_type: ActionType,
    /// 0–100.
    pub urgency: f64,
    pub impact_score: f64,
    pub expected_profit_gain: f64,
    pub recommendation_text: String,
}

impl fmt::Display for StrategicAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} (urgency {:.0} | impact {:.1} | gain ₹{:.0}) {}",
            self.car_id,
            self.action_type,
            self.urgency,
            self.impact_score,
            self.expected_profit_gain,
            self.recommendation_text,
        )
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific errors. The engines themselves never fail; these come
/// from configuration and the file edges around them.
#[derive(Debug, thiserror::Error)]
pub enum ProfitIntelError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid snapshot: {0}")]
    Snapshot(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
