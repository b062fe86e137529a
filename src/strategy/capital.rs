//! Capital efficiency: true ROI and portfolio dead capital.
//!
//! True ROI charges the gross margin with everything that accrues while a
//! vehicle sits on the lot:
//!
//!   holding  = days × daily_holding_cost
//!   capital  = acquisition × (coc% / 100) / 365 × days
//!   net      = expected_margin − holding − marketing − capital
//!   true ROI = net / (acquisition + reconditioning) × 100
//!
//! A non-positive investment yields an ROI of exactly 0.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::types::{
    CapitalMetrics, CarEconomicProfile, DealerCostProfile, PortfolioHealth, PortfolioRisk,
};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Portfolio risk bands over the capital-lock score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapitalConfig {
    /// Lock score strictly above this is High risk.
    pub high_risk_lock_score: f64,
    /// Lock score strictly above this is Medium risk.
    pub medium_risk_lock_score: f64,
}

impl Default for CapitalConfig {
    fn default() -> Self {
        Self {
            high_risk_lock_score: 30.0,
            medium_risk_lock_score: 15.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Cost breakdown
// ---------------------------------------------------------------------------

/// Every cost term that feeds a true-ROI figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub accumulated_holding_cost: f64,
    pub accumulated_capital_cost: f64,
    pub marketing_cost: f64,
    pub net_margin: f64,
    pub total_investment: f64,
    /// Percent.
    pub true_roi: f64,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct CapitalEngine {
    config: CapitalConfig,
}

impl CapitalEngine {
    pub fn new(config: CapitalConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CapitalConfig {
        &self.config
    }

    /// Itemise the costs accrued after `days_on_market` days.
    pub fn cost_breakdown(
        &self,
        profile: &CarEconomicProfile,
        dealer_cost: &DealerCostProfile,
        days_on_market: u32,
    ) -> CostBreakdown {
        let days = days_on_market as f64;
        let accumulated_holding_cost = days * profile.daily_holding_cost;
        let accumulated_capital_cost = dealer_cost.daily_capital_cost(profile.acquisition_cost) * days;
        let marketing_cost = dealer_cost.average_marketing_cost_per_car;

        let net_margin =
            profile.expected_margin - accumulated_holding_cost - marketing_cost - accumulated_capital_cost;

        let total_investment = profile.total_investment();
        let true_roi = if total_investment <= 0.0 {
            0.0
        } else {
            net_margin / total_investment * 100.0
        };

        CostBreakdown {
            accumulated_holding_cost,
            accumulated_capital_cost,
            marketing_cost,
            net_margin,
            total_investment,
            true_roi,
        }
    }

    /// True ROI in percent after holding, marketing and capital costs.
    pub fn calculate_true_roi(
        &self,
        profile: &CarEconomicProfile,
        dealer_cost: &DealerCostProfile,
        days_on_market: u32,
    ) -> f64 {
        self.cost_breakdown(profile, dealer_cost, days_on_market).true_roi
    }

    /// Aggregate dead capital across a dealer's inventory.
    ///
    /// `days_on_market` maps a `car_id` to its current days on market.
    /// Vehicles with negative true ROI contribute their acquisition cost.
    pub fn calculate_portfolio_health<F>(
        &self,
        profiles: &[CarEconomicProfile],
        metrics: &CapitalMetrics,
        dealer_cost: &DealerCostProfile,
        days_on_market: F,
    ) -> PortfolioHealth
    where
        F: Fn(&str) -> u32,
    {
        let mut total_dead_capital = 0.0;
        let mut dead_count = 0usize;

        for profile in profiles {
            let days = days_on_market(profile.car_id.as_str());
            let roi = self.calculate_true_roi(profile, dealer_cost, days);
            if roi < 0.0 {
                debug!(
                    car_id = %profile.car_id,
                    days,
                    roi = format!("{roi:.2}%"),
                    "Vehicle counted as dead capital"
                );
                total_dead_capital += profile.acquisition_cost;
                dead_count += 1;
            }
        }

        let capital_lock_score = if metrics.total_inventory_value <= 0.0 {
            0.0
        } else {
            (total_dead_capital / metrics.total_inventory_value * 100.0).clamp(0.0, 100.0)
        };

        let portfolio_risk = self.risk_band(capital_lock_score);

        info!(
            vehicles = profiles.len(),
            dead = dead_count,
            dead_capital = format!("₹{total_dead_capital:.0}"),
            lock_score = format!("{capital_lock_score:.1}"),
            risk = %portfolio_risk,
            "Portfolio health computed"
        );

        PortfolioHealth {
            total_dead_capital,
            capital_lock_score,
            portfolio_risk,
        }
    }

    pub fn risk_band(&self, capital_lock_score: f64) -> PortfolioRisk {
        if capital_lock_score > self.config.high_risk_lock_score {
            PortfolioRisk::High
        } else if capital_lock_score > self.config.medium_risk_lock_score {
            PortfolioRisk::Medium
        } else {
            PortfolioRisk::Low
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
