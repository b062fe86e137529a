//! Price-drop simulation.
//!
//! For each fixed drop step the engine estimates how much faster the car
//! sells and whether the holding cost saved pays for the drop:
//!
//!   dev(p)        = (p − market) / market × 100
//!   lead increase = max(0, (dev(current) − dev(current − drop)) × elasticity)
//!   days saved    = lead increase / calibration_lead_pct × calibration_days
//!   daily burn    = holding/day + acquisition × coc% / 100 / 365
//!   net impact    = days saved × daily burn − drop
//!
//! The elasticity (1.5×) and the calibration point (15% more leads ≈ 5 days
//! faster) are business-policy heuristics, not fitted values.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::types::{CarEconomicProfile, DealerCostProfile, PricingSimulationResult};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Rupee drop amounts, evaluated in order.
    pub drop_steps: Vec<f64>,
    /// Lead increase (%) per percentage point of deviation removed.
    pub elasticity_multiplier: f64,
    /// Lead increase (%) that corresponds to `calibration_days_saved`.
    pub calibration_lead_increase_pct: f64,
    pub calibration_days_saved: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            drop_steps: vec![5_000.0, 10_000.0, 20_000.0, 50_000.0],
            elasticity_multiplier: 1.5,
            calibration_lead_increase_pct: 15.0,
            calibration_days_saved: 5.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct PricingEngine {
    config: PricingConfig,
}

impl PricingEngine {
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Simulate every drop step that fits inside the expected margin.
    ///
    /// Results come back in step order; callers pick the one they want.
    pub fn simulate_price_drops(
        &self,
        profile: &CarEconomicProfile,
        dealer_cost: &DealerCostProfile,
        current_price: f64,
        avg_market_price: f64,
    ) -> Vec<PricingSimulationResult> {
        let cfg = &self.config;

        if avg_market_price <= 0.0 {
            warn!(
                car_id = %profile.car_id,
                avg_market_price,
                "Non-positive market price; deviation treated as zero"
            );
        }

        let current_deviation = deviation_percent(current_price, avg_market_price);
        let daily_burn =
            profile.daily_holding_cost + dealer_cost.daily_capital_cost(profile.acquisition_cost);

        let mut results = Vec::with_capacity(cfg.drop_steps.len());
        for &drop in &cfg.drop_steps {
            if drop > profile.expected_margin {
                debug!(
                    car_id = %profile.car_id,
                    drop,
                    margin = profile.expected_margin,
                    "Drop exceeds margin, skipped"
                );
                continue;
            }

            let proposed_deviation = deviation_percent(current_price - drop, avg_market_price);
            let lead_increase =
                ((current_deviation - proposed_deviation) * cfg.elasticity_multiplier).max(0.0);

            let days_saved = if cfg.calibration_lead_increase_pct > 0.0 {
                lead_increase / cfg.calibration_lead_increase_pct * cfg.calibration_days_saved
            } else {
                0.0
            };

            let holding_cost_saved = days_saved * daily_burn;
            let net_profit_impact = holding_cost_saved - drop;

            debug!(
                car_id = %profile.car_id,
                drop,
                lead_increase = format!("{lead_increase:.2}%"),
                days_saved = format!("{days_saved:.2}"),
                net = format!("₹{net_profit_impact:.0}"),
                "Price drop simulated"
            );

            results.push(PricingSimulationResult {
                price_drop: drop,
                new_margin: profile.expected_margin - drop,
                predicted_lead_increase: lead_increase,
                predicted_days_saved: days_saved,
                net_profit_impact,
            });
        }

        results
    }

    /// The simulation with the highest net profit impact (earliest step wins ties).
    pub fn best_simulation(results: &[PricingSimulationResult]) -> Option<&PricingSimulationResult> {
        results.iter().fold(None, |best, sim| match best {
            Some(b) if b.net_profit_impact >= sim.net_profit_impact => Some(b),
            _ => Some(sim),
        })
    }
}

/// Percent deviation of `price` from the market average; zero when the
/// market average is not positive.
fn deviation_percent(price: f64, avg_market_price: f64) -> f64 {
    if avg_market_price <= 0.0 {
        return 0.0;
    }
    (price - avg_market_price) / avg_market_price * 100.0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
