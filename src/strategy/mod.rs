//! Scoring and decision engines: health scoring, true ROI, price-drop
//! simulation, and the rule table that ties them together.
//!
//! Every engine is a plain value holding its configuration; all methods are
//! pure functions of their arguments.

pub mod capital;
pub mod decision;
pub mod inventory;
pub mod pricing;

pub use capital::{CapitalConfig, CapitalEngine, CostBreakdown};
pub use decision::{Decision, DecisionConfig, DecisionEngine, Evaluation, RuleKind};
pub use inventory::{HealthBreakdown, InventoryConfig, InventoryEngine};
pub use pricing::{PricingConfig, PricingEngine};

use serde::{Deserialize, Serialize};

use crate::types::ProfitIntelError;

// ---------------------------------------------------------------------------
// Engine configuration
// ---------------------------------------------------------------------------

/// Tunable constants for all four engines (`[engine.*]` in config.toml).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub inventory: InventoryConfig,
    pub capital: CapitalConfig,
    pub pricing: PricingConfig,
    pub decision: DecisionConfig,
}

impl EngineConfig {
    /// Reject configurations that would make scores meaningless.
    pub fn validate(&self) -> Result<(), ProfitIntelError> {
        let mut errors = Vec::new();

        let inv = &self.inventory;
        let weights = [
            inv.velocity_weight,
            inv.price_weight,
            inv.demand_weight,
            inv.aging_weight,
        ];
        if weights.iter().any(|w| *w < 0.0) {
            errors.push("inventory weights must be non-negative".to_string());
        }
        if (inv.weight_sum() - 1.0).abs() > 1e-6 {
            errors.push(format!(
                "inventory weights must sum to 1.0 (got {:.4})",
                inv.weight_sum()
            ));
        }
        if inv.target_lead_velocity <= 0.0 {
            errors.push("inventory.target_lead_velocity must be positive".to_string());
        }
        if !(inv.dead_capital_threshold < inv.healthy_threshold && inv.healthy_threshold <= 100) {
            errors.push(format!(
                "status thresholds must satisfy dead_capital < healthy <= 100 (got {} / {})",
                inv.dead_capital_threshold, inv.healthy_threshold
            ));
        }

        let cap = &self.capital;
        if cap.medium_risk_lock_score > cap.high_risk_lock_score {
            errors.push("capital.medium_risk_lock_score must not exceed high_risk_lock_score".to_string());
        }

        let pricing = &self.pricing;
        if pricing.drop_steps.is_empty() {
            errors.push("pricing.drop_steps must not be empty".to_string());
        }
        if pricing.drop_steps.iter().any(|d| *d <= 0.0) {
            errors.push("pricing.drop_steps must all be positive".to_string());
        }
        if pricing.elasticity_multiplier <= 0.0 {
            errors.push("pricing.elasticity_multiplier must be positive".to_string());
        }
        if pricing.calibration_lead_increase_pct <= 0.0 || pricing.calibration_days_saved <= 0.0 {
            errors.push("pricing calibration point must be positive".to_string());
        }

        let dec = &self.decision;
        if dec.urgency_days_divisor <= 0.0 {
            errors.push("decision.urgency_days_divisor must be positive".to_string());
        }
        if !(0.0..=100.0).contains(&dec.max_urgency) {
            errors.push("decision.max_urgency must be within [0, 100]".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ProfitIntelError::Config(errors.join("; ")))
        }
    }
}

impl DecisionEngine {
    /// Wire all four engines from one configuration.
    pub fn from_config(config: &EngineConfig) -> Self {
        DecisionEngine::new(
            InventoryEngine::new(config.inventory.clone()),
            CapitalEngine::new(config.capital.clone()),
            PricingEngine::new(config.pricing.clone()),
            config.decision.clone(),
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
