//! Decision engine: turns the leaf engines' outputs into one action per car.
//!
//! Rules are held in an ordered table and evaluated top to bottom; the first
//! rule whose predicate matches and whose builder produces a verdict wins.
//!
//! | # | Rule           | Predicate                                  | Verdict         |
//! |---|----------------|--------------------------------------------|-----------------|
//! | 1 | Hold           | Healthy and true ROI > 0                   | no action       |
//! | 2 | Liquidate      | Dead Capital or true ROI < −5%             | `liquidate`     |
//! | 3 | ReducePrice    | price deviation > 3%                       | `reduce_price`  |
//! | 4 | ImproveListing | opt-in; Slow Moving, fairly priced, few leads | `improve_photos` |
//!
//! Anything that falls through the table gets no action.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use super::capital::{CapitalEngine, CostBreakdown};
use super::inventory::{HealthBreakdown, InventoryEngine};
use super::pricing::PricingEngine;
use crate::types::{
    ActionType, CarEconomicProfile, DealerCostProfile, InventoryMetrics, InventoryStatus,
    StrategicAction,
};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionConfig {
    /// Healthy cars hold while true ROI is strictly above this.
    pub hold_min_roi: f64,
    /// True ROI strictly below this forces liquidation.
    pub liquidate_roi_floor: f64,
    pub liquidate_urgency: f64,
    /// Impact score per point of |true ROI|.
    pub liquidate_impact_per_roi_point: f64,
    /// Price deviation (%) strictly above this triggers a price review.
    pub reduce_price_deviation_threshold: f64,
    /// Base urgency when the best drop pays for itself.
    pub profitable_drop_base_urgency: f64,
    /// Base urgency when no drop pays for itself.
    pub necessary_drop_base_urgency: f64,
    pub necessary_drop_impact_score: f64,
    /// Urgency grows by days_on_market / this.
    pub urgency_days_divisor: f64,
    pub max_urgency: f64,
    pub listing_rule_enabled: bool,
    /// Leads/day below which a fairly priced, slow car needs a better listing.
    pub listing_lead_velocity_floor: f64,
    pub listing_base_urgency: f64,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            hold_min_roi: 0.0,
            liquidate_roi_floor: -5.0,
            liquidate_urgency: 95.0,
            liquidate_impact_per_roi_point: 10.0,
            reduce_price_deviation_threshold: 3.0,
            profitable_drop_base_urgency: 75.0,
            necessary_drop_base_urgency: 60.0,
            necessary_drop_impact_score: 50.0,
            urgency_days_divisor: 2.0,
            max_urgency: 100.0,
            listing_rule_enabled: false,
            listing_lead_velocity_floor: 0.3,
            listing_base_urgency: 40.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Rule table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Hold,
    Liquidate,
    ReducePrice,
    ImproveListing,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleKind::Hold => write!(f, "hold"),
            RuleKind::Liquidate => write!(f, "liquidate"),
            RuleKind::ReducePrice => write!(f, "reduce_price"),
            RuleKind::ImproveListing => write!(f, "improve_listing"),
        }
    }
}

/// Everything the rules need about one vehicle, computed once.
#[derive(Debug, Clone)]
pub struct DecisionContext<'a> {
    pub profile: &'a CarEconomicProfile,
    pub dealer_cost: &'a DealerCostProfile,
    pub metrics: &'a InventoryMetrics,
    pub current_price: f64,
    pub avg_market_price: f64,
    pub health: HealthBreakdown,
    pub costs: CostBreakdown,
}

impl DecisionContext<'_> {
    pub fn true_roi(&self) -> f64 {
        self.costs.true_roi
    }

    pub fn status(&self) -> InventoryStatus {
        self.health.status
    }
}

/// What a rule's builder decided.
enum Verdict {
    /// Stop evaluating; the car needs nothing.
    Hold,
    Act(StrategicAction),
    /// Predicate matched but there is nothing to recommend; try the next rule.
    Decline,
}

type Predicate = fn(&DecisionEngine, &DecisionContext<'_>) -> bool;
type Builder = fn(&DecisionEngine, &DecisionContext<'_>) -> Verdict;

struct Rule {
    kind: RuleKind,
    applies: Predicate,
    build: Builder,
}

const RULES: &[Rule] = &[
    Rule {
        kind: RuleKind::Hold,
        applies: DecisionEngine::should_hold,
        build: DecisionEngine::build_hold,
    },
    Rule {
        kind: RuleKind::Liquidate,
        applies: DecisionEngine::should_liquidate,
        build: DecisionEngine::build_liquidation,
    },
    Rule {
        kind: RuleKind::ReducePrice,
        applies: DecisionEngine::is_overpriced,
        build: DecisionEngine::build_price_reduction,
    },
    Rule {
        kind: RuleKind::ImproveListing,
        applies: DecisionEngine::needs_better_listing,
        build: DecisionEngine::build_listing_improvement,
    },
];

// ---------------------------------------------------------------------------
// Decision record
// ---------------------------------------------------------------------------

/// Outcome of running the rule table for one vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Decision {
    /// Healthy and profitable; leave it alone.
    Hold,
    Act { rule: RuleKind, action: StrategicAction },
    /// No rule produced a recommendation.
    NoAction,
}

impl Decision {
    pub fn action(&self) -> Option<&StrategicAction> {
        match self {
            Decision::Act { action, .. } => Some(action),
            _ => None,
        }
    }

    pub fn into_action(self) -> Option<StrategicAction> {
        match self {
            Decision::Act { action, .. } => Some(action),
            _ => None,
        }
    }
}

/// Full evaluation of one vehicle, kept for transparency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub car_id: String,
    pub health: HealthBreakdown,
    pub costs: CostBreakdown,
    pub decision: Decision,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Orchestrates inventory scoring → capital ROI → price simulation → rules.
///
/// Holds only configuration, so one instance can be shared across threads
/// and reused for every vehicle of every cycle.
#[derive(Debug, Clone, Default)]
pub struct DecisionEngine {
    inventory: InventoryEngine,
    capital: CapitalEngine,
    pricing: PricingEngine,
    config: DecisionConfig,
}

impl DecisionEngine {
    pub fn new(
        inventory: InventoryEngine,
        capital: CapitalEngine,
        pricing: PricingEngine,
        config: DecisionConfig,
    ) -> Self {
        Self {
            inventory,
            capital,
            pricing,
            config,
        }
    }

    pub fn config(&self) -> &DecisionConfig {
        &self.config
    }

    pub fn inventory(&self) -> &InventoryEngine {
        &self.inventory
    }

    pub fn capital(&self) -> &CapitalEngine {
        &self.capital
    }

    pub fn pricing(&self) -> &PricingEngine {
        &self.pricing
    }

    /// Rule kinds in evaluation order.
    pub fn rule_order() -> Vec<RuleKind> {
        RULES.iter().map(|r| r.kind).collect()
    }

    /// Score the vehicle with the leaf engines.
    pub fn context<'a>(
        &self,
        profile: &'a CarEconomicProfile,
        dealer_cost: &'a DealerCostProfile,
        metrics: &'a InventoryMetrics,
        current_price: f64,
        avg_market_price: f64,
    ) -> DecisionContext<'a> {
        DecisionContext {
            profile,
            dealer_cost,
            metrics,
            current_price,
            avg_market_price,
            health: self.inventory.evaluate(metrics, profile),
            costs: self
                .capital
                .cost_breakdown(profile, dealer_cost, metrics.days_on_market),
        }
    }

    /// Every rule whose predicate holds for `ctx`, in table order.
    pub fn matching_rules(&self, ctx: &DecisionContext<'_>) -> Vec<RuleKind> {
        RULES
            .iter()
            .filter(|r| (r.applies)(self, ctx))
            .map(|r| r.kind)
            .collect()
    }

    /// Run the rule table over a prepared context.
    pub fn decide(&self, ctx: &DecisionContext<'_>) -> Decision {
        for rule in RULES {
            if !(rule.applies)(self, ctx) {
                continue;
            }
            match (rule.build)(self, ctx) {
                Verdict::Hold => {
                    debug!(car_id = %ctx.profile.car_id, rule = %rule.kind, "Holding");
                    return Decision::Hold;
                }
                Verdict::Act(action) => {
                    debug!(
                        car_id = %ctx.profile.car_id,
                        rule = %rule.kind,
                        urgency = action.urgency,
                        impact = action.impact_score,
                        "Rule fired"
                    );
                    return Decision::Act {
                        rule: rule.kind,
                        action,
                    };
                }
                Verdict::Decline => {
                    debug!(car_id = %ctx.profile.car_id, rule = %rule.kind, "Rule matched but declined");
                }
            }
        }
        Decision::NoAction
    }

    /// Evaluate one vehicle and keep the intermediate scores.
    pub fn evaluate(
        &self,
        profile: &CarEconomicProfile,
        dealer_cost: &DealerCostProfile,
        metrics: &InventoryMetrics,
        current_price: f64,
        avg_market_price: f64,
    ) -> Evaluation {
        let ctx = self.context(profile, dealer_cost, metrics, current_price, avg_market_price);
        let decision = self.decide(&ctx);
        Evaluation {
            car_id: profile.car_id.clone(),
            health: ctx.health,
            costs: ctx.costs,
            decision,
        }
    }

    /// The single recommended action for a vehicle, or `None` if it needs none.
    pub fn generate_action_queue(
        &self,
        profile: &CarEconomicProfile,
        dealer_cost: &DealerCostProfile,
        metrics: &InventoryMetrics,
        current_price: f64,
        avg_market_price: f64,
    ) -> Option<StrategicAction> {
        self.evaluate(profile, dealer_cost, metrics, current_price, avg_market_price)
            .decision
            .into_action()
    }

    // -- predicates ----------------------------------------------------------

    fn should_hold(&self, ctx: &DecisionContext<'_>) -> bool {
        ctx.status() == InventoryStatus::Healthy && ctx.true_roi() > self.config.hold_min_roi
    }

    fn should_liquidate(&self, ctx: &DecisionContext<'_>) -> bool {
        ctx.status() == InventoryStatus::DeadCapital || ctx.true_roi() < self.config.liquidate_roi_floor
    }

    fn is_overpriced(&self, ctx: &DecisionContext<'_>) -> bool {
        ctx.metrics.price_deviation_percent > self.config.reduce_price_deviation_threshold
    }

    fn needs_better_listing(&self, ctx: &DecisionContext<'_>) -> bool {
        self.config.listing_rule_enabled
            && ctx.status() == InventoryStatus::SlowMoving
            && ctx.metrics.price_deviation_percent <= self.config.reduce_price_deviation_threshold
            && ctx.metrics.lead_velocity < self.config.listing_lead_velocity_floor
    }

    // -- builders ------------------------------------------------------------

    fn urgency(&self, base: f64, days_on_market: u32) -> f64 {
        let ramp = if self.config.urgency_days_divisor > 0.0 {
            days_on_market as f64 / self.config.urgency_days_divisor
        } else {
            0.0
        };
        (base + ramp).min(self.config.max_urgency)
    }

    fn build_hold(&self, _ctx: &DecisionContext<'_>) -> Verdict {
        Verdict::Hold
    }

    fn build_liquidation(&self, ctx: &DecisionContext<'_>) -> Verdict {
        let roi = ctx.true_roi();
        Verdict::Act(StrategicAction {
            car_id: ctx.profile.car_id.clone(),
            action_type: ActionType::Liquidate,
            urgency: self.config.liquidate_urgency,
            impact_score: roi.abs() * self.config.liquidate_impact_per_roi_point,
            expected_profit_gain: 0.0,
            recommendation_text: format!(
                "Liquidate now. After {} days, holding and capital costs have eroded the margin to a true ROI of {:.1}% ({}). Selling stops further losses.",
                ctx.metrics.days_on_market,
                roi,
                ctx.status(),
            ),
        })
    }

    fn build_price_reduction(&self, ctx: &DecisionContext<'_>) -> Verdict {
        let sims = self.pricing.simulate_price_drops(
            ctx.profile,
            ctx.dealer_cost,
            ctx.current_price,
            ctx.avg_market_price,
        );
        let Some(best) = PricingEngine::best_simulation(&sims) else {
            return Verdict::Decline;
        };

        let days = ctx.metrics.days_on_market;
        let action = if best.net_profit_impact > 0.0 {
            StrategicAction {
                car_id: ctx.profile.car_id.clone(),
                action_type: ActionType::ReducePrice,
                urgency: self.urgency(self.config.profitable_drop_base_urgency, days),
                impact_score: best.net_profit_impact,
                expected_profit_gain: best.net_profit_impact,
                recommendation_text: format!(
                    "Reduce price by ₹{:.0}. Listing is {:.1}% above market; expect ~{:.1}% more leads and a sale {:.1} days sooner, a net gain of ₹{:.0}.",
                    best.price_drop,
                    ctx.metrics.price_deviation_percent,
                    best.predicted_lead_increase,
                    best.predicted_days_saved,
                    best.net_profit_impact,
                ),
            }
        } else {
            StrategicAction {
                car_id: ctx.profile.car_id.clone(),
                action_type: ActionType::ReducePrice,
                urgency: self.urgency(self.config.necessary_drop_base_urgency, days),
                impact_score: self.config.necessary_drop_impact_score,
                expected_profit_gain: best.new_margin,
                recommendation_text: format!(
                    "Reduce price by ₹{:.0}. Listing is {:.1}% above market; the drop is necessary to accelerate sale and keeps ₹{:.0} of margin.",
                    best.price_drop,
                    ctx.metrics.price_deviation_percent,
                    best.new_margin,
                ),
            }
        };
        Verdict::Act(action)
    }

    fn build_listing_improvement(&self, ctx: &DecisionContext<'_>) -> Verdict {
        Verdict::Act(StrategicAction {
            car_id: ctx.profile.car_id.clone(),
            action_type: ActionType::ImprovePhotos,
            urgency: self.urgency(self.config.listing_base_urgency, ctx.metrics.days_on_market),
            impact_score: 100.0 - ctx.health.health_score as f64,
            expected_profit_gain: 0.0,
            recommendation_text: format!(
                "Improve photos and description. Price is in line with market but the listing draws only {:.2} leads/day.",
                ctx.metrics.lead_velocity,
            ),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
