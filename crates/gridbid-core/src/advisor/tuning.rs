// Bid advisor tuning table.
//
// Every threshold, weight and multiplier the advisor uses lives here so the
// policy can be reviewed, versioned and overridden from strategy.toml without
// touching the scoring code.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::draft::Position;

/// Version of the compiled-in tuning table. Bump when any default changes.
pub const TUNING_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorTuning {
    pub version: u32,
    pub weights: CompositeWeights,
    pub value: ValueScoreTuning,
    pub need: NeedScoreTuning,
    pub scarcity: ScarcityTuning,
    pub budget: BudgetScoreTuning,
    pub max_bid: MaxBidTuning,
    pub caps: PositionalCapTuning,
    pub actions: ActionThresholds,
    pub signals: SignalTuning,
}

impl Default for AdvisorTuning {
    fn default() -> Self {
        AdvisorTuning {
            version: TUNING_VERSION,
            weights: CompositeWeights::default(),
            value: ValueScoreTuning::default(),
            need: NeedScoreTuning::default(),
            scarcity: ScarcityTuning::default(),
            budget: BudgetScoreTuning::default(),
            max_bid: MaxBidTuning::default(),
            caps: PositionalCapTuning::default(),
            actions: ActionThresholds::default(),
            signals: SignalTuning::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Weights of the four sub-scores in the composite. Must sum to 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositeWeights {
    pub value: f64,
    pub need: f64,
    pub scarcity: f64,
    pub budget: f64,
}

impl Default for CompositeWeights {
    fn default() -> Self {
        CompositeWeights {
            value: 0.35,
            need: 0.30,
            scarcity: 0.20,
            budget: 0.15,
        }
    }
}

impl CompositeWeights {
    pub fn total(&self) -> f64 {
        self.value + self.need + self.scarcity + self.budget
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueScoreTuning {
    /// Discount (as a fraction of intrinsic value) that moves the score from
    /// 50 to 100, or overpay that moves it to 0.
    pub full_swing: f64,
    /// Opening bid assumed when no bid is on the table, as a fraction of
    /// market price.
    pub opening_bid_fraction: f64,
}

impl Default for ValueScoreTuning {
    fn default() -> Self {
        ValueScoreTuning {
            full_swing: 0.30,
            opening_bid_fraction: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeedScoreTuning {
    pub below_min: f64,
    /// Score right at the minimum; decreases linearly toward `optimal_start`.
    pub min_start: f64,
    /// Score right at the optimal count; decreases linearly toward `at_max`.
    pub optimal_start: f64,
    pub at_max: f64,
    pub top_tier_bonus: f64,
    pub tier2_bonus: f64,
    pub flex_floor: f64,
    /// Used when the league defines no requirement for the position.
    pub undefined: f64,
}

impl Default for NeedScoreTuning {
    fn default() -> Self {
        NeedScoreTuning {
            below_min: 100.0,
            min_start: 75.0,
            optimal_start: 40.0,
            at_max: 10.0,
            top_tier_bonus: 20.0,
            tier2_bonus: 10.0,
            flex_floor: 40.0,
            undefined: 50.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScarcityTuning {
    /// Weight of same-tier scarcity for elite and tier1 players.
    pub top_tier_weight: f64,
    /// Weight of same-tier scarcity for everyone else.
    pub other_tier_weight: f64,
    /// Points lost per additional same-tier player remaining beyond the first.
    pub per_player_step: f64,
    /// Supply/need ratio at or below which the ratio component is 100.
    pub ratio_full: f64,
    /// Supply/need ratio at or above which the ratio component is 0.
    pub ratio_zero: f64,
}

impl Default for ScarcityTuning {
    fn default() -> Self {
        ScarcityTuning {
            top_tier_weight: 0.7,
            other_tier_weight: 0.4,
            per_player_step: 12.0,
            ratio_full: 1.0,
            ratio_zero: 5.0,
        }
    }
}

/// One budget-score bucket: bids up to `max_ratio` times the average dollars
/// per open slot earn `score`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetBucket {
    pub max_ratio: f64,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetScoreTuning {
    /// Ascending by `max_ratio`.
    pub buckets: Vec<BudgetBucket>,
    /// Score for ratios above the last bucket.
    pub overflow_score: f64,
    pub elite_bonus: f64,
}

impl Default for BudgetScoreTuning {
    fn default() -> Self {
        BudgetScoreTuning {
            buckets: vec![
                BudgetBucket { max_ratio: 0.5, score: 100.0 },
                BudgetBucket { max_ratio: 1.0, score: 75.0 },
                BudgetBucket { max_ratio: 1.5, score: 50.0 },
                BudgetBucket { max_ratio: 2.5, score: 25.0 },
            ],
            overflow_score: 10.0,
            elite_bonus: 15.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaxBidTuning {
    /// Multiplier per unit of need score: `1 + need/100 * need_weight`.
    pub need_weight: f64,
    pub scarcity_weight: f64,
    pub qb_pass_catcher_stack_pct: f64,
    pub max_stack_bonus_pct: f64,
    pub position_run_multiplier: f64,
    /// Need score above which a position run lifts the ceiling.
    pub position_run_need_threshold: f64,
    pub panic_threshold: f64,
    pub panic_weight: f64,
    pub late_stage_multiplier: f64,
    /// Tier levels up to and including this get the late-draft lift.
    pub late_stage_max_tier_level: u8,
    /// Observed inflation is clamped to +/- this many percent.
    pub inflation_band_pct: f64,
}

impl Default for MaxBidTuning {
    fn default() -> Self {
        MaxBidTuning {
            need_weight: 0.2,
            scarcity_weight: 0.15,
            qb_pass_catcher_stack_pct: 5.0,
            max_stack_bonus_pct: 10.0,
            position_run_multiplier: 1.15,
            position_run_need_threshold: 70.0,
            panic_threshold: 0.5,
            panic_weight: 0.2,
            late_stage_multiplier: 1.1,
            late_stage_max_tier_level: 2,
            inflation_band_pct: 25.0,
        }
    }
}

/// Global per-position dollar ceilings, independent of the player's value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionalCapTuning {
    pub base: BTreeMap<Position, f64>,
    /// At or below this many open roster slots, `few_slots_factor` applies.
    pub few_slots: usize,
    pub few_slots_factor: f64,
    /// At or below this many open slots (and above `few_slots`),
    /// `some_slots_factor` applies.
    pub some_slots: usize,
    pub some_slots_factor: f64,
    /// Until this many picks are in the books, `early_factor` applies too.
    pub early_picks: usize,
    pub early_factor: f64,
}

impl Default for PositionalCapTuning {
    fn default() -> Self {
        let mut base = BTreeMap::new();
        base.insert(Position::Quarterback, 45.0);
        base.insert(Position::RunningBack, 70.0);
        base.insert(Position::WideReceiver, 65.0);
        base.insert(Position::TightEnd, 40.0);
        base.insert(Position::Defense, 5.0);
        base.insert(Position::Kicker, 3.0);
        PositionalCapTuning {
            base,
            few_slots: 3,
            few_slots_factor: 0.6,
            some_slots: 6,
            some_slots_factor: 0.85,
            early_picks: 8,
            early_factor: 0.85,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionThresholds {
    pub strong_buy_composite: f64,
    pub strong_buy_value: f64,
    pub strong_buy_need: f64,
    pub consider_composite: f64,
    pub consider_value: f64,
    pub consider_budget: f64,
    pub avoid_composite: f64,
    /// With other positions unfilled, a candidate is avoided when the budget
    /// score is below this ...
    pub unfilled_budget_below: f64,
    /// ... and the need score is below this.
    pub unfilled_need_below: f64,
    /// A maxed-out position still accepts players up to this tier level.
    pub maxed_roster_tier_level: u8,
}

impl Default for ActionThresholds {
    fn default() -> Self {
        ActionThresholds {
            strong_buy_composite: 75.0,
            strong_buy_value: 75.0,
            strong_buy_need: 90.0,
            consider_composite: 55.0,
            consider_value: 75.0,
            consider_budget: 60.0,
            avoid_composite: 35.0,
            unfilled_budget_below: 50.0,
            unfilled_need_below: 70.0,
            maxed_roster_tier_level: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalTuning {
    pub run_window: usize,
    pub run_threshold: usize,
    pub early_stage_fraction: f64,
    pub middle_stage_fraction: f64,
    /// A competitor must be able to afford this fraction of intrinsic value.
    pub competitor_value_fraction: f64,
    pub alternative_tier_span: u8,
    pub alternative_value_span: f64,
    pub max_alternatives: usize,
    pub panic_scale: f64,
    /// Rostered players sharing a bye week before it is flagged.
    pub bye_stack_threshold: usize,
    /// Premium per interested competitor in the predicted final price.
    pub competitor_price_premium: f64,
}

impl Default for SignalTuning {
    fn default() -> Self {
        SignalTuning {
            run_window: 5,
            run_threshold: 3,
            early_stage_fraction: 0.25,
            middle_stage_fraction: 0.65,
            competitor_value_fraction: 0.5,
            alternative_tier_span: 1,
            alternative_value_span: 5.0,
            max_alternatives: 3,
            panic_scale: 1.0,
            bye_stack_threshold: 3,
            competitor_price_premium: 0.05,
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn invalid(field: &str, message: String) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_string(),
        message,
    }
}

impl AdvisorTuning {
    /// Reject tables the scoring code cannot use sensibly.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let w = &self.weights;
        for (name, val) in [
            ("advisor.weights.value", w.value),
            ("advisor.weights.need", w.need),
            ("advisor.weights.scarcity", w.scarcity),
            ("advisor.weights.budget", w.budget),
        ] {
            if !(0.0..=1.0).contains(&val) {
                return Err(invalid(name, format!("must be between 0.0 and 1.0, got {val}")));
            }
        }
        if (w.total() - 1.0).abs() > 1e-6 {
            return Err(invalid(
                "advisor.weights",
                format!("must sum to 1.0, got {}", w.total()),
            ));
        }

        if self.value.full_swing <= 0.0 {
            return Err(invalid(
                "advisor.value.full_swing",
                format!("must be > 0, got {}", self.value.full_swing),
            ));
        }

        if self.scarcity.ratio_zero <= self.scarcity.ratio_full {
            return Err(invalid(
                "advisor.scarcity.ratio_zero",
                "must be greater than ratio_full".into(),
            ));
        }

        if self
            .budget
            .buckets
            .windows(2)
            .any(|pair| pair[1].max_ratio <= pair[0].max_ratio)
        {
            return Err(invalid(
                "advisor.budget.buckets",
                "max_ratio must be strictly ascending".into(),
            ));
        }

        for (pos, &cap) in &self.caps.base {
            if !pos.is_known() {
                return Err(invalid("advisor.caps.base", "unknown position key".into()));
            }
            if cap <= 0.0 {
                return Err(invalid(
                    "advisor.caps.base",
                    format!("cap for {pos} must be > 0, got {cap}"),
                ));
            }
        }

        let s = &self.signals;
        if !(0.0 < s.early_stage_fraction
            && s.early_stage_fraction < s.middle_stage_fraction
            && s.middle_stage_fraction < 1.0)
        {
            return Err(invalid(
                "advisor.signals",
                "stage fractions must satisfy 0 < early < middle < 1".into(),
            ));
        }
        if s.run_threshold == 0 || s.run_threshold > s.run_window {
            return Err(invalid(
                "advisor.signals.run_threshold",
                format!("must be in 1..={}, got {}", s.run_window, s.run_threshold),
            ));
        }

        Ok(())
    }
}
