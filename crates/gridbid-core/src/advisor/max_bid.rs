// Maximum bid: an ordered chain of multiplicative adjustments on intrinsic
// value, then capped by affordability and a global per-position ceiling.

use serde::{Deserialize, Serialize};

use super::recommendation::DraftStage;
use super::tuning::{MaxBidTuning, PositionalCapTuning};
use crate::draft::Position;
use crate::valuation::Tier;

/// Everything the chain consumes. Built by the advisor from a draft
/// snapshot; exposed so individual adjustments can be examined in isolation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaxBidInputs {
    pub intrinsic_value: u32,
    pub tier: Tier,
    pub inflation_pct: f64,
    pub need_score: f64,
    pub scarcity_score: f64,
    pub stack_synergy_pct: f64,
    pub position_run: bool,
    pub panic_level: f64,
    pub stage: DraftStage,
    /// Most the team can bid while keeping $1 for every other open slot.
    pub affordable: u32,
    /// Global ceiling for the position, if it has one.
    pub positional_cap: Option<f64>,
}

/// Value after every multiplier, before any cap.
pub fn adjusted_value(inputs: &MaxBidInputs, t: &MaxBidTuning) -> f64 {
    let mut value = inputs.intrinsic_value as f64;

    value *= 1.0 + inputs.inflation_pct / 100.0;
    value *= 1.0 + inputs.need_score / 100.0 * t.need_weight;
    value *= 1.0 + inputs.scarcity_score / 100.0 * t.scarcity_weight;
    value *= 1.0 + inputs.stack_synergy_pct.clamp(0.0, t.max_stack_bonus_pct) / 100.0;

    if run_applies(inputs, t) {
        value *= t.position_run_multiplier;
    }
    if inputs.panic_level > t.panic_threshold {
        value *= 1.0 + inputs.panic_level * t.panic_weight;
    }
    if inputs.stage == DraftStage::Late && inputs.tier.level() <= t.late_stage_max_tier_level {
        value *= t.late_stage_multiplier;
    }

    value
}

/// A position run only counts when the roster really needs the position.
fn run_applies(inputs: &MaxBidInputs, t: &MaxBidTuning) -> bool {
    inputs.position_run && inputs.need_score > t.position_run_need_threshold
}

/// The positional ceiling actually in force. A run the team needs to keep
/// up with lifts the ceiling by the run multiplier.
pub fn effective_positional_cap(inputs: &MaxBidInputs, t: &MaxBidTuning) -> Option<f64> {
    inputs.positional_cap.map(|cap| {
        if run_applies(inputs, t) {
            cap * t.position_run_multiplier
        } else {
            cap
        }
    })
}

/// The hard maximum bid, in whole dollars. Never above `affordable` or the
/// effective positional cap, never negative.
pub fn compute_max_bid(inputs: &MaxBidInputs, t: &MaxBidTuning) -> u32 {
    let adjusted = adjusted_value(inputs, t);
    let mut ceiling = inputs.affordable as f64;
    if let Some(cap) = effective_positional_cap(inputs, t) {
        ceiling = ceiling.min(cap);
    }
    let bid = adjusted.min(ceiling);
    if bid.is_finite() && bid > 0.0 {
        // The ceiling is at most `affordable`, so this fits in u32.
        bid.floor() as u32
    } else {
        0
    }
}

/// Global dollar ceiling for a position.
///
/// Tightens as the roster's open slots run low, and again while the league
/// has made only a handful of picks. Positions without a configured base cap
/// (including unknown ones) have no ceiling.
pub fn positional_cap(
    position: Position,
    remaining_slots: usize,
    picks_made: usize,
    t: &PositionalCapTuning,
) -> Option<f64> {
    let base = *t.base.get(&position)?;
    let slot_factor = if remaining_slots <= t.few_slots {
        t.few_slots_factor
    } else if remaining_slots <= t.some_slots {
        t.some_slots_factor
    } else {
        1.0
    };
    let early_factor = if picks_made < t.early_picks {
        t.early_factor
    } else {
        1.0
    };
    Some(base * slot_factor * early_factor)
}
