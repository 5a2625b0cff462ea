// The four advisor sub-scores. Each is a pure function returning 0-100.

use super::tuning::{
    BudgetScoreTuning, NeedScoreTuning, ScarcityTuning, ValueScoreTuning,
};
use crate::draft::{PositionLimits, RosterRequirements, Team};
use crate::valuation::model::round_dollars;
use crate::valuation::{Tier, ValuationResult};

/// Score given whenever an input is missing or unusable.
pub const NEUTRAL_SCORE: f64 = 50.0;

fn clamp_score(score: f64) -> f64 {
    if score.is_finite() {
        score.clamp(0.0, 100.0)
    } else {
        NEUTRAL_SCORE
    }
}

/// The bid to score against: the current bid, or an assumed opening bid
/// (a fraction of market price, at least $1) when nothing is on the table.
/// The flag is true when the bid was synthesized.
pub fn effective_bid(current_bid: u32, market_price: u32, t: &ValueScoreTuning) -> (u32, bool) {
    if current_bid > 0 {
        (current_bid, false)
    } else {
        let opening = round_dollars(market_price as f64 * t.opening_bid_fraction).max(1);
        (opening, true)
    }
}

// ---------------------------------------------------------------------------
// Value
// ---------------------------------------------------------------------------

/// Discount of the bid against intrinsic value, centred on 50: no discount
/// scores 50, a discount of `full_swing` scores 100, an equal overpay 0.
pub fn value_score(intrinsic_value: u32, bid: u32, t: &ValueScoreTuning) -> f64 {
    if intrinsic_value == 0 || t.full_swing <= 0.0 {
        return NEUTRAL_SCORE;
    }
    let intrinsic = intrinsic_value as f64;
    let discount = (intrinsic - bid as f64) / intrinsic;
    clamp_score(50.0 + discount / t.full_swing * 50.0)
}

// ---------------------------------------------------------------------------
// Need
// ---------------------------------------------------------------------------

/// How badly the roster needs another player at this position.
///
/// `limits` is `None` when the league defines no requirement for the position
/// (or the position is unknown); the score is then neutral.
pub fn need_score(
    count: usize,
    limits: Option<PositionLimits>,
    flex_eligible: bool,
    tier: Tier,
    t: &NeedScoreTuning,
) -> f64 {
    let Some(l) = limits else {
        return t.undefined;
    };

    let mut score = if count < l.min {
        t.below_min
    } else if count < l.optimal {
        let frac = (count - l.min) as f64 / (l.optimal - l.min) as f64;
        t.min_start - (t.min_start - t.optimal_start) * frac
    } else if count < l.max {
        let frac = (count - l.optimal) as f64 / (l.max - l.optimal) as f64;
        t.optimal_start - (t.optimal_start - t.at_max) * frac
    } else {
        t.at_max
    };

    if flex_eligible && count >= l.optimal && count < l.max {
        score = score.max(t.flex_floor);
    }

    score += match tier {
        Tier::Elite | Tier::Tier1 => t.top_tier_bonus,
        Tier::Tier2 => t.tier2_bonus,
        _ => 0.0,
    };

    clamp_score(score)
}

// ---------------------------------------------------------------------------
// Scarcity
// ---------------------------------------------------------------------------

/// How hard this kind of player will be to find later.
///
/// Blends same-tier scarcity at the position (other players of the candidate's
/// tier still available) with the ratio of remaining above-replacement supply
/// to league-wide unmet minimums.
pub fn scarcity_score(
    player: &ValuationResult,
    available: &[ValuationResult],
    teams: &[&Team],
    requirements: &RosterRequirements,
    t: &ScarcityTuning,
) -> f64 {
    let position = player.position;
    if !position.is_known() {
        return NEUTRAL_SCORE;
    }

    let same_tier = available
        .iter()
        .filter(|p| p.position == position && p.tier == player.tier && p.id != player.id)
        .count();
    let tier_component = if same_tier <= 1 {
        100.0
    } else {
        (100.0 - (same_tier - 1) as f64 * t.per_player_step).max(0.0)
    };

    let ratio_component = match requirements.limits(position) {
        None => NEUTRAL_SCORE,
        Some(limits) => {
            let supply = available
                .iter()
                .filter(|p| p.position == position && p.vbd > 0.0)
                .count();
            let need: usize = teams
                .iter()
                .map(|team| limits.min.saturating_sub(team.position_count(position)))
                .sum();
            supply_ratio_component(supply, need, t)
        }
    };

    let weight = if player.tier.is_top() {
        t.top_tier_weight
    } else {
        t.other_tier_weight
    };
    clamp_score(weight * tier_component + (1.0 - weight) * ratio_component)
}

fn supply_ratio_component(supply: usize, need: usize, t: &ScarcityTuning) -> f64 {
    if need == 0 {
        return 0.0;
    }
    let ratio = supply as f64 / need as f64;
    if ratio <= t.ratio_full {
        100.0
    } else if ratio >= t.ratio_zero {
        0.0
    } else {
        100.0 * (t.ratio_zero - ratio) / (t.ratio_zero - t.ratio_full)
    }
}

// ---------------------------------------------------------------------------
// Budget
// ---------------------------------------------------------------------------

/// How comfortably the bid fits the remaining budget.
///
/// Zero when the bid is unaffordable or the roster is full; otherwise
/// bucketed by the bid relative to average dollars per open slot.
pub fn budget_score(
    bid: u32,
    affordable: u32,
    remaining_slots: usize,
    dollars_per_slot: f64,
    tier: Tier,
    t: &BudgetScoreTuning,
) -> f64 {
    if remaining_slots == 0 || bid > affordable {
        return 0.0;
    }
    let ratio = if dollars_per_slot > 0.0 {
        bid as f64 / dollars_per_slot
    } else {
        f64::INFINITY
    };
    let base = t
        .buckets
        .iter()
        .find(|b| ratio <= b.max_ratio)
        .map(|b| b.score)
        .unwrap_or(t.overflow_score);
    let bonus = if tier == Tier::Elite { t.elite_bonus } else { 0.0 };
    clamp_score(base + bonus)
}
