// Bid recommendation output types.

use serde::{Deserialize, Serialize};

use super::tuning::CompositeWeights;
use crate::valuation::{Tier, ValuationResult};

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// What to do about the player on the block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    StrongBuy,
    Consider,
    Avoid,
    Pass,
}

impl Action {
    pub fn label(&self) -> &'static str {
        match self {
            Action::StrongBuy => "strong-buy",
            Action::Consider => "consider",
            Action::Avoid => "avoid",
            Action::Pass => "pass",
        }
    }
}

// ---------------------------------------------------------------------------
// Scores
// ---------------------------------------------------------------------------

/// The four 0-100 sub-scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubScores {
    pub value: f64,
    pub need: f64,
    pub scarcity: f64,
    pub budget: f64,
}

impl SubScores {
    pub fn composite(&self, weights: &CompositeWeights) -> f64 {
        weights.value * self.value
            + weights.need * self.need
            + weights.scarcity * self.scarcity
            + weights.budget * self.budget
    }
}

// ---------------------------------------------------------------------------
// Market and strategy context
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftStage {
    Early,
    Middle,
    Late,
}

/// An opponent who both needs the position and can afford the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    pub team_id: String,
    pub team_name: String,
    pub max_affordable_bid: u32,
    /// Players that team already rosters at the position.
    pub position_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketProjection {
    /// Observed league-wide price inflation, percent.
    pub inflation_pct: f64,
    pub predicted_final_price: u32,
    pub likely_competitors: Vec<Competitor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategySignals {
    pub draft_stage: DraftStage,
    pub position_run: bool,
    /// 0.0 (relaxed) to 1.0 (no quality left for an unmet minimum).
    pub panic_level: f64,
    /// Same-NFL-team QB/pass-catcher bonus, percent.
    pub stack_synergy_pct: f64,
    /// Bid the scores were computed against.
    pub effective_bid: u32,
    /// True when no bid was on the table and an opening bid was assumed.
    pub bid_synthesized: bool,
    /// Most this team can bid while still filling every other slot at $1.
    pub affordable_bid: u32,
    /// Global per-position ceiling, if the position has one.
    pub positional_cap: Option<u32>,
    pub remaining_slots: usize,
}

/// A comparable player who might be had instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    pub id: String,
    pub name: String,
    pub tier: Tier,
    pub intrinsic_value: u32,
    pub market_price: u32,
    pub edge: i64,
}

impl From<&ValuationResult> for Alternative {
    fn from(r: &ValuationResult) -> Self {
        Alternative {
            id: r.id.clone(),
            name: r.name.clone(),
            tier: r.tier,
            intrinsic_value: r.intrinsic_value,
            market_price: r.market_price,
            edge: r.edge(),
        }
    }
}

// ---------------------------------------------------------------------------
// Recommendation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BidRecommendation {
    pub player_id: String,
    pub player_name: String,
    pub action: Action,
    /// Hard ceiling; never above the team's affordable bid.
    pub max_bid: u32,
    pub confidence: f64,
    pub scores: SubScores,
    pub composite: f64,
    pub primary_reason: String,
    pub warnings: Vec<String>,
    pub opportunities: Vec<String>,
    pub market: MarketProjection,
    pub strategy: StrategySignals,
    pub alternatives: Vec<Alternative>,
    /// Version of the tuning table that produced this recommendation.
    pub tuning_version: u32,
}
