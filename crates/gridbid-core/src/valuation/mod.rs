// Valuation engine: projections -> replacement levels -> VBD -> auction dollars,
// plus external market/advanced-stat merging and pool summaries.

pub mod invariants;
pub mod model;
pub mod normalize;
pub mod service;

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::draft::Position;

pub use model::{ModelOutput, ValuationFlag, ValuationModel, ValuationSettings};
pub use service::{
    AdvancedStatsRow, MarketRow, ReviewItem, Summary, ValuationReport, ValuationService,
};

// ---------------------------------------------------------------------------
// Tier
// ---------------------------------------------------------------------------

/// Quality bucket derived from a player's rank within their position.
///
/// Only the string labels are accepted on the wire; numeric tiers are
/// rejected by deserialization. Use [`Tier::level`] when a number is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Elite,
    Tier1,
    Tier2,
    Tier3,
    Replacement,
}

impl Tier {
    /// Map a 1-based position rank to a tier.
    ///
    /// Ranks past the tier2 cutoff fall to tier3 only while the player is
    /// still worth more than `value_floor` dollars.
    pub fn from_rank(position_rank: usize, value: f64, value_floor: f64) -> Self {
        match position_rank {
            0..=3 => Tier::Elite,
            4..=8 => Tier::Tier1,
            9..=20 => Tier::Tier2,
            _ if value > value_floor => Tier::Tier3,
            _ => Tier::Replacement,
        }
    }

    /// Numeric level: elite = 0 through replacement = 4. Lower is better.
    pub fn level(&self) -> u8 {
        match self {
            Tier::Elite => 0,
            Tier::Tier1 => 1,
            Tier::Tier2 => 2,
            Tier::Tier3 => 3,
            Tier::Replacement => 4,
        }
    }

    /// Elite and tier1 players.
    pub fn is_top(&self) -> bool {
        matches!(self, Tier::Elite | Tier::Tier1)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tier::Elite => "elite",
            Tier::Tier1 => "tier1",
            Tier::Tier2 => "tier2",
            Tier::Tier3 => "tier3",
            Tier::Replacement => "replacement",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Player records
// ---------------------------------------------------------------------------

/// A season point projection for one player, as handed over by ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProjection {
    pub id: String,
    pub name: String,
    pub position: Position,
    /// NFL team abbreviation.
    #[serde(default)]
    pub team: String,
    pub projected_points: f64,
    #[serde(default)]
    pub adp: Option<f64>,
    #[serde(default)]
    pub bye_week: Option<u8>,
    /// Observed average auction value, when the projection source carries one.
    #[serde(default)]
    pub market_value: Option<f64>,
}

/// A fully valued player.
///
/// Every field is populated; downstream code never needs a fallback chain.
/// `edge` is derived from the intrinsic/market pair: it is written out on
/// serialization and ignored on input.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ValuationResult {
    pub id: String,
    pub name: String,
    pub position: Position,
    #[serde(default)]
    pub team: String,
    #[serde(default)]
    pub bye_week: Option<u8>,
    pub projected_points: f64,
    #[serde(default)]
    pub adp: Option<f64>,
    /// 1-based rank by projected points within the position.
    pub position_rank: usize,
    /// Points above the position's replacement level, never negative.
    pub vbd: f64,
    pub tier: Tier,
    /// Fair auction price in whole dollars, at least $1.
    pub intrinsic_value: u32,
    /// Observed AAV, or a conservative default when none is known.
    pub market_price: u32,
    pub min_bid: u32,
    pub target_bid: u32,
    pub max_bid: u32,
    /// Confidence in the valuation, 0.5 to 1.0.
    pub confidence: f64,
    /// Advanced stats merged in from an external source, keyed by stat name.
    #[serde(default)]
    pub advanced: BTreeMap<String, f64>,
}

impl ValuationResult {
    /// Intrinsic value minus market price. Positive means the market
    /// undervalues the player.
    pub fn edge(&self) -> i64 {
        self.intrinsic_value as i64 - self.market_price as i64
    }
}

impl Serialize for ValuationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("ValuationResult", 18)?;
        s.serialize_field("id", &self.id)?;
        s.serialize_field("name", &self.name)?;
        s.serialize_field("position", &self.position)?;
        s.serialize_field("team", &self.team)?;
        s.serialize_field("bye_week", &self.bye_week)?;
        s.serialize_field("projected_points", &self.projected_points)?;
        s.serialize_field("adp", &self.adp)?;
        s.serialize_field("position_rank", &self.position_rank)?;
        s.serialize_field("vbd", &self.vbd)?;
        s.serialize_field("tier", &self.tier)?;
        s.serialize_field("intrinsic_value", &self.intrinsic_value)?;
        s.serialize_field("market_price", &self.market_price)?;
        s.serialize_field("edge", &self.edge())?;
        s.serialize_field("min_bid", &self.min_bid)?;
        s.serialize_field("target_bid", &self.target_bid)?;
        s.serialize_field("max_bid", &self.max_bid)?;
        s.serialize_field("confidence", &self.confidence)?;
        s.serialize_field("advanced", &self.advanced)?;
        s.end()
    }
}
