// Post-hoc consistency checks over a valued pool.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{Tier, ValuationResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    TierMismatch { expected: Tier, actual: Tier },
    BelowFloor { intrinsic_value: u32 },
    NegativeVbd { vbd: f64 },
    BidBandOrder { min_bid: u32, target_bid: u32, max_bid: u32 },
    ZeroMarketPrice,
    DuplicateId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvariantViolation {
    pub player_id: String,
    pub violation: Violation,
}

/// Check every result against the valuation invariants. An empty vector
/// means the pool is consistent.
pub fn check_results(results: &[ValuationResult], tier_value_floor: f64) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let mut seen = BTreeSet::new();

    for r in results {
        let mut flag = |violation| {
            violations.push(InvariantViolation {
                player_id: r.id.clone(),
                violation,
            })
        };

        if !seen.insert(r.id.as_str()) {
            flag(Violation::DuplicateId);
        }

        let expected = Tier::from_rank(r.position_rank, r.intrinsic_value as f64, tier_value_floor);
        if expected != r.tier {
            flag(Violation::TierMismatch {
                expected,
                actual: r.tier,
            });
        }
        if r.intrinsic_value < 1 {
            flag(Violation::BelowFloor {
                intrinsic_value: r.intrinsic_value,
            });
        }
        if r.vbd < 0.0 || r.vbd.is_nan() {
            flag(Violation::NegativeVbd { vbd: r.vbd });
        }
        if !(1 <= r.min_bid && r.min_bid <= r.target_bid && r.target_bid <= r.max_bid) {
            flag(Violation::BidBandOrder {
                min_bid: r.min_bid,
                target_bid: r.target_bid,
                max_bid: r.max_bid,
            });
        }
        if r.market_price == 0 {
            flag(Violation::ZeroMarketPrice);
        }
    }

    violations
}
