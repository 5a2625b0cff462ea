// Value-based drafting model.
//
// Converts per-player point projections into replacement levels, VBD,
// budget-normalized auction dollars, tiers and bid bands. Market prices never
// feed into the intrinsic value computed here.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{PlayerProjection, Tier, ValuationResult};
use crate::draft::{Position, DRAFTABLE_POSITIONS};

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Model knobs, loaded from the `[valuation]` section of strategy.toml.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValuationSettings {
    /// Startable players per fantasy team at each position (FLEX share
    /// included). Multiplied by the team count to find the replacement rank.
    pub startable_per_team: BTreeMap<Position, f64>,
    /// Past the tier2 cutoff, players worth more than this stay tier3.
    pub tier_value_floor: f64,
    /// Bid band as fractions of the target bid.
    pub bid_band_low: f64,
    pub bid_band_high: f64,
    /// Conservative market price when no AAV is known:
    /// clamp(round(intrinsic * fraction), 1, max).
    pub default_market_fraction: f64,
    pub default_market_max: u32,
}

impl Default for ValuationSettings {
    fn default() -> Self {
        let mut startable_per_team = BTreeMap::new();
        startable_per_team.insert(Position::Quarterback, 1.0);
        startable_per_team.insert(Position::RunningBack, 2.5);
        startable_per_team.insert(Position::WideReceiver, 3.0);
        startable_per_team.insert(Position::TightEnd, 1.0);
        startable_per_team.insert(Position::Defense, 1.0);
        startable_per_team.insert(Position::Kicker, 1.0);
        ValuationSettings {
            startable_per_team,
            tier_value_floor: 5.0,
            bid_band_low: 0.85,
            bid_band_high: 1.15,
            default_market_fraction: 0.5,
            default_market_max: 2,
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Non-fatal conditions met while valuing a pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValuationFlag {
    /// No players at a draftable position; its replacement level is 0.
    EmptyPosition { position: Position },
    /// Player with an unrecognized position; valued at the $1 floor.
    UnknownPosition { player_id: String, name: String },
    /// Non-finite projection treated as 0 points.
    InvalidProjection { player_id: String },
    /// No startable player beats replacement, so every value is $1.
    NoSurplusValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelOutput {
    /// In input order.
    pub results: Vec<ValuationResult>,
    pub replacement_levels: BTreeMap<Position, f64>,
    pub flags: Vec<ValuationFlag>,
    /// Dollars per point of VBD.
    pub dollars_per_vbd: f64,
}

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ValuationModel {
    pub num_teams: usize,
    pub budget_per_team: u32,
    pub settings: ValuationSettings,
}

impl ValuationModel {
    pub fn new(num_teams: usize, budget_per_team: u32, settings: ValuationSettings) -> Self {
        ValuationModel {
            num_teams,
            budget_per_team,
            settings,
        }
    }

    /// League-wide auction budget.
    pub fn total_budget(&self) -> u32 {
        self.num_teams as u32 * self.budget_per_team
    }

    /// League-wide startable players at a position, i.e. the replacement rank.
    pub fn startable_count(&self, position: Position) -> usize {
        let per_team = self
            .settings
            .startable_per_team
            .get(&position)
            .copied()
            .unwrap_or(0.0);
        (per_team.max(0.0) * self.num_teams as f64).round() as usize
    }

    /// Value a full player pool.
    ///
    /// Results come back in input order with `market_price` set to the
    /// conservative default; observed prices are applied by the service.
    pub fn evaluate(&self, projections: &[PlayerProjection]) -> ModelOutput {
        let mut flags = Vec::new();

        let points: Vec<f64> = projections
            .iter()
            .map(|p| {
                if p.projected_points.is_finite() {
                    p.projected_points
                } else {
                    warn!("non-finite projection for {} ({}), using 0", p.name, p.id);
                    flags.push(ValuationFlag::InvalidProjection {
                        player_id: p.id.clone(),
                    });
                    0.0
                }
            })
            .collect();

        // Group indices by position, best first. Ties fall back to id so the
        // ranking never depends on input order.
        let mut by_position: BTreeMap<Position, Vec<usize>> = BTreeMap::new();
        for (idx, p) in projections.iter().enumerate() {
            by_position.entry(p.position).or_default().push(idx);
        }
        for indices in by_position.values_mut() {
            indices.sort_by(|&a, &b| {
                points[b]
                    .total_cmp(&points[a])
                    .then_with(|| projections[a].id.cmp(&projections[b].id))
            });
        }

        let mut ranks = vec![0usize; projections.len()];
        for indices in by_position.values() {
            for (rank0, &idx) in indices.iter().enumerate() {
                ranks[idx] = rank0 + 1;
            }
        }

        // Replacement level per draftable position.
        let mut replacement_levels = BTreeMap::new();
        for &pos in DRAFTABLE_POSITIONS {
            let level = match by_position.get(&pos) {
                Some(indices) if !indices.is_empty() => {
                    let n = self.startable_count(pos).clamp(1, indices.len());
                    points[indices[n - 1]]
                }
                _ => {
                    warn!("no players at {pos}; replacement level defaults to 0");
                    flags.push(ValuationFlag::EmptyPosition { position: pos });
                    0.0
                }
            };
            replacement_levels.insert(pos, level);
        }

        let vbd: Vec<f64> = projections
            .iter()
            .enumerate()
            .map(|(idx, p)| match replacement_levels.get(&p.position) {
                Some(&repl) => (points[idx] - repl).max(0.0),
                None => 0.0,
            })
            .collect();

        for p in projections.iter().filter(|p| !p.position.is_known()) {
            warn!("unknown position for {} ({}), valued at floor", p.name, p.id);
            flags.push(ValuationFlag::UnknownPosition {
                player_id: p.id.clone(),
                name: p.name.clone(),
            });
        }

        // Scale so startable players' VBD sums to the league budget.
        let startable_vbd: f64 = projections
            .iter()
            .enumerate()
            .filter(|(idx, p)| {
                p.position.is_known() && ranks[*idx] <= self.startable_count(p.position)
            })
            .map(|(idx, _)| vbd[idx])
            .sum();
        let dollars_per_vbd = if startable_vbd > 0.0 {
            self.total_budget() as f64 / startable_vbd
        } else {
            if !projections.is_empty() {
                warn!("no startable surplus value in pool; all players at $1");
                flags.push(ValuationFlag::NoSurplusValue);
            }
            0.0
        };
        debug!(
            "valued {} players, startable VBD {:.1}, ${:.3}/pt",
            projections.len(),
            startable_vbd,
            dollars_per_vbd
        );

        let results = projections
            .iter()
            .enumerate()
            .map(|(idx, p)| self.build_result(p, points[idx], ranks[idx], vbd[idx], dollars_per_vbd))
            .collect();

        ModelOutput {
            results,
            replacement_levels,
            flags,
            dollars_per_vbd,
        }
    }

    fn build_result(
        &self,
        p: &PlayerProjection,
        points: f64,
        position_rank: usize,
        vbd: f64,
        dollars_per_vbd: f64,
    ) -> ValuationResult {
        let intrinsic_value = round_dollars(vbd * dollars_per_vbd).max(1);
        let tier = Tier::from_rank(
            position_rank,
            intrinsic_value as f64,
            self.settings.tier_value_floor,
        );
        let target = intrinsic_value as f64;

        ValuationResult {
            id: p.id.clone(),
            name: p.name.clone(),
            position: p.position,
            team: p.team.clone(),
            bye_week: p.bye_week,
            projected_points: points,
            adp: p.adp,
            position_rank,
            vbd,
            tier,
            intrinsic_value,
            market_price: self.default_market_price(intrinsic_value),
            min_bid: round_dollars(target * self.settings.bid_band_low).max(1),
            target_bid: intrinsic_value,
            max_bid: round_dollars(target * self.settings.bid_band_high).max(1),
            confidence: valuation_confidence(position_rank, p.adp.is_some()),
            advanced: BTreeMap::new(),
        }
    }

    /// Conservative market price used when no AAV is known.
    pub fn default_market_price(&self, intrinsic_value: u32) -> u32 {
        round_dollars(intrinsic_value as f64 * self.settings.default_market_fraction)
            .clamp(1, self.settings.default_market_max.max(1))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Round to whole dollars; negative and non-finite amounts become 0.
pub(crate) fn round_dollars(amount: f64) -> u32 {
    if amount.is_finite() && amount > 0.0 {
        amount.round().min(u32::MAX as f64) as u32
    } else {
        0
    }
}

/// Confidence in a valuation: higher for well-established top players,
/// slightly higher again when market ADP corroborates them.
fn valuation_confidence(position_rank: usize, has_adp: bool) -> f64 {
    let base = match position_rank {
        0..=5 => 0.9,
        6..=12 => 0.8,
        13..=24 => 0.7,
        _ => 0.6,
    };
    let bonus = if has_adp { 0.05 } else { 0.0 };
    f64::min(base + bonus, 1.0)
}
