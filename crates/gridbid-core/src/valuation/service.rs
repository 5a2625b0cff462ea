// Valuation service: runs the model over a full pool, merges external market
// and advanced-stat rows by normalized identity, and summarizes the pool.
//
// Output is a pure function of the inputs. Results are sorted by value with
// deterministic tie-breaks and every map is ordered, so serializing the same
// report twice yields identical bytes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::model::{round_dollars, ValuationFlag, ValuationModel};
use super::normalize::player_key;
use super::{PlayerProjection, Tier, ValuationResult};
use crate::draft::Position;

/// Startable value within this band of the league budget passes the
/// conservation check.
const BUDGET_TOLERANCE_PCT: (f64, f64) = (95.0, 105.0);

// ---------------------------------------------------------------------------
// External rows
// ---------------------------------------------------------------------------

/// Market data for one player: draft position and/or average auction value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketRow {
    pub name: String,
    pub position: Position,
    #[serde(default)]
    pub team: String,
    #[serde(default)]
    pub adp: Option<f64>,
    #[serde(default)]
    pub aav: Option<f64>,
}

/// Free-form advanced stats for one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvancedStatsRow {
    pub name: String,
    pub position: Position,
    #[serde(default)]
    pub stats: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewSource {
    Projection,
    Market,
    Advanced,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReviewReason {
    /// No projection carries this key.
    Unmatched,
    /// Several projections share this key, so no row can be attached safely.
    AmbiguousKey { player_ids: Vec<String> },
    /// The same source lists this key more than once.
    DuplicateRow,
}

/// An identity the service refused to guess about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewItem {
    pub source: ReviewSource,
    pub name: String,
    pub position: Position,
    pub key: String,
    pub reason: ReviewReason,
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSummary {
    pub count: usize,
    /// Players at or above the replacement rank.
    pub startable: usize,
    pub total_value: u32,
    pub mean_value: f64,
    pub top_value: u32,
    pub replacement_level: f64,
}

/// Does the startable pool's value add up to the league budget?
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetCheck {
    pub league_budget: u32,
    pub startable_value: u32,
    pub percentage: f64,
    pub within_tolerance: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub player_count: usize,
    pub positions: BTreeMap<Position, PositionSummary>,
    pub tier_counts: BTreeMap<Tier, usize>,
    pub replacement_levels: BTreeMap<Position, f64>,
    pub budget: BudgetCheck,
}

/// Everything one pass over a player pool produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationReport {
    /// Sorted by intrinsic value (desc), then projected points (desc), then id.
    pub results: Vec<ValuationResult>,
    pub summary: Summary,
    pub flags: Vec<ValuationFlag>,
    pub review: Vec<ReviewItem>,
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ValuationService {
    model: ValuationModel,
}

impl ValuationService {
    pub fn new(model: ValuationModel) -> Self {
        ValuationService { model }
    }

    pub fn model(&self) -> &ValuationModel {
        &self.model
    }

    /// Value a pool and merge external data into it.
    pub fn process_players(
        &self,
        projections: &[PlayerProjection],
        market: &[MarketRow],
        advanced: &[AdvancedStatsRow],
    ) -> ValuationReport {
        let mut review = Vec::new();

        // Projection keys. A key shared by several projections cannot take
        // external data.
        let mut projection_index: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (idx, p) in projections.iter().enumerate() {
            projection_index
                .entry(player_key(&p.name, p.position))
                .or_default()
                .push(idx);
        }
        for (key, indices) in projection_index.iter().filter(|(_, v)| v.len() > 1) {
            let first = &projections[indices[0]];
            review.push(ReviewItem {
                source: ReviewSource::Projection,
                name: first.name.clone(),
                position: first.position,
                key: key.clone(),
                reason: ReviewReason::AmbiguousKey {
                    player_ids: indices.iter().map(|&i| projections[i].id.clone()).collect(),
                },
            });
        }

        let market_by_player = match_rows(
            market,
            |r| (r.name.as_str(), r.position),
            ReviewSource::Market,
            projections,
            &projection_index,
            &mut review,
        );
        let advanced_by_player = match_rows(
            advanced,
            |r| (r.name.as_str(), r.position),
            ReviewSource::Advanced,
            projections,
            &projection_index,
            &mut review,
        );

        // Single normalization pass: market ADP/AAV take precedence over
        // whatever the projection source carried.
        let merged: Vec<PlayerProjection> = projections
            .iter()
            .enumerate()
            .map(|(idx, p)| {
                let mut p = p.clone();
                if let Some(row) = market_by_player.get(&idx) {
                    p.adp = row.adp.or(p.adp);
                    p.market_value = row.aav.or(p.market_value);
                }
                p
            })
            .collect();

        let output = self.model.evaluate(&merged);

        let mut results: Vec<ValuationResult> = output
            .results
            .into_iter()
            .zip(&merged)
            .enumerate()
            .map(|(idx, (mut result, proj))| {
                if let Some(aav) = proj.market_value.filter(|v| v.is_finite() && *v > 0.0) {
                    result.market_price = round_dollars(aav).max(1);
                }
                if let Some(row) = advanced_by_player.get(&idx) {
                    result.advanced = row.stats.clone();
                }
                result
            })
            .collect();

        results.sort_by(|a, b| {
            b.intrinsic_value
                .cmp(&a.intrinsic_value)
                .then_with(|| b.projected_points.total_cmp(&a.projected_points))
                .then_with(|| a.id.cmp(&b.id))
        });

        review.sort_by(|a, b| {
            a.source
                .cmp(&b.source)
                .then_with(|| a.key.cmp(&b.key))
                .then_with(|| a.name.cmp(&b.name))
        });

        let summary = self.summarize(&results, &output.replacement_levels);
        info!(
            "valued {} players; startable value ${} of ${} ({:.1}%), {} rows for review",
            summary.player_count,
            summary.budget.startable_value,
            summary.budget.league_budget,
            summary.budget.percentage,
            review.len()
        );

        ValuationReport {
            results,
            summary,
            flags: output.flags,
            review,
        }
    }

    fn summarize(
        &self,
        results: &[ValuationResult],
        replacement_levels: &BTreeMap<Position, f64>,
    ) -> Summary {
        let mut positions: BTreeMap<Position, PositionSummary> = BTreeMap::new();
        let mut tier_counts: BTreeMap<Tier, usize> = BTreeMap::new();
        let mut startable_value: u32 = 0;

        for r in results {
            *tier_counts.entry(r.tier).or_default() += 1;

            let startable =
                r.position.is_known() && r.position_rank <= self.model.startable_count(r.position);
            if startable {
                startable_value += r.intrinsic_value;
            }

            let entry = positions.entry(r.position).or_insert_with(|| PositionSummary {
                count: 0,
                startable: 0,
                total_value: 0,
                mean_value: 0.0,
                top_value: 0,
                replacement_level: replacement_levels.get(&r.position).copied().unwrap_or(0.0),
            });
            entry.count += 1;
            entry.total_value += r.intrinsic_value;
            entry.top_value = entry.top_value.max(r.intrinsic_value);
            if startable {
                entry.startable += 1;
            }
        }
        for summary in positions.values_mut() {
            summary.mean_value = summary.total_value as f64 / summary.count as f64;
        }

        let league_budget = self.model.total_budget();
        let percentage = if league_budget > 0 {
            startable_value as f64 / league_budget as f64 * 100.0
        } else {
            0.0
        };
        let within_tolerance =
            percentage >= BUDGET_TOLERANCE_PCT.0 && percentage <= BUDGET_TOLERANCE_PCT.1;
        if !within_tolerance && !results.is_empty() {
            warn!(
                "startable value is {percentage:.1}% of league budget, outside {}-{}%",
                BUDGET_TOLERANCE_PCT.0, BUDGET_TOLERANCE_PCT.1
            );
        }

        Summary {
            player_count: results.len(),
            positions,
            tier_counts,
            replacement_levels: replacement_levels.clone(),
            budget: BudgetCheck {
                league_budget,
                startable_value,
                percentage,
                within_tolerance,
            },
        }
    }
}

/// Attach external rows to projections by exact normalized key.
///
/// Returns projection index -> row. Rows that are unmatched, duplicated
/// within their source, or that hit an ambiguous projection key are routed
/// to `review` instead.
fn match_rows<'a, R>(
    rows: &'a [R],
    identity: impl Fn(&R) -> (&str, Position),
    source: ReviewSource,
    projections: &[PlayerProjection],
    projection_index: &BTreeMap<String, Vec<usize>>,
    review: &mut Vec<ReviewItem>,
) -> BTreeMap<usize, &'a R> {
    let mut by_key: BTreeMap<String, Vec<&'a R>> = BTreeMap::new();
    for row in rows {
        let (name, position) = identity(row);
        by_key.entry(player_key(name, position)).or_default().push(row);
    }

    let mut matched = BTreeMap::new();
    for (key, group) in by_key {
        let (name, position) = identity(group[0]);
        let reason = match projection_index.get(&key).map(Vec::as_slice) {
            _ if group.len() > 1 => Some(ReviewReason::DuplicateRow),
            Some([idx]) => {
                matched.insert(*idx, group[0]);
                None
            }
            Some(indices) if !indices.is_empty() => Some(ReviewReason::AmbiguousKey {
                player_ids: indices.iter().map(|&i| projections[i].id.clone()).collect(),
            }),
            _ => Some(ReviewReason::Unmatched),
        };
        if let Some(reason) = reason {
            warn!("{source:?} row '{name}' ({position}) not merged: {reason:?}");
            review.push(ReviewItem {
                source,
                name: name.to_string(),
                position,
                key,
                reason,
            });
        }
    }
    matched
}
