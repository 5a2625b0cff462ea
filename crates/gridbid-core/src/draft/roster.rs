// Roster requirements and per-team slot accounting.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::pick::{DraftedPlayer, Position};

/// Min/optimal/max roster counts for a single position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionLimits {
    /// Starters the team must field.
    pub min: usize,
    /// Count a balanced roster carries, bench depth included.
    pub optimal: usize,
    pub max: usize,
}

impl PositionLimits {
    pub const fn new(min: usize, optimal: usize, max: usize) -> Self {
        PositionLimits { min, optimal, max }
    }
}

/// FLEX starter slots and which positions may fill them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlexRequirement {
    pub count: usize,
    pub eligible_positions: Vec<Position>,
}

/// Static league roster configuration.
///
/// This is league policy, not player data: it is built once from league.toml
/// (or `Default`) and passed by reference into every valuation and advisory
/// call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterRequirements {
    pub positions: BTreeMap<Position, PositionLimits>,
    pub flex: FlexRequirement,
    pub bench: usize,
}

impl Default for RosterRequirements {
    /// Standard 16-man auction roster: QB, 2 RB, 2 WR, TE, FLEX, DST, K and
    /// seven bench spots.
    fn default() -> Self {
        let mut positions = BTreeMap::new();
        positions.insert(Position::Quarterback, PositionLimits::new(1, 2, 3));
        positions.insert(Position::RunningBack, PositionLimits::new(2, 4, 6));
        positions.insert(Position::WideReceiver, PositionLimits::new(2, 4, 6));
        positions.insert(Position::TightEnd, PositionLimits::new(1, 1, 2));
        positions.insert(Position::Defense, PositionLimits::new(1, 1, 2));
        positions.insert(Position::Kicker, PositionLimits::new(1, 1, 2));

        RosterRequirements {
            positions,
            flex: FlexRequirement {
                count: 1,
                eligible_positions: vec![
                    Position::RunningBack,
                    Position::WideReceiver,
                    Position::TightEnd,
                ],
            },
            bench: 7,
        }
    }
}

impl RosterRequirements {
    /// Limits for a position, or `None` when the league does not define it.
    pub fn limits(&self, position: Position) -> Option<PositionLimits> {
        self.positions.get(&position).copied()
    }

    /// Number of starting (non-bench) slots per team, FLEX included.
    pub fn starting_slots(&self) -> usize {
        self.positions.values().map(|l| l.min).sum::<usize>() + self.flex.count
    }

    /// Total roster size per team: starters plus bench.
    pub fn roster_size(&self) -> usize {
        self.starting_slots() + self.bench
    }

    pub fn is_flex_eligible(&self, position: Position) -> bool {
        self.flex.count > 0 && self.flex.eligible_positions.contains(&position)
    }
}

/// Count rostered players at a position.
pub fn position_count(roster: &[DraftedPlayer], position: Position) -> usize {
    roster.iter().filter(|p| p.position == position).count()
}

/// Roster slots still open for a team with `filled` players.
pub fn remaining_slots(requirements: &RosterRequirements, filled: usize) -> usize {
    requirements.roster_size().saturating_sub(filled)
}

/// Maximum a team can bid right now.
///
/// Must reserve $1 per empty slot (excluding the slot about to be filled).
pub fn max_affordable_bid(budget_remaining: u32, remaining_slots: usize) -> u32 {
    if remaining_slots == 0 {
        return 0;
    }
    let reserved = (remaining_slots - 1) as u32;
    budget_remaining.saturating_sub(reserved)
}
