// Draft snapshot handed to the bid advisor: teams, budgets, history, pool.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::pick::{DraftPick, DraftedPlayer, Position};
use super::roster::{self, RosterRequirements};
use crate::valuation::ValuationResult;

/// The state of a single fantasy team during the draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    /// Remaining auction budget in whole dollars.
    pub budget_remaining: u32,
    /// Players already won, in draft order.
    #[serde(default)]
    pub roster: Vec<DraftedPlayer>,
    #[serde(default)]
    pub is_user: bool,
}

impl Team {
    pub fn new(id: impl Into<String>, name: impl Into<String>, budget: u32) -> Self {
        Team {
            id: id.into(),
            name: name.into(),
            budget_remaining: budget,
            roster: Vec::new(),
            is_user: false,
        }
    }

    pub fn position_count(&self, position: Position) -> usize {
        roster::position_count(&self.roster, position)
    }

    pub fn remaining_slots(&self, requirements: &RosterRequirements) -> usize {
        roster::remaining_slots(requirements, self.roster.len())
    }

    /// Largest bid this team can place while still filling every other slot at $1.
    pub fn max_affordable_bid(&self, requirements: &RosterRequirements) -> u32 {
        roster::max_affordable_bid(self.budget_remaining, self.remaining_slots(requirements))
    }

    /// Average dollars available per open slot. Zero when the roster is full.
    pub fn dollars_per_slot(&self, requirements: &RosterRequirements) -> f64 {
        match self.remaining_slots(requirements) {
            0 => 0.0,
            n => self.budget_remaining as f64 / n as f64,
        }
    }
}

/// A full snapshot of the draft, built fresh by the caller before each
/// advisory call. The advisor only ever reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftContext {
    pub my_team: Team,
    /// Every team in the league. May or may not include `my_team`; lookups
    /// always prefer the `my_team` copy.
    #[serde(default)]
    pub all_teams: Vec<Team>,
    /// Completed picks, oldest first.
    #[serde(default)]
    pub draft_history: Vec<DraftPick>,
    /// Undrafted players with their valuations.
    #[serde(default)]
    pub available_players: Vec<ValuationResult>,
    #[serde(default)]
    pub current_bid: u32,
    /// Starting budget per team.
    pub total_budget: u32,
    /// League roster requirements. When absent, the advisor's configured
    /// defaults apply.
    #[serde(default)]
    pub roster_requirements: Option<RosterRequirements>,
}

impl DraftContext {
    /// Start a context for a fresh draft with only the user's team known.
    pub fn new(mut my_team: Team, total_budget: u32) -> Self {
        my_team.is_user = true;
        DraftContext {
            all_teams: vec![my_team.clone()],
            my_team,
            draft_history: Vec::new(),
            available_players: Vec::new(),
            current_bid: 0,
            total_budget,
            roster_requirements: None,
        }
    }

    /// All league teams with `my_team` substituted in (or appended when the
    /// caller left it out of `all_teams`).
    pub fn league_teams(&self) -> Vec<&Team> {
        let mut teams: Vec<&Team> = self
            .all_teams
            .iter()
            .map(|t| if t.id == self.my_team.id { &self.my_team } else { t })
            .collect();
        if !self.all_teams.iter().any(|t| t.id == self.my_team.id) {
            teams.push(&self.my_team);
        }
        teams
    }

    /// Every team except the user's.
    pub fn opponents(&self) -> impl Iterator<Item = &Team> {
        self.all_teams.iter().filter(move |t| t.id != self.my_team.id)
    }

    /// The last `n` picks (fewer if the draft is younger than that).
    pub fn recent_picks(&self, n: usize) -> &[DraftPick] {
        let start = self.draft_history.len().saturating_sub(n);
        &self.draft_history[start..]
    }

    /// Apply a completed pick: append it to the history, charge the winning
    /// team, roster the player, and drop them from the available pool.
    ///
    /// This is a convenience for callers that maintain a context across the
    /// draft; the advisor itself never mutates a context.
    pub fn record_pick(&mut self, pick: DraftPick) {
        let mut applied = false;
        if self.my_team.id == pick.team_id {
            charge(&mut self.my_team, &pick);
            applied = true;
        }
        for team in self.all_teams.iter_mut().filter(|t| t.id == pick.team_id) {
            charge(team, &pick);
            applied = true;
        }
        if !applied {
            warn!(
                "pick for unknown team '{}' ({}) recorded in history only",
                pick.team_id, pick.player.name
            );
        }
        self.available_players.retain(|p| p.id != pick.player.id);
        self.draft_history.push(pick);
    }
}

fn charge(team: &mut Team, pick: &DraftPick) {
    team.budget_remaining = team.budget_remaining.saturating_sub(pick.price);
    team.roster.push(pick.player.clone());
}
