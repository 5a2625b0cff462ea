// Draft-state signals: position runs, panic, draft stage, competitors,
// bye-week conflicts, team stacks, alternatives and market inflation.
//
// None of these feed the four sub-scores directly. They shape the max-bid
// chain and the narrative attached to a recommendation.

use super::recommendation::{Alternative, Competitor, DraftStage};
use super::tuning::{MaxBidTuning, SignalTuning};
use crate::draft::{DraftContext, DraftPick, Position, PositionLimits, RosterRequirements, Team};
use crate::valuation::model::round_dollars;
use crate::valuation::normalize::normalize_team_code;
use crate::valuation::{Tier, ValuationResult};

// ---------------------------------------------------------------------------
// Position run
// ---------------------------------------------------------------------------

/// True when at least `run_threshold` of the last `run_window` picks went to
/// this position.
pub fn detect_position_run(history: &[DraftPick], position: Position, t: &SignalTuning) -> bool {
    if !position.is_known() || t.run_window == 0 {
        return false;
    }
    let start = history.len().saturating_sub(t.run_window);
    let same = history[start..]
        .iter()
        .filter(|p| p.player.position == position)
        .count();
    same >= t.run_threshold
}

// ---------------------------------------------------------------------------
// Panic
// ---------------------------------------------------------------------------

/// Urgency from an unmet positional minimum versus quality (tier2 or better)
/// players left at the position. 0.0 when the minimum is met, 1.0 when no
/// quality player remains.
pub fn panic_level(
    count: usize,
    limits: Option<PositionLimits>,
    position: Position,
    available: &[ValuationResult],
    t: &SignalTuning,
) -> f64 {
    let Some(limits) = limits else {
        return 0.0;
    };
    let needed = limits.min.saturating_sub(count);
    if needed == 0 {
        return 0.0;
    }
    let quality = available
        .iter()
        .filter(|p| p.position == position && p.tier.level() <= Tier::Tier2.level())
        .count();
    if quality == 0 {
        return 1.0;
    }
    (needed as f64 / quality as f64 * t.panic_scale).clamp(0.0, 1.0)
}

// ---------------------------------------------------------------------------
// Draft stage
// ---------------------------------------------------------------------------

/// Stage by the fraction of league roster slots already filled.
pub fn draft_stage(ctx: &DraftContext, requirements: &RosterRequirements, t: &SignalTuning) -> DraftStage {
    let teams = ctx.league_teams();
    let total_slots = teams.len() * requirements.roster_size();
    if total_slots == 0 {
        return DraftStage::Early;
    }
    let rostered: usize = teams.iter().map(|team| team.roster.len()).sum();
    let filled = rostered.max(ctx.draft_history.len());
    let fraction = filled as f64 / total_slots as f64;

    if fraction < t.early_stage_fraction {
        DraftStage::Early
    } else if fraction < t.middle_stage_fraction {
        DraftStage::Middle
    } else {
        DraftStage::Late
    }
}

// ---------------------------------------------------------------------------
// Competitors
// ---------------------------------------------------------------------------

/// Opponents still short of the optimal count at the position who can afford
/// at least `competitor_value_fraction` of the player's intrinsic value.
/// Sorted by affordable bid (desc), then team id.
pub fn find_competitors(
    ctx: &DraftContext,
    player: &ValuationResult,
    requirements: &RosterRequirements,
    t: &SignalTuning,
) -> Vec<Competitor> {
    let threshold = player.intrinsic_value as f64 * t.competitor_value_fraction;
    let limits = requirements.limits(player.position);

    let mut competitors: Vec<Competitor> = ctx
        .opponents()
        .filter_map(|team| {
            let count = team.position_count(player.position);
            let wants = limits.map_or(true, |l| count < l.optimal);
            let affordable = team.max_affordable_bid(requirements);
            (wants && affordable as f64 >= threshold).then(|| Competitor {
                team_id: team.id.clone(),
                team_name: team.name.clone(),
                max_affordable_bid: affordable,
                position_count: count,
            })
        })
        .collect();

    competitors.sort_by(|a, b| {
        b.max_affordable_bid
            .cmp(&a.max_affordable_bid)
            .then_with(|| a.team_id.cmp(&b.team_id))
    });
    competitors
}

// ---------------------------------------------------------------------------
// Roster construction checks
// ---------------------------------------------------------------------------

/// Warnings about bye weeks the candidate would share with the roster.
pub fn bye_week_warnings(team: &Team, player: &ValuationResult, t: &SignalTuning) -> Vec<String> {
    let Some(bye) = player.bye_week else {
        return Vec::new();
    };
    let sharing: Vec<_> = team
        .roster
        .iter()
        .filter(|p| p.bye_week == Some(bye))
        .collect();

    let mut warnings = Vec::new();
    let same_position = sharing
        .iter()
        .filter(|p| p.position == player.position)
        .count();
    if same_position > 0 {
        warnings.push(format!(
            "Shares bye week {bye} with {same_position} rostered {}",
            player.position
        ));
    }
    if sharing.len() + 1 >= t.bye_stack_threshold.max(1) && sharing.len() > same_position {
        warnings.push(format!(
            "Would put {} rostered players on bye in week {bye}",
            sharing.len() + 1
        ));
    }
    warnings
}

/// Percent bonus for stacking a quarterback with pass catchers from the
/// same NFL team, capped at `max_stack_bonus_pct`.
pub fn team_stack_synergy(team: &Team, player: &ValuationResult, t: &MaxBidTuning) -> f64 {
    let nfl_team = normalize_team_code(&player.team);
    if nfl_team.is_empty() {
        return 0.0;
    }
    let pairs_with = |pos: Position| {
        if player.position == Position::Quarterback {
            pos.is_pass_catcher()
        } else if player.position.is_pass_catcher() {
            pos == Position::Quarterback
        } else {
            false
        }
    };
    let matches = team
        .roster
        .iter()
        .filter(|p| pairs_with(p.position) && normalize_team_code(&p.team) == nfl_team)
        .count();
    (matches as f64 * t.qb_pass_catcher_stack_pct).min(t.max_stack_bonus_pct)
}

// ---------------------------------------------------------------------------
// Alternatives
// ---------------------------------------------------------------------------

/// Same-position players within one tier or a few dollars of the candidate,
/// best edge first.
pub fn find_alternatives(
    player: &ValuationResult,
    available: &[ValuationResult],
    t: &SignalTuning,
) -> Vec<Alternative> {
    let mut candidates: Vec<&ValuationResult> = available
        .iter()
        .filter(|p| p.position == player.position && p.id != player.id)
        .filter(|p| {
            let tier_gap = p.tier.level().abs_diff(player.tier.level());
            let value_gap = (p.intrinsic_value as f64 - player.intrinsic_value as f64).abs();
            tier_gap <= t.alternative_tier_span || value_gap <= t.alternative_value_span
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.edge()
            .cmp(&a.edge())
            .then_with(|| b.intrinsic_value.cmp(&a.intrinsic_value))
            .then_with(|| a.id.cmp(&b.id))
    });
    candidates
        .into_iter()
        .take(t.max_alternatives)
        .map(Alternative::from)
        .collect()
}

// ---------------------------------------------------------------------------
// Market inflation
// ---------------------------------------------------------------------------

/// League-wide price inflation in percent.
///
/// Compares the discretionary dollars left (budget beyond $1 per open slot)
/// with the surplus value above $1 of players still available. Zero before
/// the first pick; clamped to +/- `inflation_band_pct`.
pub fn market_inflation(
    ctx: &DraftContext,
    requirements: &RosterRequirements,
    t: &MaxBidTuning,
) -> f64 {
    if ctx.draft_history.is_empty() {
        return 0.0;
    }
    let discretionary: f64 = ctx
        .league_teams()
        .iter()
        .map(|team| {
            let reserved = team.remaining_slots(requirements) as f64;
            (team.budget_remaining as f64 - reserved).max(0.0)
        })
        .sum();
    let surplus: f64 = ctx
        .available_players
        .iter()
        .filter(|p| p.intrinsic_value > 1)
        .map(|p| (p.intrinsic_value - 1) as f64)
        .sum();
    if surplus <= 0.0 {
        return 0.0;
    }
    let pct = (discretionary / surplus - 1.0) * 100.0;
    let band = t.inflation_band_pct.abs();
    if pct.is_finite() {
        pct.clamp(-band, band)
    } else {
        0.0
    }
}

/// Likely hammer price: at least the current bid, otherwise market price
/// adjusted for inflation and bidding pressure from competitors.
pub fn predicted_final_price(
    current_bid: u32,
    market_price: u32,
    inflation_pct: f64,
    competitors: usize,
    t: &SignalTuning,
) -> u32 {
    let pressure = 1.0 + t.competitor_price_premium * competitors.min(4) as f64;
    let projected = market_price as f64 * (1.0 + inflation_pct / 100.0) * pressure;
    current_bid.max(round_dollars(projected))
}

/// Positions below their minimum on this team, excluding `except`.
pub fn unfilled_positions(
    team: &Team,
    requirements: &RosterRequirements,
    except: Position,
) -> Vec<Position> {
    requirements
        .positions
        .iter()
        .filter(|(pos, limits)| **pos != except && team.position_count(**pos) < limits.min)
        .map(|(pos, _)| *pos)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::DraftedPlayer;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn make_player(id: &str, position: Position, tier: Tier, value: u32, market: u32) -> ValuationResult {
        ValuationResult {
            id: id.into(),
            name: format!("Player {id}"),
            position,
            team: "KC".into(),
            bye_week: Some(6),
            projected_points: 200.0,
            adp: None,
            position_rank: 1,
            vbd: value as f64,
            tier,
            intrinsic_value: value,
            market_price: market,
            min_bid: value,
            target_bid: value,
            max_bid: value,
            confidence: 0.8,
            advanced: BTreeMap::new(),
        }
    }

    fn drafted(id: &str, position: Position, team: &str, bye: Option<u8>) -> DraftedPlayer {
        DraftedPlayer {
            id: id.into(),
            name: id.into(),
            position,
            team: team.into(),
            bye_week: bye,
        }
    }

    fn pick(position: Position, team_id: &str, price: u32) -> DraftPick {
        DraftPick {
            player: drafted("x", position, "DAL", None),
            price,
            team_id: team_id.into(),
            timestamp: Utc.with_ymd_and_hms(2026, 8, 30, 19, 0, 0).unwrap(),
        }
    }

    #[test]
    fn position_run_needs_three_of_last_five() {
        let t = SignalTuning::default();
        let mut history = vec![
            pick(Position::RunningBack, "a", 30),
            pick(Position::RunningBack, "a", 30),
            pick(Position::WideReceiver, "a", 30),
            pick(Position::WideReceiver, "a", 30),
            pick(Position::RunningBack, "a", 30),
        ];
        assert!(detect_position_run(&history, Position::RunningBack, &t));
        history.push(pick(Position::TightEnd, "a", 5));
        // Window now holds only two RBs.
        assert!(!detect_position_run(&history, Position::RunningBack, &t));
        assert!(!detect_position_run(&[], Position::RunningBack, &t));
        assert!(!detect_position_run(&history, Position::Unknown, &t));
    }

    #[test]
    fn panic_levels() {
        let t = SignalTuning::default();
        let rb = Some(PositionLimits::new(2, 4, 6));
        let pool = vec![
            make_player("a", Position::RunningBack, Tier::Tier1, 30, 30),
            make_player("b", Position::RunningBack, Tier::Tier2, 15, 15),
            make_player("c", Position::RunningBack, Tier::Tier2, 12, 12),
            make_player("d", Position::RunningBack, Tier::Tier2, 10, 10),
            make_player("e", Position::RunningBack, Tier::Tier3, 6, 6),
        ];
        assert!(approx_eq(panic_level(0, rb, Position::RunningBack, &pool, &t), 0.5, 1e-9));
        assert!(approx_eq(panic_level(1, rb, Position::RunningBack, &pool, &t), 0.25, 1e-9));
        assert!(approx_eq(panic_level(2, rb, Position::RunningBack, &pool, &t), 0.0, 1e-9));
        assert!(approx_eq(panic_level(0, rb, Position::RunningBack, &pool[4..], &t), 1.0, 1e-9));
        assert!(approx_eq(panic_level(0, None, Position::Unknown, &pool, &t), 0.0, 1e-9));
    }

    #[test]
    fn stage_by_filled_fraction() {
        let t = SignalTuning::default();
        let req = RosterRequirements::default();
        let mut ctx = DraftContext::new(Team::new("me", "Me", 200), 200);
        ctx.all_teams.push(Team::new("b", "B", 200));
        // 2 teams * 16 slots = 32.
        assert_eq!(draft_stage(&ctx, &req, &t), DraftStage::Early);
        for i in 0..8 {
            ctx.all_teams[1]
                .roster
                .push(drafted(&format!("p{i}"), Position::WideReceiver, "LV", None));
        }
        assert_eq!(draft_stage(&ctx, &req, &t), DraftStage::Middle);
        for i in 8..21 {
            ctx.all_teams[1]
                .roster
                .push(drafted(&format!("p{i}"), Position::WideReceiver, "LV", None));
        }
        assert_eq!(draft_stage(&ctx, &req, &t), DraftStage::Late);
    }

    #[test]
    fn competitors_need_and_money() {
        let t = SignalTuning::default();
        let req = RosterRequirements::default();
        let mut ctx = DraftContext::new(Team::new("me", "Me", 200), 200);
        ctx.all_teams.push(Team::new("rich", "Rich", 150));
        ctx.all_teams.push(Team::new("poor", "Poor", 20));
        let mut stacked = Team::new("stacked", "Stacked", 180);
        for i in 0..4 {
            stacked
                .roster
                .push(drafted(&format!("r{i}"), Position::RunningBack, "SF", None));
        }
        ctx.all_teams.push(stacked);
        ctx.all_teams.push(Team::new("also", "Also", 150));

        let player = make_player("rb", Position::RunningBack, Tier::Elite, 60, 55);
        let comps = find_competitors(&ctx, &player, &req, &t);
        let ids: Vec<&str> = comps.iter().map(|c| c.team_id.as_str()).collect();
        // poor can afford only $5; stacked is at optimal; ties broken by id.
        assert_eq!(ids, vec!["also", "rich"]);
        assert_eq!(comps[0].max_affordable_bid, 135);
    }

    #[test]
    fn competitors_include_every_qualifying_team() {
        let t = SignalTuning::default();
        let req = RosterRequirements::default();
        let mut ctx = DraftContext::new(Team::new("t01", "Me", 200), 200);
        for i in 2..=12 {
            ctx.all_teams
                .push(Team::new(format!("t{i:02}"), format!("Team {i}"), 200));
        }
        let player = make_player("rb", Position::RunningBack, Tier::Elite, 60, 55);
        let comps = find_competitors(&ctx, &player, &req, &t);
        assert_eq!(comps.len(), 11);
        assert_eq!(comps[0].team_id, "t02");
        assert!(comps.iter().all(|c| c.team_id != "t01"));
    }

    #[test]
    fn bye_week_conflicts() {
        let t = SignalTuning::default();
        let mut team = Team::new("me", "Me", 150);
        team.roster.push(drafted("wr1", Position::WideReceiver, "MIA", Some(6)));
        team.roster.push(drafted("qb1", Position::Quarterback, "MIA", Some(6)));
        let player = make_player("wr2", Position::WideReceiver, Tier::Tier1, 30, 30);
        let warnings = bye_week_warnings(&team, &player, &t);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("bye week 6"));
        assert!(warnings[1].contains("3 rostered players"));

        let mut other = player.clone();
        other.bye_week = Some(9);
        assert!(bye_week_warnings(&team, &other, &t).is_empty());
    }

    #[test]
    fn stack_synergy_capped() {
        let t = MaxBidTuning::default();
        let mut team = Team::new("me", "Me", 150);
        team.roster.push(drafted("wr1", Position::WideReceiver, "KC", None));
        team.roster.push(drafted("te1", Position::TightEnd, "KC", None));
        team.roster.push(drafted("wr2", Position::WideReceiver, "KC", None));
        team.roster.push(drafted("rb1", Position::RunningBack, "KC", None));
        let qb = make_player("qb", Position::Quarterback, Tier::Tier1, 20, 20);
        assert!(approx_eq(team_stack_synergy(&team, &qb, &t), 10.0, 1e-9));

        let mut one = Team::new("me", "Me", 150);
        one.roster.push(drafted("qb1", Position::Quarterback, "kc", None));
        let wr = make_player("wr", Position::WideReceiver, Tier::Tier1, 20, 20);
        assert!(approx_eq(team_stack_synergy(&one, &wr, &t), 5.0, 1e-9));

        let rb = make_player("rb", Position::RunningBack, Tier::Tier1, 20, 20);
        assert!(approx_eq(team_stack_synergy(&one, &rb, &t), 0.0, 1e-9));
    }

    #[test]
    fn alternatives_ranked_by_edge() {
        let t = SignalTuning::default();
        let player = make_player("p", Position::WideReceiver, Tier::Tier1, 30, 30);
        let pool = vec![
            player.clone(),
            make_player("a", Position::WideReceiver, Tier::Tier1, 28, 20),
            make_player("b", Position::WideReceiver, Tier::Tier2, 18, 17),
            make_player("c", Position::WideReceiver, Tier::Elite, 45, 30),
            make_player("d", Position::WideReceiver, Tier::Tier3, 27, 26),
            make_player("e", Position::WideReceiver, Tier::Replacement, 1, 1),
            make_player("f", Position::RunningBack, Tier::Tier1, 30, 5),
            make_player("g", Position::WideReceiver, Tier::Tier2, 16, 16),
        ];
        let alts = find_alternatives(&player, &pool, &t);
        let ids: Vec<&str> = alts.iter().map(|a| a.id.as_str()).collect();
        // c (+15), a (+8), then b/d tie on +1: d has the higher value.
        // e is too far away on both tier and value.
        assert_eq!(ids, vec!["c", "a", "d"]);
        assert_eq!(alts[0].edge, 15);
    }

    #[test]
    fn inflation_zero_before_first_pick() {
        let t = MaxBidTuning::default();
        let req = RosterRequirements::default();
        let mut ctx = DraftContext::new(Team::new("me", "Me", 200), 200);
        ctx.available_players
            .push(make_player("a", Position::RunningBack, Tier::Elite, 60, 60));
        assert!(approx_eq(market_inflation(&ctx, &req, &t), 0.0, 1e-9));
    }

    #[test]
    fn inflation_from_money_versus_value() {
        let t = MaxBidTuning::default();
        let req = RosterRequirements::default();
        let mut ctx = DraftContext::new(Team::new("me", "Me", 200), 200);
        ctx.record_pick(DraftPick {
            player: drafted("gone", Position::RunningBack, "DAL", None),
            price: 50,
            team_id: "me".into(),
            timestamp: Utc.with_ymd_and_hms(2026, 8, 30, 19, 0, 0).unwrap(),
        });
        // Left: $150 with 15 open slots -> $135 discretionary.
        ctx.available_players
            .push(make_player("a", Position::RunningBack, Tier::Elite, 121, 60));
        // Surplus 120 -> rate 1.125 -> +12.5%.
        assert!(approx_eq(market_inflation(&ctx, &req, &t), 12.5, 1e-9));

        ctx.available_players[0].intrinsic_value = 11;
        // Surplus 10 -> way above the band.
        assert!(approx_eq(market_inflation(&ctx, &req, &t), 25.0, 1e-9));
    }

    #[test]
    fn predicted_price_includes_pressure() {
        let t = SignalTuning::default();
        assert_eq!(predicted_final_price(0, 40, 0.0, 0, &t), 40);
        assert_eq!(predicted_final_price(0, 40, 10.0, 2, &t), 48);
        assert_eq!(predicted_final_price(0, 40, 0.0, 9, &t), 48);
        assert_eq!(predicted_final_price(60, 40, 0.0, 0, &t), 60);
    }

    #[test]
    fn unfilled_positions_excludes_candidate() {
        let req = RosterRequirements::default();
        let mut team = Team::new("me", "Me", 150);
        team.roster.push(drafted("qb", Position::Quarterback, "BUF", Some(7)));
        team.roster.push(drafted("k", Position::Kicker, "BUF", Some(7)));
        let missing = unfilled_positions(&team, &req, Position::RunningBack);
        assert_eq!(
            missing,
            vec![Position::WideReceiver, Position::TightEnd, Position::Defense]
        );
    }
}
