// End-to-end checks: value a realistic pool, then run the advisor over it.

use chrono::{DateTime, Utc};

use gridbid_core::advisor::{compute_max_bid, Action, AdvisorTuning, BidAdvisor};
use gridbid_core::draft::{
    DraftContext, DraftPick, DraftedPlayer, Position, RosterRequirements, Team,
};
use gridbid_core::valuation::invariants::check_results;
use gridbid_core::valuation::{
    MarketRow, PlayerProjection, Tier, ValuationModel, ValuationResult, ValuationService,
    ValuationSettings,
};

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

fn make_projection(id: &str, position: Position, points: f64) -> PlayerProjection {
    PlayerProjection {
        id: id.to_string(),
        name: format!("Player {id}"),
        position,
        team: "KC".to_string(),
        projected_points: points,
        adp: None,
        bye_week: Some(10),
        market_value: None,
    }
}

/// A 12-team-sized pool with linearly declining projections per position.
fn make_pool() -> Vec<PlayerProjection> {
    let layout: [(Position, &str, usize, f64, f64); 6] = [
        (Position::Quarterback, "qb", 20, 380.0, 8.0),
        (Position::RunningBack, "rb", 45, 300.0, 6.0),
        (Position::WideReceiver, "wr", 50, 290.0, 5.0),
        (Position::TightEnd, "te", 20, 200.0, 7.0),
        (Position::Defense, "dst", 16, 140.0, 3.0),
        (Position::Kicker, "k", 16, 150.0, 2.0),
    ];
    let mut pool = Vec::new();
    for (position, prefix, count, top, step) in layout {
        for i in 0..count {
            pool.push(make_projection(
                &format!("{prefix}{i:02}"),
                position,
                top - step * i as f64,
            ));
        }
    }
    pool
}

fn make_service() -> ValuationService {
    ValuationService::new(ValuationModel::new(12, 200, ValuationSettings::default()))
}

fn make_result(id: &str, position: Position, tier: Tier, value: u32, market: u32) -> ValuationResult {
    ValuationResult {
        id: id.to_string(),
        name: format!("Player {id}"),
        position,
        team: "SF".to_string(),
        bye_week: Some(9),
        projected_points: 250.0,
        adp: Some(5.0),
        position_rank: 1,
        vbd: value as f64,
        tier,
        intrinsic_value: value,
        market_price: market,
        min_bid: value,
        target_bid: value,
        max_bid: value,
        confidence: 0.9,
        advanced: Default::default(),
    }
}

fn drafted(id: &str, position: Position) -> DraftedPlayer {
    DraftedPlayer {
        id: id.to_string(),
        name: id.to_string(),
        position,
        team: "NYG".to_string(),
        bye_week: None,
    }
}

fn make_pick(id: &str, position: Position, team_id: &str, price: u32) -> DraftPick {
    DraftPick {
        player: drafted(id, position),
        price,
        team_id: team_id.to_string(),
        timestamp: DateTime::<Utc>::from_timestamp(1_725_000_000, 0).unwrap(),
    }
}

fn advisor() -> BidAdvisor {
    BidAdvisor::new(AdvisorTuning::default(), RosterRequirements::default())
}

/// Twelve teams, a few picks in, with the valued pool as the available list.
fn make_league_context(available: Vec<ValuationResult>) -> DraftContext {
    let mut ctx = DraftContext::new(Team::new("t01", "Mine", 200), 200);
    for i in 2..=12 {
        ctx.all_teams
            .push(Team::new(format!("t{i:02}"), format!("Team {i}"), 200));
    }
    ctx.available_players = available;
    for (i, (id, position)) in [
        ("x1", Position::RunningBack),
        ("x2", Position::WideReceiver),
        ("x3", Position::Quarterback),
    ]
    .into_iter()
    .enumerate()
    {
        ctx.record_pick(make_pick(id, position, &format!("t{:02}", i + 2), 40));
    }
    ctx
}

fn affordable_bound(team: &Team, requirements: &RosterRequirements) -> u32 {
    let slots = requirements.roster_size() - team.roster.len();
    team.budget_remaining.saturating_sub(slots.saturating_sub(1) as u32)
}

// ---------------------------------------------------------------------------
// Valuation properties
// ---------------------------------------------------------------------------

#[test]
fn tiers_follow_position_rank() {
    let service = make_service();
    let report = service.process_players(&make_pool(), &[], &[]);
    let floor = service.model().settings.tier_value_floor;

    for r in &report.results {
        let expected = Tier::from_rank(r.position_rank, r.intrinsic_value as f64, floor);
        assert_eq!(r.tier, expected, "{} rank {}", r.id, r.position_rank);
    }
    assert!(check_results(&report.results, floor).is_empty());
}

#[test]
fn every_player_worth_at_least_a_dollar() {
    let report = make_service().process_players(&make_pool(), &[], &[]);
    assert!(!report.results.is_empty());
    assert!(report.results.iter().all(|r| r.intrinsic_value >= 1));
    assert!(report.results.iter().all(|r| r.min_bid >= 1 && r.market_price >= 1));
}

#[test]
fn startable_value_matches_league_budget() {
    let report = make_service().process_players(&make_pool(), &[], &[]);
    assert_eq!(report.summary.budget.league_budget, 2400);
    assert!(
        report.summary.budget.within_tolerance,
        "{:.1}%",
        report.summary.budget.percentage
    );
}

#[test]
fn process_players_is_byte_identical() {
    let service = make_service();
    let pool = make_pool();
    let market = vec![MarketRow {
        name: "Player rb00".to_string(),
        position: Position::RunningBack,
        team: "KC".to_string(),
        adp: Some(1.0),
        aav: Some(61.0),
    }];
    let first = serde_json::to_vec(&service.process_players(&pool, &market, &[])).unwrap();
    let second = serde_json::to_vec(&service.process_players(&pool, &market, &[])).unwrap();
    assert_eq!(first, second);
}

#[test]
fn results_do_not_depend_on_input_order() {
    let service = make_service();
    let pool = make_pool();
    let mut reversed = pool.clone();
    reversed.reverse();
    let a = service.process_players(&pool, &[], &[]);
    let b = service.process_players(&reversed, &[], &[]);
    assert_eq!(a.results, b.results);
}

#[test]
fn more_points_never_lowers_value() {
    let service = make_service();
    let mut pool = make_pool();
    let idx = pool.iter().position(|p| p.id == "rb28").unwrap();

    let mut last_vbd = -1.0;
    let mut last_value = 0;
    for bump in 0..40 {
        pool[idx].projected_points = 132.0 + bump as f64 * 5.0;
        let report = service.process_players(&pool, &[], &[]);
        let r = report.results.iter().find(|r| r.id == "rb28").unwrap();
        assert!(r.vbd >= last_vbd, "vbd fell at bump {bump}");
        assert!(r.intrinsic_value >= last_value, "value fell at bump {bump}");
        last_vbd = r.vbd;
        last_value = r.intrinsic_value;
    }
    assert!(last_value > 1);
}

// ---------------------------------------------------------------------------
// Advisor properties
// ---------------------------------------------------------------------------

const BIDS: [u32; 8] = [0, 1, 3, 8, 20, 45, 90, 199];

#[test]
fn max_bid_never_exceeds_affordable() {
    let report = make_service().process_players(&make_pool(), &[], &[]);
    let ctx = make_league_context(report.results.clone());
    let adv = advisor();
    let requirements = RosterRequirements::default();
    let bound = affordable_bound(&ctx.my_team, &requirements);

    for player in report.results.iter().step_by(7) {
        for bid in BIDS {
            let rec = adv.recommend(player, &ctx, bid);
            assert!(rec.max_bid <= bound, "{} at {bid}: {}", player.id, rec.max_bid);
            assert!(rec.max_bid <= rec.strategy.affordable_bid);
        }
    }
}

#[test]
fn bid_above_max_is_always_pass() {
    let report = make_service().process_players(&make_pool(), &[], &[]);
    let ctx = make_league_context(report.results.clone());
    let adv = advisor();

    let mut checked = 0;
    for player in report.results.iter().step_by(5) {
        for bid in BIDS {
            let rec = adv.recommend(player, &ctx, bid);
            if bid > rec.max_bid {
                assert_eq!(rec.action, Action::Pass, "{} at {bid}", player.id);
                checked += 1;
            }
        }
    }
    assert!(checked > 0);
}

#[test]
fn recommend_is_deterministic() {
    let report = make_service().process_players(&make_pool(), &[], &[]);
    let ctx = make_league_context(report.results.clone());
    let adv = advisor();

    for player in report.results.iter().take(10) {
        let a = adv.recommend(player, &ctx, 12);
        let b = adv.recommend(player, &ctx, 12);
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}

#[test]
fn scores_stay_in_range() {
    let report = make_service().process_players(&make_pool(), &[], &[]);
    let ctx = make_league_context(report.results.clone());
    let adv = advisor();

    for player in report.results.iter().step_by(3) {
        for bid in BIDS {
            let rec = adv.recommend(player, &ctx, bid);
            for s in [
                rec.scores.value,
                rec.scores.need,
                rec.scores.scarcity,
                rec.scores.budget,
                rec.composite,
            ] {
                assert!((0.0..=100.0).contains(&s), "{} at {bid}: {s}", player.id);
            }
            assert!((0.1..=1.0).contains(&rec.confidence));
        }
    }
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn scenario_elite_rb_on_empty_roster() {
    let player = make_result("rb-elite", Position::RunningBack, Tier::Elite, 57, 52);
    let mut ctx = DraftContext::new(Team::new("me", "Me", 200), 200);
    ctx.available_players.push(player.clone());

    let rec = advisor().recommend(&player, &ctx, 52);
    assert!(
        matches!(rec.action, Action::StrongBuy | Action::Consider),
        "{:?}: {}",
        rec.action,
        rec.primary_reason
    );
    assert!(rec.max_bid <= 185);
    assert!(rec.max_bid >= 52);
    assert_eq!(rec.strategy.remaining_slots, 16);
}

#[test]
fn scenario_rb_roster_at_max() {
    let player = make_result("rb-t3", Position::RunningBack, Tier::Tier3, 9, 4);
    let mut ctx = DraftContext::new(Team::new("me", "Me", 150), 200);
    for i in 0..6 {
        ctx.my_team
            .roster
            .push(drafted(&format!("rb{i}"), Position::RunningBack));
    }
    ctx.available_players.push(player.clone());

    let adv = advisor();
    for bid in [0, 1, 2, 4, 9, 30] {
        let rec = adv.recommend(&player, &ctx, bid);
        assert_eq!(rec.action, Action::Pass, "bid {bid}");
    }
}

#[test]
fn scenario_position_run_raises_max_bid() {
    let player = make_result("rb-target", Position::RunningBack, Tier::Tier2, 20, 18);
    let mut ctx = DraftContext::new(Team::new("me", "Me", 200), 200);
    for i in 2..=6 {
        ctx.all_teams
            .push(Team::new(format!("t{i}"), format!("Team {i}"), 200));
    }
    ctx.available_players.push(player.clone());
    ctx.available_players
        .push(make_result("rb-other", Position::RunningBack, Tier::Tier2, 18, 15));
    for i in 2..=6 {
        ctx.record_pick(make_pick(
            &format!("rb-gone{i}"),
            Position::RunningBack,
            &format!("t{i}"),
            30,
        ));
    }

    let adv = advisor();
    let inputs = adv.max_bid_inputs(&player, &ctx, 15);
    assert!(inputs.position_run);
    assert!(inputs.need_score > 70.0, "need {}", inputs.need_score);

    let t = &adv.tuning().max_bid;
    let with_run = compute_max_bid(&inputs, t);
    let mut no_run = inputs.clone();
    no_run.position_run = false;
    let without_run = compute_max_bid(&no_run, t);
    assert!(with_run > without_run, "{with_run} vs {without_run}");

    let rec = adv.recommend(&player, &ctx, 15);
    assert_eq!(rec.max_bid, with_run);
    assert!(rec.strategy.position_run);
}

#[test]
fn scenario_position_run_lifts_elite_rb_past_cap() {
    let player = make_result("rb-elite", Position::RunningBack, Tier::Elite, 57, 52);
    let mut ctx = DraftContext::new(Team::new("me", "Me", 200), 200);
    for i in 2..=6 {
        ctx.all_teams
            .push(Team::new(format!("t{i}"), format!("Team {i}"), 200));
    }
    ctx.available_players.push(player.clone());
    ctx.available_players
        .push(make_result("rb-next", Position::RunningBack, Tier::Tier1, 40, 38));
    for i in 2..=6 {
        ctx.record_pick(make_pick(
            &format!("rb-gone{i}"),
            Position::RunningBack,
            &format!("t{i}"),
            30,
        ));
    }

    let adv = advisor();
    let inputs = adv.max_bid_inputs(&player, &ctx, 15);
    assert!(inputs.position_run);
    assert!(inputs.need_score > 70.0, "need {}", inputs.need_score);
    assert!(inputs.positional_cap.is_some());

    let t = &adv.tuning().max_bid;
    let with_run = compute_max_bid(&inputs, t);
    let mut no_run = inputs.clone();
    no_run.position_run = false;
    let without_run = compute_max_bid(&no_run, t);
    assert!(with_run > without_run, "{with_run} vs {without_run}");

    let rec = adv.recommend(&player, &ctx, 15);
    assert_eq!(rec.max_bid, with_run);
    assert!(rec.strategy.positional_cap.unwrap_or(0) >= with_run);
}

#[test]
fn scenario_tight_budget() {
    let player = make_result("k1", Position::Kicker, Tier::Elite, 4, 2);
    let mut team = Team::new("me", "Me", 10);
    for (i, position) in [
        Position::Quarterback,
        Position::RunningBack,
        Position::RunningBack,
        Position::RunningBack,
        Position::RunningBack,
        Position::WideReceiver,
        Position::WideReceiver,
        Position::WideReceiver,
        Position::WideReceiver,
        Position::TightEnd,
        Position::Defense,
    ]
    .into_iter()
    .enumerate()
    {
        team.roster.push(drafted(&format!("p{i}"), position));
    }
    let mut ctx = DraftContext::new(team, 200);
    ctx.available_players.push(player.clone());
    assert_eq!(
        ctx.my_team.remaining_slots(&RosterRequirements::default()),
        5
    );

    let adv = advisor();
    for bid in [7, 8, 10, 25] {
        let rec = adv.recommend(&player, &ctx, bid);
        assert_eq!(rec.scores.budget, 0.0, "bid {bid}");
        assert!(
            matches!(rec.action, Action::Avoid | Action::Pass),
            "bid {bid}: {:?}",
            rec.action
        );
        assert!(rec.max_bid <= 6);
    }
}
