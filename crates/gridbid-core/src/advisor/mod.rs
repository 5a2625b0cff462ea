// Bid advisor: turns a draft snapshot and a candidate player into a scored,
// explained recommendation with a hard maximum bid.
//
// The advisor holds only static configuration (tuning table and default
// roster requirements). `recommend` is a pure function of its arguments and
// always produces a recommendation, whatever the input quality.

pub mod max_bid;
pub mod recommendation;
pub mod scores;
pub mod signals;
pub mod tuning;

use tracing::debug;

pub use max_bid::{compute_max_bid, effective_positional_cap, positional_cap, MaxBidInputs};
pub use recommendation::{
    Action, Alternative, BidRecommendation, Competitor, DraftStage, MarketProjection,
    StrategySignals, SubScores,
};
pub use tuning::{AdvisorTuning, TUNING_VERSION};

use crate::config::Config;
use crate::draft::{DraftContext, Position, PositionLimits, RosterRequirements};
use crate::valuation::ValuationResult;

/// Everything derived from one (player, context, bid) triple.
#[derive(Debug, Clone)]
struct Analysis {
    limits: Option<PositionLimits>,
    count: usize,
    current_bid: u32,
    effective_bid: u32,
    bid_synthesized: bool,
    remaining_slots: usize,
    scores: SubScores,
    max_bid_inputs: MaxBidInputs,
    competitors: Vec<Competitor>,
    unfilled_elsewhere: Vec<Position>,
    bye_warnings: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct BidAdvisor {
    tuning: AdvisorTuning,
    default_requirements: RosterRequirements,
}

impl BidAdvisor {
    pub fn new(tuning: AdvisorTuning, default_requirements: RosterRequirements) -> Self {
        BidAdvisor {
            tuning,
            default_requirements,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.strategy.advisor.clone(),
            config.league.roster.clone(),
        )
    }

    pub fn tuning(&self) -> &AdvisorTuning {
        &self.tuning
    }

    /// Recommend what to do about `player` at `current_bid`.
    ///
    /// `current_bid` of 0 means no bid is on the table yet; the scores are
    /// then computed against an assumed opening bid.
    pub fn recommend(
        &self,
        player: &ValuationResult,
        ctx: &DraftContext,
        current_bid: u32,
    ) -> BidRecommendation {
        let a = self.analyze(player, ctx, current_bid);
        let t = &self.tuning;

        let max_bid = compute_max_bid(&a.max_bid_inputs, &t.max_bid);
        let composite = a.scores.composite(&t.weights);
        let (action, reason) = self.determine_action(player, &a, max_bid, composite);

        let (warnings, opportunities) = self.narrative(player, &a, max_bid);
        let confidence = self.confidence(player, &a);

        let predicted_final_price = signals::predicted_final_price(
            current_bid,
            player.market_price,
            a.max_bid_inputs.inflation_pct,
            a.competitors.len(),
            &t.signals,
        );

        let alternatives = signals::find_alternatives(player, &ctx.available_players, &t.signals);

        debug!(
            "recommend {} ({}) at ${}: {} max ${} composite {:.1} [v{:.0} n{:.0} s{:.0} b{:.0}]",
            player.name,
            player.position,
            a.effective_bid,
            action.label(),
            max_bid,
            composite,
            a.scores.value,
            a.scores.need,
            a.scores.scarcity,
            a.scores.budget,
        );

        BidRecommendation {
            player_id: player.id.clone(),
            player_name: player.name.clone(),
            action,
            max_bid,
            confidence,
            scores: a.scores,
            composite,
            primary_reason: reason,
            warnings,
            opportunities,
            market: MarketProjection {
                inflation_pct: a.max_bid_inputs.inflation_pct,
                predicted_final_price,
                likely_competitors: a.competitors.clone(),
            },
            strategy: StrategySignals {
                draft_stage: a.max_bid_inputs.stage,
                position_run: a.max_bid_inputs.position_run,
                panic_level: a.max_bid_inputs.panic_level,
                stack_synergy_pct: a.max_bid_inputs.stack_synergy_pct,
                effective_bid: a.effective_bid,
                bid_synthesized: a.bid_synthesized,
                affordable_bid: a.max_bid_inputs.affordable,
                positional_cap: effective_positional_cap(&a.max_bid_inputs, &t.max_bid)
                    .map(|cap| cap.floor().max(0.0) as u32),
                remaining_slots: a.remaining_slots,
            },
            alternatives,
            tuning_version: t.version,
        }
    }

    /// The max-bid chain inputs `recommend` would use for this triple.
    pub fn max_bid_inputs(
        &self,
        player: &ValuationResult,
        ctx: &DraftContext,
        current_bid: u32,
    ) -> MaxBidInputs {
        self.analyze(player, ctx, current_bid).max_bid_inputs
    }

    // -----------------------------------------------------------------------
    // Analysis
    // -----------------------------------------------------------------------

    fn analyze(&self, player: &ValuationResult, ctx: &DraftContext, current_bid: u32) -> Analysis {
        let t = &self.tuning;
        let requirements = ctx
            .roster_requirements
            .as_ref()
            .unwrap_or(&self.default_requirements);
        let team = &ctx.my_team;
        let position = player.position;

        let limits = requirements.limits(position);
        let count = team.position_count(position);
        let remaining_slots = team.remaining_slots(requirements);
        let affordable = team.max_affordable_bid(requirements);

        let (effective_bid, bid_synthesized) =
            scores::effective_bid(current_bid, player.market_price, &t.value);

        let teams = ctx.league_teams();
        let scores = SubScores {
            value: scores::value_score(player.intrinsic_value, effective_bid, &t.value),
            need: scores::need_score(
                count,
                limits,
                requirements.is_flex_eligible(position),
                player.tier,
                &t.need,
            ),
            scarcity: scores::scarcity_score(
                player,
                &ctx.available_players,
                &teams,
                requirements,
                &t.scarcity,
            ),
            budget: scores::budget_score(
                effective_bid,
                affordable,
                remaining_slots,
                team.dollars_per_slot(requirements),
                player.tier,
                &t.budget,
            ),
        };

        let max_bid_inputs = MaxBidInputs {
            intrinsic_value: player.intrinsic_value,
            tier: player.tier,
            inflation_pct: signals::market_inflation(ctx, requirements, &t.max_bid),
            need_score: scores.need,
            scarcity_score: scores.scarcity,
            stack_synergy_pct: signals::team_stack_synergy(team, player, &t.max_bid),
            position_run: signals::detect_position_run(&ctx.draft_history, position, &t.signals),
            panic_level: signals::panic_level(
                count,
                limits,
                position,
                &ctx.available_players,
                &t.signals,
            ),
            stage: signals::draft_stage(ctx, requirements, &t.signals),
            affordable,
            positional_cap: positional_cap(
                position,
                remaining_slots,
                ctx.draft_history.len(),
                &t.caps,
            ),
        };

        Analysis {
            limits,
            count,
            current_bid,
            effective_bid,
            bid_synthesized,
            remaining_slots,
            scores,
            max_bid_inputs,
            competitors: signals::find_competitors(ctx, player, requirements, &t.signals),
            unfilled_elsewhere: signals::unfilled_positions(team, requirements, position),
            bye_warnings: signals::bye_week_warnings(team, player, &t.signals),
        }
    }

    // -----------------------------------------------------------------------
    // Action
    // -----------------------------------------------------------------------

    /// Hard limits first (bid above max, maxed roster, other holes to fill),
    /// then the composite thresholds.
    fn determine_action(
        &self,
        player: &ValuationResult,
        a: &Analysis,
        max_bid: u32,
        composite: f64,
    ) -> (Action, String) {
        let th = &self.tuning.actions;
        let s = &a.scores;

        if a.current_bid > max_bid {
            return (
                Action::Pass,
                format!(
                    "Current bid ${} is above max bid ${max_bid} for {}",
                    a.current_bid, player.name
                ),
            );
        }

        if let Some(limits) = a.limits {
            if a.count >= limits.max && player.tier.level() > th.maxed_roster_tier_level {
                return (
                    Action::Pass,
                    format!(
                        "Roster already holds the maximum {} {}; {} is not an upgrade",
                        limits.max, player.position, player.tier
                    ),
                );
            }
        }

        let candidate_unfilled = a.limits.is_some_and(|l| a.count < l.min);
        if !a.unfilled_elsewhere.is_empty()
            && !candidate_unfilled
            && s.budget < th.unfilled_budget_below
            && s.need < th.unfilled_need_below
        {
            let holes: Vec<String> = a.unfilled_elsewhere.iter().map(|p| p.to_string()).collect();
            return (
                Action::Avoid,
                format!("Save budget to fill {} first", holes.join(", ")),
            );
        }

        let action = if composite >= th.strong_buy_composite
            || (s.value >= th.strong_buy_value && s.need >= th.strong_buy_need)
        {
            Action::StrongBuy
        } else if composite >= th.consider_composite
            || (s.value >= th.consider_value && s.budget >= th.consider_budget)
        {
            Action::Consider
        } else if composite >= th.avoid_composite {
            Action::Avoid
        } else {
            Action::Pass
        };

        let reason = match action {
            Action::StrongBuy => format!(
                "{} at ${} fills a {} with value ${} (score {composite:.0})",
                player.name,
                a.effective_bid,
                describe_need(s.need),
                player.intrinsic_value
            ),
            Action::Consider => format!(
                "{} is a reasonable buy up to ${max_bid} (score {composite:.0})",
                player.name
            ),
            Action::Avoid => format!(
                "{} at ${} is marginal for this roster (score {composite:.0})",
                player.name, a.effective_bid
            ),
            Action::Pass => format!(
                "{} does not fit this roster at ${} (score {composite:.0})",
                player.name, a.effective_bid
            ),
        };
        (action, reason)
    }

    // -----------------------------------------------------------------------
    // Narrative and confidence
    // -----------------------------------------------------------------------

    fn narrative(
        &self,
        player: &ValuationResult,
        a: &Analysis,
        max_bid: u32,
    ) -> (Vec<String>, Vec<String>) {
        let t = &self.tuning;
        let inputs = &a.max_bid_inputs;
        let mut warnings = Vec::new();
        let mut opportunities = Vec::new();

        if !player.position.is_known() {
            warnings.push("Unrecognized position; need and scarcity are neutral".to_string());
        } else if a.limits.is_none() {
            warnings.push(format!(
                "No roster requirement for {}; need score is neutral",
                player.position
            ));
        }
        if a.bid_synthesized {
            warnings.push(format!(
                "No bid on the table; scored against an opening bid of ${}",
                a.effective_bid
            ));
        }
        if a.effective_bid > inputs.affordable {
            warnings.push(format!(
                "Bid ${} exceeds the most you can afford (${})",
                a.effective_bid, inputs.affordable
            ));
        }
        if let Some(cap) = effective_positional_cap(inputs, &t.max_bid) {
            if max_bid as f64 >= cap.floor() && cap < inputs.affordable as f64 {
                warnings.push(format!(
                    "Max bid held to the {} ceiling of ${}",
                    player.position,
                    cap.floor()
                ));
            }
        }
        if inputs.position_run {
            warnings.push(format!(
                "{} run in progress; prices at the position are climbing",
                player.position
            ));
        }
        if inputs.panic_level > t.max_bid.panic_threshold {
            warnings.push(format!(
                "Few quality {}s left for your open starting spots (panic {:.2})",
                player.position, inputs.panic_level
            ));
        }
        if inputs.inflation_pct > 10.0 {
            warnings.push(format!(
                "Market running hot: prices {:+.0}% over value",
                inputs.inflation_pct
            ));
        }
        warnings.extend(a.bye_warnings.iter().cloned());

        if player.edge() > 0 {
            opportunities.push(format!(
                "Market price ${} is ${} below value",
                player.market_price,
                player.edge()
            ));
        }
        if a.effective_bid <= player.min_bid {
            opportunities.push(format!(
                "Bid is at or below the low end of the ${}-${} band",
                player.min_bid, player.max_bid
            ));
        }
        if inputs.stack_synergy_pct > 0.0 {
            opportunities.push(format!(
                "Stacks with your {} players (+{:.0}%)",
                player.team, inputs.stack_synergy_pct
            ));
        }
        if inputs.inflation_pct < -10.0 {
            opportunities.push(format!(
                "Market deflated ({:+.0}%); bargains available",
                inputs.inflation_pct
            ));
        }
        if a.competitors.is_empty() && player.position.is_known() {
            opportunities.push("No other team both needs and can afford this player".to_string());
        }
        if inputs.stage == DraftStage::Late && player.tier.level() <= 2 {
            opportunities.push("Late-draft quality; worth stretching for".to_string());
        }

        (warnings, opportunities)
    }

    fn confidence(&self, player: &ValuationResult, a: &Analysis) -> f64 {
        let mut confidence: f64 = 0.85;
        if !player.position.is_known() {
            confidence -= 0.25;
        } else if a.limits.is_none() {
            confidence -= 0.15;
        }
        if a.bid_synthesized {
            confidence -= 0.1;
        }
        confidence.clamp(0.1, 1.0)
    }
}

fn describe_need(need: f64) -> &'static str {
    match need {
        n if n >= 90.0 => "pressing need",
        n if n >= 60.0 => "real need",
        n if n >= 35.0 => "depth need",
        _ => "luxury spot",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::{DraftedPlayer, Team};
    use crate::valuation::Tier;
    use std::collections::BTreeMap;

    fn make_player(id: &str, position: Position, tier: Tier, value: u32, market: u32) -> ValuationResult {
        ValuationResult {
            id: id.into(),
            name: format!("Player {id}"),
            position,
            team: "CIN".into(),
            bye_week: Some(12),
            projected_points: 200.0,
            adp: Some(10.0),
            position_rank: 1,
            vbd: value as f64,
            tier,
            intrinsic_value: value,
            market_price: market,
            min_bid: value,
            target_bid: value,
            max_bid: value,
            confidence: 0.9,
            advanced: BTreeMap::new(),
        }
    }

    fn drafted(id: &str, position: Position) -> DraftedPlayer {
        DraftedPlayer {
            id: id.into(),
            name: id.into(),
            position,
            team: "ATL".into(),
            bye_week: None,
        }
    }

    fn advisor() -> BidAdvisor {
        BidAdvisor::new(AdvisorTuning::default(), RosterRequirements::default())
    }

    fn solo_context(budget: u32) -> DraftContext {
        DraftContext::new(Team::new("me", "Me", budget), 200)
    }

    #[test]
    fn bid_above_max_always_passes() {
        let adv = advisor();
        let player = make_player("rb", Position::RunningBack, Tier::Elite, 57, 52);
        let mut ctx = solo_context(200);
        ctx.available_players.push(player.clone());
        let rec = adv.recommend(&player, &ctx, 150);
        assert!(rec.max_bid < 150);
        assert_eq!(rec.action, Action::Pass);
        assert!(rec.primary_reason.contains("above max bid"));
    }

    #[test]
    fn roster_max_override() {
        let adv = advisor();
        let player = make_player("rb7", Position::RunningBack, Tier::Tier3, 8, 6);
        let mut ctx = solo_context(120);
        for i in 0..6 {
            ctx.my_team.roster.push(drafted(&format!("rb{i}"), Position::RunningBack));
        }
        ctx.available_players.push(player.clone());
        let rec = adv.recommend(&player, &ctx, 1);
        assert_eq!(rec.action, Action::Pass);
        assert!(rec.primary_reason.contains("maximum"));
    }

    #[test]
    fn other_holes_override_to_avoid() {
        let adv = advisor();
        // Three RBs rostered (min met), QB/WR/TE/DST/K all missing.
        let player = make_player("rb4", Position::RunningBack, Tier::Tier3, 9, 8);
        let mut ctx = solo_context(60);
        for i in 1..=3 {
            ctx.my_team.roster.push(drafted(&format!("rb{i}"), Position::RunningBack));
        }
        ctx.available_players.push(player.clone());
        // 13 slots, $60 -> $4.62/slot; $9 is ~1.95x that -> budget score 25.
        let rec = adv.recommend(&player, &ctx, 9);
        assert!(rec.scores.budget < 50.0);
        assert!(rec.scores.need < 70.0);
        assert_eq!(rec.action, Action::Avoid);
        assert!(rec.primary_reason.contains("QB"));
    }

    #[test]
    fn synthesized_bid_lowers_confidence_and_warns() {
        let adv = advisor();
        let player = make_player("wr", Position::WideReceiver, Tier::Tier1, 30, 28);
        let mut ctx = solo_context(200);
        ctx.available_players.push(player.clone());
        let rec = adv.recommend(&player, &ctx, 0);
        assert!(rec.strategy.bid_synthesized);
        assert_eq!(rec.strategy.effective_bid, 14);
        assert!((rec.confidence - 0.75).abs() < 1e-9);
        assert!(rec.warnings.iter().any(|w| w.contains("opening bid")));
    }

    #[test]
    fn unknown_position_is_neutral_not_fatal() {
        let adv = advisor();
        let player = make_player("x", Position::Unknown, Tier::Tier2, 10, 8);
        let mut ctx = solo_context(200);
        ctx.available_players.push(player.clone());
        let rec = adv.recommend(&player, &ctx, 8);
        assert!((rec.scores.need - 50.0).abs() < 1e-9);
        assert!((rec.scores.scarcity - 50.0).abs() < 1e-9);
        assert!((rec.confidence - 0.6).abs() < 1e-9);
        assert!(rec.strategy.positional_cap.is_none());
        assert!(rec.max_bid <= rec.strategy.affordable_bid);
    }

    #[test]
    fn context_requirements_override_defaults() {
        let adv = advisor();
        let player = make_player("k", Position::Kicker, Tier::Tier2, 2, 1);
        let mut ctx = solo_context(200);
        let mut req = RosterRequirements::default();
        req.positions.remove(&Position::Kicker);
        ctx.roster_requirements = Some(req);
        ctx.available_players.push(player.clone());
        let rec = adv.recommend(&player, &ctx, 1);
        assert!((rec.scores.need - 50.0).abs() < 1e-9);
        assert!(rec.warnings.iter().any(|w| w.contains("No roster requirement")));
    }

    #[test]
    fn alternatives_exclude_candidate() {
        let adv = advisor();
        let player = make_player("wr1", Position::WideReceiver, Tier::Tier1, 30, 28);
        let mut ctx = solo_context(200);
        ctx.available_players.push(player.clone());
        ctx.available_players
            .push(make_player("wr2", Position::WideReceiver, Tier::Tier1, 27, 20));
        let rec = adv.recommend(&player, &ctx, 25);
        assert_eq!(rec.alternatives.len(), 1);
        assert_eq!(rec.alternatives[0].id, "wr2");
        assert_eq!(rec.tuning_version, TUNING_VERSION);
    }

    #[test]
    fn describe_need_buckets() {
        assert_eq!(describe_need(100.0), "pressing need");
        assert_eq!(describe_need(75.0), "real need");
        assert_eq!(describe_need(40.0), "depth need");
        assert_eq!(describe_need(10.0), "luxury spot");
    }
}
