// Command-line parsing and the two commands: `value` and `advise`.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use gridbid_core::advisor::{BidAdvisor, BidRecommendation};
use gridbid_core::config::Config;
use gridbid_core::draft::DraftContext;
use gridbid_core::valuation::invariants::check_results;
use gridbid_core::valuation::{ValuationReport, ValuationService};
use tracing::warn;

use crate::projections::{self, ProjectionError};

#[derive(Debug, Parser)]
#[command(name = "gridbid", about = "Auction valuations and bid advice", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Commands {
    /// Value the configured player pool and print the report (default)
    Value,

    /// Recommend a bid for one player in a saved draft snapshot
    Advise {
        /// Draft context JSON file
        #[arg(value_name = "CONTEXT")]
        context: PathBuf,

        /// Id of a player in the context's available players
        #[arg(value_name = "PLAYER_ID")]
        player_id: String,

        /// Current bid; overrides the snapshot's `current_bid`
        #[arg(value_name = "BID", value_parser = parse_dollars)]
        bid: Option<u32>,
    },
}

impl Cli {
    /// The command to run, `value` when none was given.
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Value)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("failed to read draft context {path}: {source}")]
    ContextIo {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid draft context {path}: {source}")]
    ContextParse {
        path: String,
        source: serde_json::Error,
    },

    #[error("player '{0}' is not in the context's available players")]
    UnknownPlayer(String),

    #[error(transparent)]
    Projection(#[from] ProjectionError),
}

/// Whole-dollar amount, with or without a leading `$`.
fn parse_dollars(raw: &str) -> Result<u32, String> {
    raw.trim()
        .trim_start_matches('$')
        .parse::<u32>()
        .map_err(|_| format!("bid must be a whole dollar amount, got '{raw}'"))
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Load the configured inputs and value the pool.
pub fn value(config: &Config, base_dir: &Path) -> Result<ValuationReport, CommandError> {
    let data = projections::load_all(config, base_dir)?;
    let service = ValuationService::new(config.valuation_model());
    let report = service.process_players(&data.projections, &data.market, &data.advanced);

    for v in check_results(&report.results, config.strategy.valuation.tier_value_floor) {
        warn!("valuation invariant failed for {}: {:?}", v.player_id, v.violation);
    }
    Ok(report)
}

pub fn load_context(path: &Path) -> Result<DraftContext, CommandError> {
    let text = std::fs::read_to_string(path).map_err(|e| CommandError::ContextIo {
        path: path.display().to_string(),
        source: e,
    })?;
    serde_json::from_str(&text).map_err(|e| CommandError::ContextParse {
        path: path.display().to_string(),
        source: e,
    })
}

/// Recommend a bid for `player_id`, which must be in the snapshot's
/// available players.
pub fn advise(
    config: &Config,
    ctx: &DraftContext,
    player_id: &str,
    bid: Option<u32>,
) -> Result<BidRecommendation, CommandError> {
    let player = ctx
        .available_players
        .iter()
        .find(|p| p.id == player_id)
        .ok_or_else(|| CommandError::UnknownPlayer(player_id.to_string()))?;

    let advisor = BidAdvisor::from_config(config);
    Ok(advisor.recommend(player, ctx, bid.unwrap_or(ctx.current_bid)))
}
