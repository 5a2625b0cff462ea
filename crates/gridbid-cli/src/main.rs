// gridbid entry point.
//
// 1. Parse arguments (clap)
// 2. Initialize tracing (stderr, so stdout stays machine-readable JSON)
// 3. Load config (copying defaults on first run)
// 4. Run the command and print its JSON output

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use gridbid_cli::commands::{self, Cli, Commands};
use gridbid_core::config;
use tracing::{error, info};

const DEFAULT_LOG_FILTER: &str = "gridbid=info,gridbid_core=info,gridbid_cli=info,warn";

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing() {
        eprintln!("failed to initialize logging: {e:#}");
        return ExitCode::FAILURE;
    }

    match run(cli.command()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> anyhow::Result<()> {
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "config loaded: league={}, {} teams, ${} per team",
        config.league.name, config.league.num_teams, config.league.budget_per_team
    );
    let base_dir = std::env::current_dir().context("failed to resolve working directory")?;

    let json = match command {
        Commands::Value => {
            let report =
                commands::value(&config, &base_dir).context("failed to value player pool")?;
            serde_json::to_string_pretty(&report)?
        }
        Commands::Advise {
            context,
            player_id,
            bid,
        } => {
            let ctx = commands::load_context(&context)?;
            let rec = commands::advise(&config, &ctx, &player_id, bid)?;
            info!(
                "{}: {} (max ${})",
                rec.player_name,
                rec.action.label(),
                rec.max_bid
            );
            serde_json::to_string_pretty(&rec)?
        }
    };
    println!("{json}");
    Ok(())
}

/// Log to stderr; `RUST_LOG` overrides the default filter.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
