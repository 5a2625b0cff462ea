// Configuration loading and parsing (league.toml, strategy.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::advisor::AdvisorTuning;
use crate::draft::{Position, RosterRequirements};
use crate::valuation::{ValuationModel, ValuationSettings};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub league: LeagueConfig,
    pub strategy: StrategyConfig,
    pub data_paths: DataPaths,
}

impl Config {
    /// Valuation model for this league and strategy.
    pub fn valuation_model(&self) -> ValuationModel {
        ValuationModel::new(
            self.league.num_teams,
            self.league.budget_per_team,
            self.strategy.valuation.clone(),
        )
    }
}

// ---------------------------------------------------------------------------
// league.toml structs
// ---------------------------------------------------------------------------

/// Wrapper for the top-level `[league]` table in league.toml.
#[derive(Debug, Clone, Deserialize)]
struct LeagueFile {
    league: LeagueConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LeagueConfig {
    pub name: String,
    pub num_teams: usize,
    /// Auction budget each team starts with.
    pub budget_per_team: u32,
    #[serde(default)]
    pub roster: RosterRequirements,
}

impl Default for LeagueConfig {
    fn default() -> Self {
        LeagueConfig {
            name: "Auction League".into(),
            num_teams: 12,
            budget_per_team: 200,
            roster: RosterRequirements::default(),
        }
    }
}

impl LeagueConfig {
    pub fn total_budget(&self) -> u32 {
        self.num_teams as u32 * self.budget_per_team
    }
}

// ---------------------------------------------------------------------------
// strategy.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire strategy.toml file.
#[derive(Debug, Clone, Deserialize)]
struct StrategyFile {
    #[serde(default)]
    valuation: ValuationSettings,
    #[serde(default)]
    advisor: AdvisorTuning,
    data_paths: DataPaths,
}

/// The public strategy config assembled from the strategy.toml sections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrategyConfig {
    pub valuation: ValuationSettings,
    pub advisor: AdvisorTuning,
}

/// Input files, relative to the working directory.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DataPaths {
    pub projections: String,
    #[serde(default)]
    pub market: Option<String>,
    #[serde(default)]
    pub advanced: Option<String>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/league.toml` and
/// `config/strategy.toml`, relative to the given `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy defaults.
/// Prefer `load_config()` which handles default initialization automatically.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- league.toml (required) ---
    let league_path = config_dir.join("league.toml");
    let league_text = read_file(&league_path)?;
    let league_file: LeagueFile =
        toml::from_str(&league_text).map_err(|e| ConfigError::ParseError {
            path: league_path.clone(),
            source: e,
        })?;

    // --- strategy.toml (required) ---
    let strategy_path = config_dir.join("strategy.toml");
    let strategy_text = read_file(&strategy_path)?;
    let strategy_file: StrategyFile =
        toml::from_str(&strategy_text).map_err(|e| ConfigError::ParseError {
            path: strategy_path.clone(),
            source: e,
        })?;

    let config = Config {
        league: league_file.league,
        strategy: StrategyConfig {
            valuation: strategy_file.valuation,
            advisor: strategy_file.advisor,
        },
        data_paths: strategy_file.data_paths,
    };

    validate(&config)?;

    Ok(config)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the project root or ensure defaults/ is present",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    // Sorted so the returned list does not depend on directory order.
    let mut sources = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        sources.push(entry.path());
    }
    sources.sort();

    let mut copied = Vec::new();
    for path in sources {
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }
        let target = config_dir.join(file_name);

        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(mut dest) => {
                let content = std::fs::read(&path).map_err(|e| ConfigError::DefaultsCopyError {
                    message: format!("failed to read {}: {e}", path.display()),
                })?;
                std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                    ConfigError::DefaultsCopyError {
                        message: format!("failed to write {}: {e}", target.display()),
                    }
                })?;
                copied.push(target);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                // Keep the user's edited copy.
            }
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                });
            }
        }
    }

    Ok(copied)
}

/// Convenience wrapper: loads config relative to the current working directory.
/// Ensures default config files are copied before loading.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn invalid(field: impl Into<String>, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub fn validate(config: &Config) -> Result<(), ConfigError> {
    let league = &config.league;
    if league.num_teams == 0 {
        return Err(invalid("league.num_teams", "must be greater than 0"));
    }
    if league.budget_per_team == 0 {
        return Err(invalid("league.budget_per_team", "must be greater than 0"));
    }

    validate_roster(&league.roster)?;

    let roster_size = league.roster.roster_size();
    if (league.budget_per_team as usize) < roster_size {
        return Err(invalid(
            "league.budget_per_team",
            format!(
                "must cover $1 for each of the {roster_size} roster slots, got {}",
                league.budget_per_team
            ),
        ));
    }

    validate_valuation(&config.strategy.valuation)?;
    config.strategy.advisor.validate()?;

    if config.data_paths.projections.trim().is_empty() {
        return Err(invalid("data_paths.projections", "must not be empty"));
    }

    Ok(())
}

fn validate_roster(roster: &RosterRequirements) -> Result<(), ConfigError> {
    if roster.positions.is_empty() {
        return Err(invalid("league.roster.positions", "at least one position required"));
    }
    for (pos, limits) in &roster.positions {
        let field = format!("league.roster.positions.{pos}");
        if !pos.is_known() {
            return Err(invalid(field, "unknown position key"));
        }
        if limits.max == 0 {
            return Err(invalid(field, "max must be greater than 0"));
        }
        if !(limits.min <= limits.optimal && limits.optimal <= limits.max) {
            return Err(invalid(
                field,
                format!(
                    "expected min <= optimal <= max, got {}/{}/{}",
                    limits.min, limits.optimal, limits.max
                ),
            ));
        }
    }
    if roster
        .flex
        .eligible_positions
        .iter()
        .any(|p| *p == Position::Unknown)
    {
        return Err(invalid(
            "league.roster.flex.eligible_positions",
            "unknown position",
        ));
    }
    if roster.flex.count > 0 && roster.flex.eligible_positions.is_empty() {
        return Err(invalid(
            "league.roster.flex.eligible_positions",
            "must list at least one position when flex.count > 0",
        ));
    }
    Ok(())
}

fn validate_valuation(settings: &ValuationSettings) -> Result<(), ConfigError> {
    for (pos, &count) in &settings.startable_per_team {
        let field = format!("valuation.startable_per_team.{pos}");
        if !pos.is_known() {
            return Err(invalid(field, "unknown position key"));
        }
        if !(count >= 0.0 && count.is_finite()) {
            return Err(invalid(field, format!("must be >= 0, got {count}")));
        }
    }
    if !(settings.bid_band_low > 0.0 && settings.bid_band_low <= 1.0) {
        return Err(invalid(
            "valuation.bid_band_low",
            format!("must be in (0, 1], got {}", settings.bid_band_low),
        ));
    }
    if settings.bid_band_high < 1.0 {
        return Err(invalid(
            "valuation.bid_band_high",
            format!("must be >= 1.0, got {}", settings.bid_band_high),
        ));
    }
    if !(0.0..=1.0).contains(&settings.default_market_fraction) {
        return Err(invalid(
            "valuation.default_market_fraction",
            format!("must be between 0.0 and 1.0, got {}", settings.default_market_fraction),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
