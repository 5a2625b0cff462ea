// Projection, market and advanced-stat CSV loading.
//
// Every loader is lenient row by row: malformed or non-finite rows are
// skipped with a warning so one bad line never sinks a whole file. Only I/O
// failures and an empty projection file are errors.

use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::Path;

use gridbid_core::config::{Config, DataPaths};
use gridbid_core::draft::Position;
use gridbid_core::valuation::normalize::player_key;
use gridbid_core::valuation::{AdvancedStatsRow, MarketRow, PlayerProjection};
use serde::Deserialize;
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Everything the valuation service needs, loaded from disk.
#[derive(Debug, Clone, Default)]
pub struct InputData {
    pub projections: Vec<PlayerProjection>,
    pub market: Vec<MarketRow>,
    pub advanced: Vec<AdvancedStatsRow>,
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ProjectionError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("validation error: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Raw CSV serde structs (private)
// ---------------------------------------------------------------------------

/// Projection row. Header names vary between sites, hence the aliases.
#[derive(Debug, Deserialize)]
struct RawProjection {
    #[serde(default)]
    id: String,
    #[serde(alias = "Name", alias = "Player")]
    name: String,
    #[serde(alias = "Pos", alias = "POS", alias = "Position")]
    position: String,
    #[serde(default, alias = "Team")]
    team: String,
    #[serde(alias = "FPTS", alias = "Points", alias = "projected_points")]
    points: f64,
    #[serde(default, alias = "ADP")]
    adp: Option<f64>,
    #[serde(default, alias = "Bye", alias = "bye_week")]
    bye: Option<u8>,
    #[serde(default, alias = "AAV")]
    aav: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawMarket {
    #[serde(alias = "Name", alias = "Player")]
    name: String,
    #[serde(alias = "Pos", alias = "POS", alias = "Position")]
    position: String,
    #[serde(default, alias = "Team")]
    team: String,
    #[serde(default, alias = "ADP")]
    adp: Option<f64>,
    #[serde(default, alias = "AAV")]
    aav: Option<f64>,
}

/// Advanced-stat row: identity columns plus any number of stat columns.
#[derive(Debug, Deserialize)]
struct RawAdvanced {
    #[serde(alias = "Name", alias = "Player")]
    name: String,
    #[serde(alias = "Pos", alias = "POS", alias = "Position")]
    position: String,
    #[serde(flatten)]
    stats: HashMap<String, serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn finite_or_none(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

fn parse_position(raw: &str, name: &str) -> Position {
    let position = Position::parse_lenient(raw);
    if !position.is_known() {
        warn!("unrecognized position '{}' for '{}'", raw.trim(), name);
    }
    position
}

fn stat_value(value: &serde_json::Value) -> Option<f64> {
    let v = match value {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    v.is_finite().then_some(v)
}

// ---------------------------------------------------------------------------
// Reader-based loaders
// ---------------------------------------------------------------------------

pub fn load_projections_from_reader<R: Read>(
    rdr: R,
) -> Result<Vec<PlayerProjection>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut projections = Vec::new();
    for result in reader.deserialize::<RawProjection>() {
        match result {
            Ok(raw) => {
                let name = raw.name.trim().to_string();
                if name.is_empty() {
                    warn!("skipping projection row with no player name");
                    continue;
                }
                if !raw.points.is_finite() {
                    warn!("skipping projection for '{}': non-finite points", name);
                    continue;
                }
                let position = parse_position(&raw.position, &name);
                let id = match raw.id.trim() {
                    "" => player_key(&name, position),
                    id => id.to_string(),
                };
                projections.push(PlayerProjection {
                    id,
                    name,
                    position,
                    team: raw.team.trim().to_string(),
                    projected_points: raw.points,
                    adp: finite_or_none(raw.adp),
                    bye_week: raw.bye,
                    market_value: finite_or_none(raw.aav),
                });
            }
            Err(e) => {
                warn!("skipping malformed projection row: {}", e);
            }
        }
    }
    Ok(projections)
}

pub fn load_market_from_reader<R: Read>(rdr: R) -> Result<Vec<MarketRow>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut rows = Vec::new();
    for result in reader.deserialize::<RawMarket>() {
        match result {
            Ok(raw) => {
                let name = raw.name.trim().to_string();
                let adp = finite_or_none(raw.adp);
                let aav = finite_or_none(raw.aav);
                if adp.is_none() && aav.is_none() {
                    warn!("skipping market row for '{}': no ADP or AAV", name);
                    continue;
                }
                rows.push(MarketRow {
                    position: parse_position(&raw.position, &name),
                    name,
                    team: raw.team.trim().to_string(),
                    adp,
                    aav,
                });
            }
            Err(e) => {
                warn!("skipping malformed market row: {}", e);
            }
        }
    }
    Ok(rows)
}

pub fn load_advanced_from_reader<R: Read>(rdr: R) -> Result<Vec<AdvancedStatsRow>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut rows = Vec::new();
    for result in reader.deserialize::<RawAdvanced>() {
        match result {
            Ok(raw) => {
                let name = raw.name.trim().to_string();
                let stats: BTreeMap<String, f64> = raw
                    .stats
                    .iter()
                    .filter_map(|(k, v)| stat_value(v).map(|v| (k.trim().to_string(), v)))
                    .collect();
                rows.push(AdvancedStatsRow {
                    position: parse_position(&raw.position, &name),
                    name,
                    stats,
                });
            }
            Err(e) => {
                warn!("skipping malformed advanced-stat row: {}", e);
            }
        }
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Public path-based loaders
// ---------------------------------------------------------------------------

fn open(path: &Path) -> Result<std::fs::File, ProjectionError> {
    std::fs::File::open(path).map_err(|e| ProjectionError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

fn csv_error(path: &Path) -> impl FnOnce(csv::Error) -> ProjectionError + '_ {
    move |e| ProjectionError::Csv {
        path: path.display().to_string(),
        source: e,
    }
}

pub fn load_projections(path: &Path) -> Result<Vec<PlayerProjection>, ProjectionError> {
    load_projections_from_reader(open(path)?).map_err(csv_error(path))
}

pub fn load_market(path: &Path) -> Result<Vec<MarketRow>, ProjectionError> {
    load_market_from_reader(open(path)?).map_err(csv_error(path))
}

pub fn load_advanced(path: &Path) -> Result<Vec<AdvancedStatsRow>, ProjectionError> {
    load_advanced_from_reader(open(path)?).map_err(csv_error(path))
}

/// Load all input data using paths from the config, resolved against
/// `base_dir`.
pub fn load_all(config: &Config, base_dir: &Path) -> Result<InputData, ProjectionError> {
    load_all_from_paths(&config.data_paths, base_dir)
}

/// Load all input data from explicit paths. Market and advanced files are
/// optional.
pub fn load_all_from_paths(paths: &DataPaths, base_dir: &Path) -> Result<InputData, ProjectionError> {
    let projections = load_projections(&base_dir.join(&paths.projections))?;
    if projections.is_empty() {
        return Err(ProjectionError::Validation(
            "projection CSV produced zero valid rows".into(),
        ));
    }
    let market = match &paths.market {
        Some(p) => load_market(&base_dir.join(p))?,
        None => Vec::new(),
    };
    let advanced = match &paths.advanced {
        Some(p) => load_advanced(&base_dir.join(p))?,
        None => Vec::new(),
    };
    info!(
        "loaded {} projections, {} market rows, {} advanced rows",
        projections.len(),
        market.len(),
        advanced.len()
    );
    Ok(InputData {
        projections,
        market,
        advanced,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
