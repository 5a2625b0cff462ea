// Positions and individual pick representation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Football positions used for valuation buckets and roster requirements.
///
/// `Unknown` absorbs any position string the parser does not recognize so that
/// a bad record degrades to neutral scoring instead of failing the draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Position {
    Quarterback,
    RunningBack,
    WideReceiver,
    TightEnd,
    Defense,
    Kicker,
    Unknown,
}

/// Every concrete (draftable) position, in display order.
pub const DRAFTABLE_POSITIONS: &[Position] = &[
    Position::Quarterback,
    Position::RunningBack,
    Position::WideReceiver,
    Position::TightEnd,
    Position::Defense,
    Position::Kicker,
];

impl Position {
    /// Parse a position string into a Position enum.
    ///
    /// Accepts the usual site spellings:
    /// - "DST", "D/ST", "DEF", "D" -> Defense
    /// - "PK" -> Kicker
    pub fn from_str_pos(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "QB" => Some(Position::Quarterback),
            "RB" | "HB" => Some(Position::RunningBack),
            "WR" => Some(Position::WideReceiver),
            "TE" => Some(Position::TightEnd),
            "DST" | "D/ST" | "DEF" | "D" => Some(Position::Defense),
            "K" | "PK" => Some(Position::Kicker),
            _ => None,
        }
    }

    /// Parse leniently: anything unrecognized lands in the `Unknown` bucket.
    pub fn parse_lenient(s: &str) -> Self {
        Self::from_str_pos(s).unwrap_or(Position::Unknown)
    }

    /// Return the display string for this position.
    pub fn display_str(&self) -> &'static str {
        match self {
            Position::Quarterback => "QB",
            Position::RunningBack => "RB",
            Position::WideReceiver => "WR",
            Position::TightEnd => "TE",
            Position::Defense => "DST",
            Position::Kicker => "K",
            Position::Unknown => "UNKNOWN",
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Position::Unknown)
    }

    /// Pass catchers that pair with a quarterback for stacking purposes.
    pub fn is_pass_catcher(&self) -> bool {
        matches!(self, Position::WideReceiver | Position::TightEnd)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

impl From<String> for Position {
    fn from(s: String) -> Self {
        Position::parse_lenient(&s)
    }
}

impl From<Position> for String {
    fn from(pos: Position) -> Self {
        pos.display_str().to_string()
    }
}

/// A player as it sits on a team's roster.
///
/// Carries only what the advisor needs to reason about roster construction:
/// position counts, NFL team for stacking, and bye week for conflicts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftedPlayer {
    pub id: String,
    pub name: String,
    pub position: Position,
    /// NFL team abbreviation (e.g. "KC").
    #[serde(default)]
    pub team: String,
    #[serde(default)]
    pub bye_week: Option<u8>,
}

/// A single completed auction pick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftPick {
    pub player: DraftedPlayer,
    /// Winning bid.
    pub price: u32,
    /// ID of the fantasy team that won the player.
    pub team_id: String,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_str_pos_standard_positions() {
        assert_eq!(Position::from_str_pos("QB"), Some(Position::Quarterback));
        assert_eq!(Position::from_str_pos("RB"), Some(Position::RunningBack));
        assert_eq!(Position::from_str_pos("WR"), Some(Position::WideReceiver));
        assert_eq!(Position::from_str_pos("TE"), Some(Position::TightEnd));
        assert_eq!(Position::from_str_pos("DST"), Some(Position::Defense));
        assert_eq!(Position::from_str_pos("K"), Some(Position::Kicker));
    }

    #[test]
    fn from_str_pos_aliases_and_case() {
        assert_eq!(Position::from_str_pos("d/st"), Some(Position::Defense));
        assert_eq!(Position::from_str_pos("DEF"), Some(Position::Defense));
        assert_eq!(Position::from_str_pos(" wr "), Some(Position::WideReceiver));
        assert_eq!(Position::from_str_pos("pk"), Some(Position::Kicker));
    }

    #[test]
    fn from_str_pos_invalid() {
        assert_eq!(Position::from_str_pos("LB"), None);
        assert_eq!(Position::from_str_pos(""), None);
        assert_eq!(Position::parse_lenient("FLEX"), Position::Unknown);
    }

    #[test]
    fn display_str_roundtrip() {
        for &pos in DRAFTABLE_POSITIONS {
            let s = pos.display_str();
            assert_eq!(Position::from_str_pos(s), Some(pos), "Roundtrip failed for {}", s);
        }
    }

    #[test]
    fn serde_uses_short_codes() {
        let json = serde_json::to_string(&Position::Defense).unwrap();
        assert_eq!(json, "\"DST\"");
        let parsed: Position = serde_json::from_str("\"te\"").unwrap();
        assert_eq!(parsed, Position::TightEnd);
        let unknown: Position = serde_json::from_str("\"LB\"").unwrap();
        assert_eq!(unknown, Position::Unknown);
    }

    #[test]
    fn pass_catchers() {
        assert!(Position::WideReceiver.is_pass_catcher());
        assert!(Position::TightEnd.is_pass_catcher());
        assert!(!Position::RunningBack.is_pass_catcher());
        assert!(!Position::Quarterback.is_pass_catcher());
    }
}
