// Player identity normalization for cross-source merging.
//
// External sources spell names differently ("D.J. Moore" vs "DJ Moore",
// "Chicago Bears D/ST" vs "CHI DST"). Everything is reduced to a canonical
// `name|POSITION` key; matching is exact on that key only.

use crate::draft::Position;

/// Trailing generational suffixes dropped from player names.
const SUFFIXES: &[&str] = &["jr", "sr", "ii", "iii", "iv", "v"];

/// Known nickname spellings and their canonical form (after punctuation and
/// suffix stripping).
const NAME_VARIANTS: &[(&str, &str)] = &[
    ("ceedee lamb", "cd lamb"),
    ("ken walker", "kenneth walker"),
    ("hollywood brown", "marquise brown"),
    ("gabe davis", "gabriel davis"),
    ("josh palmer", "joshua palmer"),
    ("chig okonkwo", "chigoziem okonkwo"),
    ("mike williams", "michael williams"),
];

/// Nonstandard or historical team codes.
const TEAM_CODE_ALIASES: &[(&str, &str)] = &[
    ("ARZ", "ARI"),
    ("BLT", "BAL"),
    ("CLV", "CLE"),
    ("HST", "HOU"),
    ("JAC", "JAX"),
    ("LA", "LAR"),
    ("NY", "NYG"),
    ("OAK", "LV"),
    ("SD", "LAC"),
    ("STL", "LAR"),
    ("WSH", "WAS"),
];

/// Team names, nicknames and cities that identify a defense.
const TEAM_NAMES: &[(&str, &str)] = &[
    ("arizona cardinals", "ARI"),
    ("atlanta falcons", "ATL"),
    ("baltimore ravens", "BAL"),
    ("buffalo bills", "BUF"),
    ("carolina panthers", "CAR"),
    ("chicago bears", "CHI"),
    ("cincinnati bengals", "CIN"),
    ("cleveland browns", "CLE"),
    ("dallas cowboys", "DAL"),
    ("denver broncos", "DEN"),
    ("detroit lions", "DET"),
    ("green bay packers", "GB"),
    ("houston texans", "HOU"),
    ("indianapolis colts", "IND"),
    ("jacksonville jaguars", "JAX"),
    ("kansas city chiefs", "KC"),
    ("las vegas raiders", "LV"),
    ("los angeles chargers", "LAC"),
    ("los angeles rams", "LAR"),
    ("miami dolphins", "MIA"),
    ("minnesota vikings", "MIN"),
    ("new england patriots", "NE"),
    ("new orleans saints", "NO"),
    ("new york giants", "NYG"),
    ("new york jets", "NYJ"),
    ("philadelphia eagles", "PHI"),
    ("pittsburgh steelers", "PIT"),
    ("san francisco 49ers", "SF"),
    ("seattle seahawks", "SEA"),
    ("tampa bay buccaneers", "TB"),
    ("tennessee titans", "TEN"),
    ("washington commanders", "WAS"),
    ("cardinals", "ARI"),
    ("falcons", "ATL"),
    ("ravens", "BAL"),
    ("bills", "BUF"),
    ("panthers", "CAR"),
    ("bears", "CHI"),
    ("bengals", "CIN"),
    ("browns", "CLE"),
    ("cowboys", "DAL"),
    ("broncos", "DEN"),
    ("lions", "DET"),
    ("packers", "GB"),
    ("texans", "HOU"),
    ("colts", "IND"),
    ("jaguars", "JAX"),
    ("chiefs", "KC"),
    ("raiders", "LV"),
    ("chargers", "LAC"),
    ("rams", "LAR"),
    ("dolphins", "MIA"),
    ("vikings", "MIN"),
    ("patriots", "NE"),
    ("saints", "NO"),
    ("giants", "NYG"),
    ("jets", "NYJ"),
    ("eagles", "PHI"),
    ("steelers", "PIT"),
    ("49ers", "SF"),
    ("niners", "SF"),
    ("seahawks", "SEA"),
    ("buccaneers", "TB"),
    ("bucs", "TB"),
    ("titans", "TEN"),
    ("commanders", "WAS"),
    ("arizona", "ARI"),
    ("atlanta", "ATL"),
    ("baltimore", "BAL"),
    ("buffalo", "BUF"),
    ("carolina", "CAR"),
    ("chicago", "CHI"),
    ("cincinnati", "CIN"),
    ("cleveland", "CLE"),
    ("dallas", "DAL"),
    ("denver", "DEN"),
    ("detroit", "DET"),
    ("green bay", "GB"),
    ("houston", "HOU"),
    ("indianapolis", "IND"),
    ("jacksonville", "JAX"),
    ("kansas city", "KC"),
    ("las vegas", "LV"),
    ("la chargers", "LAC"),
    ("la rams", "LAR"),
    ("miami", "MIA"),
    ("minnesota", "MIN"),
    ("new england", "NE"),
    ("new orleans", "NO"),
    ("ny giants", "NYG"),
    ("ny jets", "NYJ"),
    ("philadelphia", "PHI"),
    ("pittsburgh", "PIT"),
    ("san francisco", "SF"),
    ("seattle", "SEA"),
    ("tampa bay", "TB"),
    ("tennessee", "TEN"),
    ("washington", "WAS"),
];

/// Trailing words that mark a defense entry rather than part of the team name.
const DEFENSE_MARKERS: &[&str] = &["dst", "defense", "def", "d"];

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Canonical merge key for a player: `normalized_name|POSITION`.
pub fn player_key(name: &str, position: Position) -> String {
    format!("{}|{}", normalize_name(name, position), position.display_str())
}

/// Normalize a player name for matching.
///
/// Defenses resolve to `"<team code> dst"` in lowercase when the team can be
/// identified.
pub fn normalize_name(name: &str, position: Position) -> String {
    if position == Position::Defense {
        return normalize_defense(name);
    }

    let mut words = clean_words(name);
    if words.len() > 1 && words.last().is_some_and(|w| SUFFIXES.contains(&w.as_str())) {
        words.pop();
    }
    let joined = words.join(" ");

    NAME_VARIANTS
        .iter()
        .find(|(variant, _)| *variant == joined)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or(joined)
}

/// Normalize an NFL team abbreviation, resolving known aliases and full names.
pub fn normalize_team_code(team: &str) -> String {
    let upper = team.trim().to_uppercase();
    if upper.is_empty() {
        return upper;
    }
    if let Some((_, code)) = TEAM_CODE_ALIASES.iter().find(|(alias, _)| *alias == upper) {
        return code.to_string();
    }
    if upper.len() <= 3 {
        return upper;
    }
    let lower = clean_words(team).join(" ");
    lookup_team_name(&lower).map(str::to_string).unwrap_or(upper)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Lowercase, drop punctuation, split on whitespace.
fn clean_words(raw: &str) -> Vec<String> {
    let stripped: String = raw
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();
    stripped.split_whitespace().map(str::to_string).collect()
}

fn lookup_team_name(name: &str) -> Option<&'static str> {
    TEAM_NAMES
        .iter()
        .find(|(team_name, _)| *team_name == name)
        .map(|(_, code)| *code)
}

fn normalize_defense(name: &str) -> String {
    let mut words = clean_words(name);
    while words.len() > 1
        && words
            .last()
            .is_some_and(|w| DEFENSE_MARKERS.contains(&w.as_str()))
    {
        words.pop();
    }
    let cleaned = words.join(" ");

    let code = lookup_team_name(&cleaned).map(str::to_string).or_else(|| {
        let upper = cleaned.to_uppercase();
        if let Some((_, code)) = TEAM_CODE_ALIASES.iter().find(|(alias, _)| *alias == upper) {
            Some(code.to_string())
        } else if !upper.is_empty() && upper.len() <= 3 && !upper.contains(' ') {
            Some(upper)
        } else {
            None
        }
    });

    match code {
        Some(code) => format!("{} dst", code.to_lowercase()),
        None if cleaned.is_empty() => String::new(),
        None => format!("{cleaned} dst"),
    }
}
