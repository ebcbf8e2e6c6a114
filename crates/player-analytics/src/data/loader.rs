// Player rankings CSV loading and normalization.
//
// Every column is read as text and coerced: numbers use a best-effort prefix
// parse that falls back to 0, text falls back to a sentinel. Records sharing a
// (name, year) key are merged into one row.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use super::dataset::Dataset;
use super::player::{Category, PlayerRow, RoleStats};

/// Name used when the `name` column is empty or missing.
pub const UNKNOWN_NAME: &str = "Unknown";
/// Region used when the `region` column is empty or missing.
pub const UNKNOWN_REGION: &str = "N/A";
/// Category used when the `player_category` column is empty or missing.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("loader task failed: {0}")]
    Task(String),
}

// ---------------------------------------------------------------------------
// Raw CSV record (private)
// ---------------------------------------------------------------------------

/// One CSV line as text. Missing columns and empty cells both come through
/// as `None`; columns not listed here are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawPlayerRecord {
    player_id: Option<String>,
    name: Option<String>,
    year: Option<String>,
    region: Option<String>,
    stats_url: Option<String>,

    total_games: Option<String>,
    losses: Option<String>,
    citizen_games: Option<String>,
    sheriff_games: Option<String>,
    mafia_games: Option<String>,
    don_games: Option<String>,

    overall_winrate: Option<String>,
    citizen_winrate: Option<String>,
    sheriff_winrate: Option<String>,
    mafia_winrate: Option<String>,
    don_winrate: Option<String>,

    extra_points_avg_10_games: Option<String>,
    extra_points_citizen_avg: Option<String>,
    extra_points_sheriff_avg: Option<String>,
    extra_points_mafia_avg: Option<String>,
    extra_points_don_avg: Option<String>,

    player_category: Option<String>,
    overall_rank: Option<String>,
    overall_score: Option<String>,
    citizen_rank: Option<String>,
    sheriff_rank: Option<String>,
    mafia_rank: Option<String>,
    don_rank: Option<String>,
}

// ---------------------------------------------------------------------------
// Coercion helpers
// ---------------------------------------------------------------------------

/// Best-effort integer parse: optional sign followed by the leading digits.
/// Anything after the digits is ignored (`"12.7"` → 12, `"40 games"` → 40);
/// no leading digits or overflow yields 0.
pub(crate) fn coerce_int(value: Option<&str>) -> i64 {
    let Some(text) = value else { return 0 };
    let text = text.trim_start();
    let bytes = text.as_bytes();

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_start {
        return 0;
    }
    text[..end].parse().unwrap_or(0)
}

/// Best-effort float parse over the longest numeric prefix
/// (`"52.5%"` → 52.5, `"1e3x"` → 1000.0). Unparseable or non-finite → 0.
pub(crate) fn coerce_float(value: Option<&str>) -> f64 {
    let Some(text) = value else { return 0.0 };
    let text = text.trim_start();
    let bytes = text.as_bytes();

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let mut mantissa_digits = 0;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        mantissa_digits += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
            mantissa_digits += 1;
        }
    }
    if mantissa_digits == 0 {
        return 0.0;
    }

    // Exponent only counts if at least one digit follows it.
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    match text[..end].parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Count coercion: negative counts are clamped to 0.
fn coerce_count(value: Option<&str>) -> i64 {
    coerce_int(value).max(0)
}

/// Rank coercion: negative or unparseable ranks mean "unranked" (0).
fn coerce_rank(value: Option<&str>) -> u32 {
    u32::try_from(coerce_int(value)).unwrap_or(0)
}

/// Trimmed text, or `None` when missing or blank.
fn text(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

fn normalize(raw: &RawPlayerRecord) -> PlayerRow {
    let name = text(&raw.name).unwrap_or(UNKNOWN_NAME).to_string();
    let year = i32::try_from(coerce_int(text(&raw.year))).unwrap_or(0);
    let games = coerce_count(text(&raw.total_games));
    let losses = coerce_count(text(&raw.losses));

    PlayerRow {
        id: format!("{name}-{year}"),
        player_id: coerce_int(text(&raw.player_id)),
        name,
        year,
        region: text(&raw.region).unwrap_or(UNKNOWN_REGION).to_string(),
        stats_url: text(&raw.stats_url).map(str::to_string),

        total_games: games,
        overall_winrate: coerce_float(text(&raw.overall_winrate)),
        extra_points_avg_10_games: coerce_float(text(&raw.extra_points_avg_10_games)),
        overall_rank: coerce_rank(text(&raw.overall_rank)),
        overall_score: coerce_float(text(&raw.overall_score)),

        citizen: RoleStats {
            games: coerce_count(text(&raw.citizen_games)),
            winrate: coerce_float(text(&raw.citizen_winrate)),
            extra_points_avg: coerce_float(text(&raw.extra_points_citizen_avg)),
            rank: coerce_rank(text(&raw.citizen_rank)),
        },
        sheriff: RoleStats {
            games: coerce_count(text(&raw.sheriff_games)),
            winrate: coerce_float(text(&raw.sheriff_winrate)),
            extra_points_avg: coerce_float(text(&raw.extra_points_sheriff_avg)),
            rank: coerce_rank(text(&raw.sheriff_rank)),
        },
        mafia: RoleStats {
            games: coerce_count(text(&raw.mafia_games)),
            winrate: coerce_float(text(&raw.mafia_winrate)),
            extra_points_avg: coerce_float(text(&raw.extra_points_mafia_avg)),
            rank: coerce_rank(text(&raw.mafia_rank)),
        },
        don: RoleStats {
            games: coerce_count(text(&raw.don_games)),
            winrate: coerce_float(text(&raw.don_winrate)),
            extra_points_avg: coerce_float(text(&raw.extra_points_don_avg)),
            rank: coerce_rank(text(&raw.don_rank)),
        },

        category: Category::parse(text(&raw.player_category).unwrap_or(UNKNOWN_CATEGORY)),

        games,
        wins: games.saturating_sub(losses),
        losses,
    }
}

// ---------------------------------------------------------------------------
// Reader-based loader (enables testing without temp files)
// ---------------------------------------------------------------------------

/// Parse player rows from CSV text with a header row.
///
/// Malformed records are skipped with a warning. Records with the same
/// (name, year) are merged: games, wins and losses are summed and the
/// first-seen record supplies every other field. Rows keep first-seen order.
pub fn load_players_from_reader<R: Read>(rdr: R) -> Result<Dataset, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    // Surface an unreadable header as a hard error rather than per-row noise.
    reader.headers()?;

    let mut rows: Vec<PlayerRow> = Vec::new();
    let mut index_by_key: HashMap<(String, i32), usize> = HashMap::new();
    let mut skipped = 0;

    for (line, result) in reader.deserialize::<RawPlayerRecord>().enumerate() {
        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                warn!("skipping malformed player record #{}: {}", line + 1, e);
                skipped += 1;
                continue;
            }
        };

        let row = normalize(&raw);
        let key = (row.name.clone(), row.year);
        match index_by_key.get(&key) {
            Some(&idx) => {
                let existing = &mut rows[idx];
                debug!("merging duplicate record for {}", existing.id);
                existing.games = existing.games.saturating_add(row.games);
                existing.wins = existing.wins.saturating_add(row.wins);
                existing.losses = existing.losses.saturating_add(row.losses);
            }
            None => {
                index_by_key.insert(key, rows.len());
                rows.push(row);
            }
        }
    }

    Ok(Dataset::new(rows, skipped))
}

// ---------------------------------------------------------------------------
// Public path-based loader
// ---------------------------------------------------------------------------

/// Load the player rankings CSV at `path`.
pub fn load_dataset(path: &Path) -> Result<Dataset, LoadError> {
    let file = std::fs::File::open(path).map_err(|e| LoadError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let dataset = load_players_from_reader(file).map_err(|e| LoadError::Csv {
        path: path.display().to_string(),
        source: e,
    })?;

    if dataset.rows().is_empty() {
        warn!("player CSV {} produced zero rows", path.display());
    }
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
