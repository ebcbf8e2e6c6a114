// Player row model: one player's statistics for one year.

use serde::{Serialize, Serializer};
use std::fmt;

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// The four in-game roles a player can be dealt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Citizen,
    Sheriff,
    Mafia,
    Don,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Citizen, Role::Sheriff, Role::Mafia, Role::Don];

    /// Lowercase key used in CSV headers and CSS class names.
    pub fn key(self) -> &'static str {
        match self {
            Role::Citizen => "citizen",
            Role::Sheriff => "sheriff",
            Role::Mafia => "mafia",
            Role::Don => "don",
        }
    }
}

/// Per-role statistics for a player-year.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RoleStats {
    pub games: i64,
    /// Win rate in percent (0–100).
    pub winrate: f64,
    /// Average extra (bonus) points per game in this role.
    pub extra_points_avg: f64,
    /// Leaderboard position; 0 means unranked.
    pub rank: u32,
}

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Player skill category.
///
/// The five known categories have a fixed priority (Expert first). Anything
/// else found in the data is kept verbatim as `Other` and sorts after them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    Expert,
    Advanced,
    Intermediate,
    Beginner,
    Novice,
    Other(String),
}

impl Category {
    /// The recognized categories in priority order.
    pub const ORDER: [Category; 5] = [
        Category::Expert,
        Category::Advanced,
        Category::Intermediate,
        Category::Beginner,
        Category::Novice,
    ];

    /// Parse a category label. Matching is exact, like the labels the
    /// rankings export writes; unknown labels become `Other`.
    pub fn parse(label: &str) -> Category {
        match label {
            "Expert" => Category::Expert,
            "Advanced" => Category::Advanced,
            "Intermediate" => Category::Intermediate,
            "Beginner" => Category::Beginner,
            "Novice" => Category::Novice,
            other => Category::Other(other.to_string()),
        }
    }

    /// Position in the priority list, or `None` for unrecognized labels.
    pub fn priority(&self) -> Option<usize> {
        Category::ORDER.iter().position(|c| c == self)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Category::Expert => "Expert",
            Category::Advanced => "Advanced",
            Category::Intermediate => "Intermediate",
            Category::Beginner => "Beginner",
            Category::Novice => "Novice",
            Category::Other(label) => label,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Region names
// ---------------------------------------------------------------------------

/// Region keys as they appear in the data, with their display names.
pub const REGION_NAMES: &[(&str, &str)] = &[
    ("central", "Central"),
    ("chernozem_region", "Chernozem"),
    ("far_east", "Far East"),
    ("north", "North"),
    ("siberia_and_ural", "Siberia and Ural"),
    ("south", "South"),
    ("volga_region", "Volga"),
];

/// Display name for a region key. Unknown keys are shown as-is.
pub fn region_display_name(key: &str) -> &str {
    REGION_NAMES
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, name)| *name)
        .unwrap_or(key)
}

/// Reverse lookup: the region key for a display name, if it is a known one.
pub fn region_key_for(display: &str) -> Option<&'static str> {
    REGION_NAMES
        .iter()
        .find(|(_, name)| name.eq_ignore_ascii_case(display))
        .map(|(k, _)| *k)
}

// ---------------------------------------------------------------------------
// PlayerRow
// ---------------------------------------------------------------------------

/// One player's statistics for one year. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerRow {
    /// Stable identifier: `"{name}-{year}"`.
    pub id: String,
    pub player_id: i64,
    pub name: String,
    /// Season year; 0 when the source value was missing or unparseable.
    pub year: i32,
    /// Raw region key (e.g. `far_east`), or `"N/A"`.
    pub region: String,
    pub stats_url: Option<String>,

    pub total_games: i64,
    pub overall_winrate: f64,
    pub extra_points_avg_10_games: f64,
    pub overall_rank: u32,
    pub overall_score: f64,

    pub citizen: RoleStats,
    pub sheriff: RoleStats,
    pub mafia: RoleStats,
    pub don: RoleStats,

    pub category: Category,

    // Aggregated across duplicate (name, year) records.
    pub games: i64,
    pub wins: i64,
    pub losses: i64,
}

impl PlayerRow {
    pub fn role(&self, role: Role) -> &RoleStats {
        match role {
            Role::Citizen => &self.citizen,
            Role::Sheriff => &self.sheriff,
            Role::Mafia => &self.mafia,
            Role::Don => &self.don,
        }
    }

    pub fn region_name(&self) -> &str {
        region_display_name(&self.region)
    }

    /// All floating-point fields, for invariant checks.
    pub fn float_fields(&self) -> Vec<f64> {
        let mut values = vec![
            self.overall_winrate,
            self.extra_points_avg_10_games,
            self.overall_score,
        ];
        for role in Role::ALL {
            let stats = self.role(role);
            values.push(stats.winrate);
            values.push(stats.extra_points_avg);
        }
        values
    }
}
