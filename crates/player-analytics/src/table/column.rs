// Column metadata: keys, headers, cell formatting, and sort comparators.

use std::cmp::Ordering;

use crate::data::player::{Category, PlayerRow, Role};

use super::state::SortDirection;

/// Every column of the player table, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ColumnId {
    Name,
    Year,
    Region,
    Games,
    CitizenGames,
    SheriffGames,
    MafiaGames,
    DonGames,
    OverallWinrate,
    CitizenWinrate,
    SheriffWinrate,
    MafiaWinrate,
    DonWinrate,
    AvgPoints10Games,
    MafiaAvgPoints,
    DonAvgPoints,
    CitizenAvgPoints,
    SheriffAvgPoints,
    OverallRank,
    CitizenRank,
    SheriffRank,
    MafiaRank,
    DonRank,
    Category,
}

/// What kind of value a column holds. Drives formatting, sorting, and which
/// filter predicates the column accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Year,
    Region,
    /// Game counts; sorted highest first.
    Count,
    /// Win rates in percent; sorted highest first.
    Percent,
    /// Average extra points; sorted highest first.
    Points,
    /// Leaderboard position, 0 = unranked (always last).
    Rank,
    Category,
}

impl ColumnId {
    pub const ALL: [ColumnId; 24] = [
        ColumnId::Name,
        ColumnId::Year,
        ColumnId::Region,
        ColumnId::Games,
        ColumnId::CitizenGames,
        ColumnId::SheriffGames,
        ColumnId::MafiaGames,
        ColumnId::DonGames,
        ColumnId::OverallWinrate,
        ColumnId::CitizenWinrate,
        ColumnId::SheriffWinrate,
        ColumnId::MafiaWinrate,
        ColumnId::DonWinrate,
        ColumnId::AvgPoints10Games,
        ColumnId::MafiaAvgPoints,
        ColumnId::DonAvgPoints,
        ColumnId::CitizenAvgPoints,
        ColumnId::SheriffAvgPoints,
        ColumnId::OverallRank,
        ColumnId::CitizenRank,
        ColumnId::SheriffRank,
        ColumnId::MafiaRank,
        ColumnId::DonRank,
        ColumnId::Category,
    ];

    /// Stable key used in query strings and JSON.
    pub fn key(self) -> &'static str {
        match self {
            ColumnId::Name => "name",
            ColumnId::Year => "year",
            ColumnId::Region => "region",
            ColumnId::Games => "games",
            ColumnId::CitizenGames => "citizen_games",
            ColumnId::SheriffGames => "sheriff_games",
            ColumnId::MafiaGames => "mafia_games",
            ColumnId::DonGames => "don_games",
            ColumnId::OverallWinrate => "overall_winrate",
            ColumnId::CitizenWinrate => "citizen_winrate",
            ColumnId::SheriffWinrate => "sheriff_winrate",
            ColumnId::MafiaWinrate => "mafia_winrate",
            ColumnId::DonWinrate => "don_winrate",
            ColumnId::AvgPoints10Games => "extra_points_avg_10_games",
            ColumnId::MafiaAvgPoints => "extra_points_mafia_avg",
            ColumnId::DonAvgPoints => "extra_points_don_avg",
            ColumnId::CitizenAvgPoints => "extra_points_citizen_avg",
            ColumnId::SheriffAvgPoints => "extra_points_sheriff_avg",
            ColumnId::OverallRank => "overall_rank",
            ColumnId::CitizenRank => "citizen_rank",
            ColumnId::SheriffRank => "sheriff_rank",
            ColumnId::MafiaRank => "mafia_rank",
            ColumnId::DonRank => "don_rank",
            ColumnId::Category => "player_category",
        }
    }

    pub fn from_key(key: &str) -> Option<ColumnId> {
        ColumnId::ALL.into_iter().find(|c| c.key() == key)
    }

    pub fn header(self) -> &'static str {
        match self {
            ColumnId::Name => "Name",
            ColumnId::Year => "Year",
            ColumnId::Region => "Region",
            ColumnId::Games => "Total Games",
            ColumnId::CitizenGames => "Citizen Games",
            ColumnId::SheriffGames => "Sheriff Games",
            ColumnId::MafiaGames => "Mafia Games",
            ColumnId::DonGames => "Don Games",
            ColumnId::OverallWinrate => "Overall Winrate",
            ColumnId::CitizenWinrate => "Citizen Winrate",
            ColumnId::SheriffWinrate => "Sheriff Winrate",
            ColumnId::MafiaWinrate => "Mafia Winrate",
            ColumnId::DonWinrate => "Don Winrate",
            ColumnId::AvgPoints10Games => "10 Games Avg Points",
            ColumnId::MafiaAvgPoints => "Mafia Avg Points",
            ColumnId::DonAvgPoints => "Don Avg Points",
            ColumnId::CitizenAvgPoints => "Citizen Avg Points",
            ColumnId::SheriffAvgPoints => "Sheriff Avg Points",
            ColumnId::OverallRank => "Overall Rank",
            ColumnId::CitizenRank => "Citizen Rank",
            ColumnId::SheriffRank => "Sheriff Rank",
            ColumnId::MafiaRank => "Mafia Rank",
            ColumnId::DonRank => "Don Rank",
            ColumnId::Category => "Player Category",
        }
    }

    pub fn kind(self) -> ColumnKind {
        match self {
            ColumnId::Name => ColumnKind::Text,
            ColumnId::Year => ColumnKind::Year,
            ColumnId::Region => ColumnKind::Region,
            ColumnId::Games
            | ColumnId::CitizenGames
            | ColumnId::SheriffGames
            | ColumnId::MafiaGames
            | ColumnId::DonGames => ColumnKind::Count,
            ColumnId::OverallWinrate
            | ColumnId::CitizenWinrate
            | ColumnId::SheriffWinrate
            | ColumnId::MafiaWinrate
            | ColumnId::DonWinrate => ColumnKind::Percent,
            ColumnId::AvgPoints10Games
            | ColumnId::MafiaAvgPoints
            | ColumnId::DonAvgPoints
            | ColumnId::CitizenAvgPoints
            | ColumnId::SheriffAvgPoints => ColumnKind::Points,
            ColumnId::OverallRank
            | ColumnId::CitizenRank
            | ColumnId::SheriffRank
            | ColumnId::MafiaRank
            | ColumnId::DonRank => ColumnKind::Rank,
            ColumnId::Category => ColumnKind::Category,
        }
    }

    /// The role a per-role column belongs to.
    pub fn role(self) -> Option<Role> {
        match self {
            ColumnId::CitizenGames
            | ColumnId::CitizenWinrate
            | ColumnId::CitizenAvgPoints
            | ColumnId::CitizenRank => Some(Role::Citizen),
            ColumnId::SheriffGames
            | ColumnId::SheriffWinrate
            | ColumnId::SheriffAvgPoints
            | ColumnId::SheriffRank => Some(Role::Sheriff),
            ColumnId::MafiaGames
            | ColumnId::MafiaWinrate
            | ColumnId::MafiaAvgPoints
            | ColumnId::MafiaRank => Some(Role::Mafia),
            ColumnId::DonGames
            | ColumnId::DonWinrate
            | ColumnId::DonAvgPoints
            | ColumnId::DonRank => Some(Role::Don),
            _ => None,
        }
    }

    // -- Value access --

    /// Numeric value of the cell, for numeric columns.
    pub fn numeric(self, row: &PlayerRow) -> Option<f64> {
        let role_stats = self.role().map(|r| row.role(r));
        let value = match (self, role_stats) {
            (ColumnId::Year, _) => row.year as f64,
            (ColumnId::Games, _) => row.games as f64,
            (ColumnId::OverallWinrate, _) => row.overall_winrate,
            (ColumnId::AvgPoints10Games, _) => row.extra_points_avg_10_games,
            (ColumnId::OverallRank, _) => row.overall_rank as f64,
            (_, Some(stats)) => match self.kind() {
                ColumnKind::Count => stats.games as f64,
                ColumnKind::Percent => stats.winrate,
                ColumnKind::Points => stats.extra_points_avg,
                ColumnKind::Rank => stats.rank as f64,
                _ => return None,
            },
            _ => return None,
        };
        Some(value)
    }

    fn rank(self, row: &PlayerRow) -> u32 {
        match self.role() {
            Some(role) => row.role(role).rank,
            None => row.overall_rank,
        }
    }

    /// Raw text value for exact and set-membership filters, and the
    /// unformatted value the global search also looks at.
    pub fn filter_key(self, row: &PlayerRow) -> String {
        match self {
            ColumnId::Name => row.name.clone(),
            ColumnId::Region => row.region.clone(),
            ColumnId::Games => row.games.to_string(),
            ColumnId::Category => row.category.as_str().to_string(),
            ColumnId::Year => row.year.to_string(),
            _ => self.display(row),
        }
    }

    /// The cell text as shown in the table.
    pub fn display(self, row: &PlayerRow) -> String {
        match self.kind() {
            ColumnKind::Text => row.name.clone(),
            ColumnKind::Year => {
                if row.year == 0 {
                    "N/A".to_string()
                } else {
                    row.year.to_string()
                }
            }
            ColumnKind::Region => row.region_name().to_string(),
            ColumnKind::Category => row.category.as_str().to_string(),
            ColumnKind::Count => {
                let count = self.numeric(row).unwrap_or(0.0) as i64;
                if self == ColumnId::Games {
                    format_thousands(count)
                } else {
                    count.to_string()
                }
            }
            ColumnKind::Percent => format!("{}%", self.numeric(row).unwrap_or(0.0)),
            ColumnKind::Points => {
                let value = self.numeric(row).unwrap_or(0.0);
                if value == 0.0 {
                    "N/A".to_string()
                } else {
                    format!("{value:.2}")
                }
            }
            ColumnKind::Rank => match self.rank(row) {
                0 => "N/A".to_string(),
                rank => rank.to_string(),
            },
        }
    }

    // -- Sorting --

    /// Compare two rows for this column in the given direction.
    pub fn compare(self, a: &PlayerRow, b: &PlayerRow, direction: SortDirection) -> Ordering {
        match self.kind() {
            ColumnKind::Text => direction.apply(compare_text(&a.name, &b.name)),
            ColumnKind::Region => direction.apply(compare_text(a.region_name(), b.region_name())),
            ColumnKind::Year => direction.apply(a.year.cmp(&b.year)),
            ColumnKind::Count if self == ColumnId::Games => {
                direction.apply(a.games.cmp(&b.games))
            }
            ColumnKind::Count | ColumnKind::Percent | ColumnKind::Points => {
                let va = self.numeric(a).unwrap_or(0.0);
                let vb = self.numeric(b).unwrap_or(0.0);
                direction.apply(vb.total_cmp(&va))
            }
            ColumnKind::Rank => compare_ranks(self.rank(a), self.rank(b), direction),
            ColumnKind::Category => compare_categories(&a.category, &b.category, direction),
        }
    }
}

/// Rank ordering: positive ranks compare numerically in `direction`; rank 0
/// (unranked) sorts after every positive rank regardless of direction.
pub fn compare_ranks(a: u32, b: u32, direction: SortDirection) -> Ordering {
    match (a, b) {
        (0, 0) => Ordering::Equal,
        (0, _) => Ordering::Greater,
        (_, 0) => Ordering::Less,
        (a, b) => direction.apply(a.cmp(&b)),
    }
}

/// Category ordering: known categories by priority in `direction`, unknown
/// categories after all known ones, compared case-insensitively.
pub fn compare_categories(a: &Category, b: &Category, direction: SortDirection) -> Ordering {
    match (a.priority(), b.priority()) {
        (Some(pa), Some(pb)) => direction.apply(pa.cmp(&pb)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => direction.apply(compare_text(a.as_str(), b.as_str())),
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// `1234567` → `"1,234,567"`.
pub fn format_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
