// Loaded player rows plus the summaries the table controls need.

use std::collections::BTreeSet;

use super::player::PlayerRow;

/// The immutable result of one CSV load.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    rows: Vec<PlayerRow>,
    skipped: usize,
}

impl Dataset {
    pub fn new(rows: Vec<PlayerRow>, skipped: usize) -> Self {
        Dataset { rows, skipped }
    }

    pub fn rows(&self) -> &[PlayerRow] {
        &self.rows
    }

    /// Number of malformed records dropped during load.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Distinct years, newest first.
    pub fn years(&self) -> Vec<i32> {
        let set: BTreeSet<i32> = self.rows.iter().map(|r| r.year).collect();
        set.into_iter().rev().collect()
    }

    /// The newest year present, used as the default year filter.
    pub fn latest_year(&self) -> Option<i32> {
        self.rows.iter().map(|r| r.year).max()
    }

    /// Distinct region keys in sorted order.
    pub fn regions(&self) -> Vec<&str> {
        let set: BTreeSet<&str> = self.rows.iter().map(|r| r.region.as_str()).collect();
        set.into_iter().collect()
    }

    /// Sum of aggregated games over every row.
    pub fn total_games(&self) -> i64 {
        self.rows
            .iter()
            .fold(0i64, |total, r| total.saturating_add(r.games))
    }
}
