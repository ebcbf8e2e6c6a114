// Typed column filter predicates.
//
// Each column kind declares which predicate variants it accepts; a
// `ColumnFilter` can only be built for a supported (column, predicate) pair.

use std::collections::BTreeSet;

use crate::data::player::PlayerRow;

use super::column::{ColumnId, ColumnKind};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FilterError {
    #[error("column `{column}` does not support {predicate} filters")]
    Unsupported {
        column: &'static str,
        predicate: &'static str,
    },

    #[error("invalid range for column `{column}`: min {min} is greater than max {max}")]
    InvertedRange {
        column: &'static str,
        min: f64,
        max: f64,
    },

    #[error("range bound for column `{column}` must be finite")]
    NonFiniteBound { column: &'static str },
}

// ---------------------------------------------------------------------------
// FilterPredicate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum FilterPredicate {
    /// Cell equals the value (raw key or displayed text).
    Exact(String),
    /// Cell equals any of the values. An empty set matches everything.
    AnyOf(BTreeSet<String>),
    /// Numeric cell within the inclusive bounds.
    NumericRange { min: Option<f64>, max: Option<f64> },
    /// Displayed cell contains the text, case-insensitively.
    Substring(String),
}

impl FilterPredicate {
    pub fn any_of<I, S>(values: I) -> FilterPredicate
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FilterPredicate::AnyOf(values.into_iter().map(Into::into).collect())
    }

    pub fn name(&self) -> &'static str {
        match self {
            FilterPredicate::Exact(_) => "exact",
            FilterPredicate::AnyOf(_) => "any-of",
            FilterPredicate::NumericRange { .. } => "numeric range",
            FilterPredicate::Substring(_) => "substring",
        }
    }

    /// Trim text values and drop blank set members.
    fn normalized(self) -> FilterPredicate {
        match self {
            FilterPredicate::Exact(v) => FilterPredicate::Exact(v.trim().to_string()),
            FilterPredicate::AnyOf(values) => FilterPredicate::AnyOf(
                values
                    .into_iter()
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
                    .collect(),
            ),
            FilterPredicate::Substring(v) => FilterPredicate::Substring(v.trim().to_string()),
            range @ FilterPredicate::NumericRange { .. } => range,
        }
    }

    /// True when the predicate lets every row through.
    pub fn is_noop(&self) -> bool {
        match self {
            FilterPredicate::Exact(v) | FilterPredicate::Substring(v) => v.trim().is_empty(),
            FilterPredicate::AnyOf(values) => values.iter().all(|v| v.trim().is_empty()),
            FilterPredicate::NumericRange { min, max } => min.is_none() && max.is_none(),
        }
    }

    /// Evaluate against one row's cell in `column`.
    pub fn matches(&self, column: ColumnId, row: &PlayerRow) -> bool {
        match self {
            FilterPredicate::Exact(wanted) => {
                wanted.trim().is_empty() || value_matches(column, row, wanted.trim())
            }
            FilterPredicate::AnyOf(values) => {
                let wanted: Vec<&str> = values
                    .iter()
                    .map(|v| v.trim())
                    .filter(|v| !v.is_empty())
                    .collect();
                // No non-blank selection means "show all".
                wanted.is_empty() || wanted.iter().any(|v| value_matches(column, row, v))
            }
            FilterPredicate::NumericRange { min, max } => match column.numeric(row) {
                Some(v) => min.map_or(true, |m| v >= m) && max.map_or(true, |m| v <= m),
                None => false,
            },
            FilterPredicate::Substring(needle) => {
                let needle = needle.trim().to_lowercase();
                needle.is_empty() || column.display(row).to_lowercase().contains(&needle)
            }
        }
    }
}

/// A cell matches a wanted value if it equals the raw key, the displayed
/// text, or the displayed text ignoring case.
fn value_matches(column: ColumnId, row: &PlayerRow, wanted: &str) -> bool {
    if column.filter_key(row) == wanted {
        return true;
    }
    let shown = column.display(row);
    shown == wanted || shown.to_lowercase() == wanted.to_lowercase()
}

impl ColumnKind {
    /// Whether a column of this kind can be filtered with `predicate`.
    pub fn accepts(self, predicate: &FilterPredicate) -> bool {
        match (self, predicate) {
            (ColumnKind::Text | ColumnKind::Region | ColumnKind::Category, p) => {
                !matches!(p, FilterPredicate::NumericRange { .. })
            }
            (ColumnKind::Year, p) => !matches!(p, FilterPredicate::Substring(_)),
            (
                ColumnKind::Count | ColumnKind::Percent | ColumnKind::Points | ColumnKind::Rank,
                p,
            ) => matches!(p, FilterPredicate::NumericRange { .. }),
        }
    }
}

// ---------------------------------------------------------------------------
// ColumnFilter
// ---------------------------------------------------------------------------

/// A validated (column, predicate) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnFilter {
    column: ColumnId,
    predicate: FilterPredicate,
}

impl ColumnFilter {
    pub fn new(column: ColumnId, predicate: FilterPredicate) -> Result<ColumnFilter, FilterError> {
        if !column.kind().accepts(&predicate) {
            return Err(FilterError::Unsupported {
                column: column.key(),
                predicate: predicate.name(),
            });
        }

        if let FilterPredicate::NumericRange { min, max } = &predicate {
            if min.is_some_and(|v| !v.is_finite()) || max.is_some_and(|v| !v.is_finite()) {
                return Err(FilterError::NonFiniteBound {
                    column: column.key(),
                });
            }
            if let (Some(lo), Some(hi)) = (min, max) {
                if lo > hi {
                    return Err(FilterError::InvertedRange {
                        column: column.key(),
                        min: *lo,
                        max: *hi,
                    });
                }
            }
        }

        Ok(ColumnFilter {
            column,
            predicate: predicate.normalized(),
        })
    }

    /// Exact-match filter on the year column.
    pub fn year(year: i32) -> ColumnFilter {
        ColumnFilter {
            column: ColumnId::Year,
            predicate: FilterPredicate::Exact(year.to_string()),
        }
    }

    pub fn column(&self) -> ColumnId {
        self.column
    }

    pub fn predicate(&self) -> &FilterPredicate {
        &self.predicate
    }

    pub fn is_noop(&self) -> bool {
        self.predicate.is_noop()
    }

    pub fn matches(&self, row: &PlayerRow) -> bool {
        self.predicate.matches(self.column, row)
    }
}
