// Table state and its reducer.
//
// `TableState` is an immutable value. Every user interaction is a
// `TableAction`; `TableState::apply` returns the next state and never touches
// the row data.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::data::Dataset;

use super::column::ColumnId;
use super::filter::{ColumnFilter, FilterPredicate};

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Apply this direction to an ascending comparison result.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn parse(value: &str) -> Option<SortDirection> {
        match value {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub column: ColumnId,
    pub direction: SortDirection,
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// One of the supported page sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSize(usize);

impl PageSize {
    pub const OPTIONS: [usize; 5] = [10, 20, 30, 40, 50];
    pub const DEFAULT: PageSize = PageSize(10);

    pub fn new(size: usize) -> Option<PageSize> {
        PageSize::OPTIONS.contains(&size).then_some(PageSize(size))
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for PageSize {
    fn default() -> Self {
        PageSize::DEFAULT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pagination {
    pub page_index: usize,
    pub page_size: PageSize,
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum TableAction {
    /// Replace the filter on the filter's column; other filters are kept.
    SetColumnFilter(ColumnFilter),
    ClearColumnFilter(ColumnId),
    /// Cycle the column through none → asc → desc → none.
    ToggleSort(ColumnId),
    /// Set the sort outright (`None` clears it).
    SetSort(Option<SortKey>),
    SetGlobalFilter(String),
    SetPageIndex(usize),
    NextPage,
    PreviousPage,
    SetPageSize(PageSize),
}

// ---------------------------------------------------------------------------
// TableState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableState {
    sorting: Vec<SortKey>,
    column_filters: BTreeMap<ColumnId, ColumnFilter>,
    global_filter: String,
    pagination: Pagination,
}

impl TableState {
    /// Unsorted, unfiltered state on the first page.
    pub fn new(page_size: PageSize) -> TableState {
        TableState {
            pagination: Pagination {
                page_index: 0,
                page_size,
            },
            ..TableState::default()
        }
    }

    /// The state a fresh visitor sees: the year filter preset to the newest
    /// year in the data.
    pub fn initial(dataset: &Dataset, page_size: PageSize) -> TableState {
        let state = TableState::new(page_size);
        match dataset.latest_year() {
            Some(year) => state.apply(TableAction::SetColumnFilter(ColumnFilter::year(year))),
            None => state,
        }
    }

    // -- Accessors --

    pub fn sorting(&self) -> &[SortKey] {
        &self.sorting
    }

    /// Current direction for `column`, if it is the sorted column.
    pub fn sort_for(&self, column: ColumnId) -> Option<SortDirection> {
        self.sorting
            .iter()
            .find(|k| k.column == column)
            .map(|k| k.direction)
    }

    pub fn column_filter(&self, column: ColumnId) -> Option<&FilterPredicate> {
        self.column_filters.get(&column).map(ColumnFilter::predicate)
    }

    pub fn column_filters(&self) -> impl Iterator<Item = &ColumnFilter> {
        self.column_filters.values()
    }

    pub fn global_filter(&self) -> &str {
        &self.global_filter
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    // -- Reducer --

    /// Return the state that results from `action`.
    ///
    /// Filter and sort changes move back to the first page; a page-size change
    /// keeps the first row of the current page on screen.
    pub fn apply(&self, action: TableAction) -> TableState {
        let mut next = self.clone();
        match action {
            TableAction::SetColumnFilter(filter) => {
                if filter.is_noop() {
                    next.column_filters.remove(&filter.column());
                } else {
                    next.column_filters.insert(filter.column(), filter);
                }
                next.pagination.page_index = 0;
            }
            TableAction::ClearColumnFilter(column) => {
                next.column_filters.remove(&column);
                next.pagination.page_index = 0;
            }
            TableAction::ToggleSort(column) => {
                next.sorting = match self.sort_for(column) {
                    None => vec![SortKey {
                        column,
                        direction: SortDirection::Asc,
                    }],
                    Some(SortDirection::Asc) => vec![SortKey {
                        column,
                        direction: SortDirection::Desc,
                    }],
                    Some(SortDirection::Desc) => Vec::new(),
                };
                next.pagination.page_index = 0;
            }
            TableAction::SetSort(key) => {
                next.sorting = key.into_iter().collect();
                next.pagination.page_index = 0;
            }
            TableAction::SetGlobalFilter(text) => {
                next.global_filter = text;
                next.pagination.page_index = 0;
            }
            TableAction::SetPageIndex(index) => {
                next.pagination.page_index = index;
            }
            TableAction::NextPage => {
                next.pagination.page_index = self.pagination.page_index.saturating_add(1);
            }
            TableAction::PreviousPage => {
                next.pagination.page_index = self.pagination.page_index.saturating_sub(1);
            }
            TableAction::SetPageSize(size) => {
                let first_row = self.pagination.page_index * self.pagination.page_size.get();
                next.pagination.page_size = size;
                next.pagination.page_index = first_row / size.get();
            }
        }
        next
    }
}
