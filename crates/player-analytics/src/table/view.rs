// Derived table view: filter, search, sort, then paginate.
//
// `derive` is a pure function of the rows and a `TableState`. It borrows the
// rows, so rendering a page never copies the dataset.

use crate::data::player::PlayerRow;

use super::column::ColumnId;
use super::state::TableState;

/// Number of numbered page links shown around the current page.
const PAGE_WINDOW: usize = 5;

/// One page of rows plus the counts the pager needs.
#[derive(Debug, Clone)]
pub struct TableView<'a> {
    rows: Vec<&'a PlayerRow>,
    total: usize,
    filtered: usize,
    page_index: usize,
    page_size: usize,
}

/// An entry in the numbered pager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLink {
    Page { index: usize, current: bool },
    Ellipsis,
}

/// Compute the visible page for `state`.
///
/// Column filters run first, then the global search over every column, then
/// a stable sort. A page index past the end is clamped to the
/// last page.
pub fn derive<'a>(rows: &'a [PlayerRow], state: &TableState) -> TableView<'a> {
    let filters: Vec<_> = state.column_filters().collect();
    let needle = state.global_filter().trim().to_lowercase();

    let mut matched: Vec<&PlayerRow> = rows
        .iter()
        .filter(|row| filters.iter().all(|f| f.matches(row)))
        .filter(|row| needle.is_empty() || global_match(row, &needle))
        .collect();

    if let Some(key) = state.sorting().first() {
        matched.sort_by(|a, b| key.column.compare(a, b, key.direction));
    }

    let pagination = state.pagination();
    let page_size = pagination.page_size.get();
    let filtered = matched.len();
    let page_count = page_count(filtered, page_size);
    let page_index = pagination.page_index.min(page_count.saturating_sub(1));

    let start = page_index * page_size;
    let page_rows = matched.into_iter().skip(start).take(page_size).collect();

    TableView {
        rows: page_rows,
        total: rows.len(),
        filtered,
        page_index,
        page_size,
    }
}

/// A row matches when any column's displayed or raw value contains `needle`.
fn global_match(row: &PlayerRow, needle: &str) -> bool {
    ColumnId::ALL.iter().any(|c| {
        c.display(row).to_lowercase().contains(needle)
            || c.filter_key(row).to_lowercase().contains(needle)
    })
}

fn page_count(rows: usize, page_size: usize) -> usize {
    rows.div_ceil(page_size)
}

impl<'a> TableView<'a> {
    pub fn rows(&self) -> &[&'a PlayerRow] {
        &self.rows
    }

    /// Rows in the dataset before any filtering.
    pub fn total_count(&self) -> usize {
        self.total
    }

    /// Rows left after filtering and search.
    pub fn filtered_count(&self) -> usize {
        self.filtered
    }

    /// Zero-based index of the page actually shown.
    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Zero when nothing matched.
    pub fn page_count(&self) -> usize {
        page_count(self.filtered, self.page_size)
    }

    pub fn can_previous(&self) -> bool {
        self.page_index > 0
    }

    pub fn can_next(&self) -> bool {
        self.page_index + 1 < self.page_count()
    }

    /// One-based number of the first row on this page, 0 when empty.
    pub fn first_row_number(&self) -> usize {
        if self.rows.is_empty() {
            0
        } else {
            self.page_index * self.page_size + 1
        }
    }

    /// One-based number of the last row on this page, 0 when empty.
    pub fn last_row_number(&self) -> usize {
        if self.rows.is_empty() {
            0
        } else {
            self.page_index * self.page_size + self.rows.len()
        }
    }

    /// Numbered links for a window around the current page, with the first
    /// and last pages always reachable.
    pub fn page_links(&self) -> Vec<PageLink> {
        let count = self.page_count();
        if count == 0 {
            return Vec::new();
        }

        let start = self
            .page_index
            .saturating_sub(PAGE_WINDOW / 2)
            .min(count.saturating_sub(PAGE_WINDOW));
        let end = (start + PAGE_WINDOW).min(count);

        let mut links = Vec::new();
        if start > 0 {
            links.push(self.link(0));
            if start > 1 {
                links.push(PageLink::Ellipsis);
            }
        }
        links.extend((start..end).map(|i| self.link(i)));
        if end < count {
            if end < count - 1 {
                links.push(PageLink::Ellipsis);
            }
            links.push(self.link(count - 1));
        }
        links
    }

    fn link(&self, index: usize) -> PageLink {
        PageLink::Page {
            index,
            current: index == self.page_index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::load_players_from_reader;
    use crate::table::filter::{ColumnFilter, FilterPredicate};
    use crate::table::state::{PageSize, SortDirection, SortKey, TableAction};

    fn numbered_rows(n: usize) -> Vec<PlayerRow> {
        let mut csv = String::from("name,year,region,total_games,overall_rank\n");
        for i in 0..n {
            csv.push_str(&format!("Player{i:02},2024,south,{},{}\n", i * 3, i + 1));
        }
        load_players_from_reader(csv.as_bytes())
            .unwrap()
            .rows()
            .to_vec()
    }

    fn names(view: &TableView<'_>) -> Vec<String> {
        view.rows().iter().map(|r| r.name.clone()).collect()
    }

    #[test]
    fn third_page_holds_the_remainder() {
        let rows = numbered_rows(25);
        let state = TableState::new(PageSize::DEFAULT).apply(TableAction::SetPageIndex(2));
        let view = derive(&rows, &state);
        assert_eq!(view.rows().len(), 5);
        assert_eq!(view.page_count(), 3);
        assert_eq!(view.first_row_number(), 21);
        assert_eq!(view.last_row_number(), 25);
        assert!(view.can_previous());
        assert!(!view.can_next());
    }

    #[test]
    fn page_index_past_end_is_clamped() {
        let rows = numbered_rows(25);
        let state = TableState::new(PageSize::DEFAULT).apply(TableAction::SetPageIndex(9));
        let view = derive(&rows, &state);
        assert_eq!(view.page_index(), 2);
        assert_eq!(view.rows().len(), 5);
    }

    #[test]
    fn empty_result() {
        let rows = numbered_rows(3);
        let state = TableState::new(PageSize::DEFAULT)
            .apply(TableAction::SetGlobalFilter("nobody".into()));
        let view = derive(&rows, &state);
        assert!(view.rows().is_empty());
        assert_eq!(view.total_count(), 3);
        assert_eq!(view.filtered_count(), 0);
        assert_eq!(view.page_count(), 0);
        assert_eq!(view.first_row_number(), 0);
        assert!(!view.can_previous());
        assert!(!view.can_next());
        assert!(view.page_links().is_empty());
    }

    #[test]
    fn global_search_is_case_insensitive() {
        let csv = "name,year,region\nIvanov,2024,south\nPetrov,2024,south\n";
        let ds = load_players_from_reader(csv.as_bytes()).unwrap();
        let state = TableState::new(PageSize::DEFAULT)
            .apply(TableAction::SetGlobalFilter("ivan".into()));
        let view = derive(ds.rows(), &state);
        assert_eq!(names(&view), vec!["Ivanov"]);
    }

    #[test]
    fn global_search_covers_region_and_category() {
        let csv = "name,year,region,player_category\n\
                   A,2024,far_east,Novice\n\
                   B,2024,south,Expert\n";
        let ds = load_players_from_reader(csv.as_bytes()).unwrap();

        let by_region = TableState::new(PageSize::DEFAULT)
            .apply(TableAction::SetGlobalFilter("far east".into()));
        assert_eq!(names(&derive(ds.rows(), &by_region)), vec!["A"]);

        let by_category = TableState::new(PageSize::DEFAULT)
            .apply(TableAction::SetGlobalFilter("EXPERT".into()));
        assert_eq!(names(&derive(ds.rows(), &by_category)), vec!["B"]);
    }

    #[test]
    fn global_search_covers_stats_and_raw_region_key() {
        let csv = "name,year,region,total_games,overall_winrate\n\
                   Ivanov,2024,far_east,1234,58.3\n\
                   Petrov,2024,south,40,37.5\n";
        let ds = load_players_from_reader(csv.as_bytes()).unwrap();
        let search = |q: &str| {
            let state =
                TableState::new(PageSize::DEFAULT).apply(TableAction::SetGlobalFilter(q.into()));
            names(&derive(ds.rows(), &state))
        };

        assert_eq!(search("58.3"), vec!["Ivanov"]);
        assert_eq!(search("far_east"), vec!["Ivanov"]);
        assert_eq!(search("1,234"), vec!["Ivanov"]);
        assert_eq!(search("1234"), vec!["Ivanov"]);
        assert_eq!(search("37.5%"), vec!["Petrov"]);
    }

    #[test]
    fn empty_region_filter_returns_all_rows() {
        let rows = numbered_rows(4);
        let filter =
            ColumnFilter::new(ColumnId::Region, FilterPredicate::any_of(Vec::<String>::new()))
                .unwrap();
        let state = TableState::new(PageSize::DEFAULT).apply(TableAction::SetColumnFilter(filter));
        assert_eq!(derive(&rows, &state).filtered_count(), 4);
    }

    #[test]
    fn filters_then_sorts() {
        let csv = "name,year,region,total_games\n\
                   A,2024,south,10\n\
                   B,2023,south,50\n\
                   C,2024,south,30\n\
                   D,2024,north,90\n";
        let ds = load_players_from_reader(csv.as_bytes()).unwrap();
        let region =
            ColumnFilter::new(ColumnId::Region, FilterPredicate::any_of(["south"])).unwrap();
        let state = TableState::new(PageSize::DEFAULT)
            .apply(TableAction::SetColumnFilter(ColumnFilter::year(2024)))
            .apply(TableAction::SetColumnFilter(region))
            .apply(TableAction::SetSort(Some(SortKey {
                column: ColumnId::Games,
                direction: SortDirection::Asc,
            })));
        let view = derive(ds.rows(), &state);
        assert_eq!(names(&view), vec!["A", "C"]);
        assert_eq!(view.total_count(), 4);
        assert_eq!(view.filtered_count(), 2);
    }

    #[test]
    fn sort_is_stable_for_equal_keys() {
        let csv = "name,year,total_games\nFirst,2024,5\nSecond,2024,5\nThird,2024,5\n";
        let ds = load_players_from_reader(csv.as_bytes()).unwrap();
        for direction in [SortDirection::Asc, SortDirection::Desc] {
            let state = TableState::new(PageSize::DEFAULT).apply(TableAction::SetSort(Some(
                SortKey {
                    column: ColumnId::Games,
                    direction,
                },
            )));
            assert_eq!(
                names(&derive(ds.rows(), &state)),
                vec!["First", "Second", "Third"]
            );
        }
    }

    #[test]
    fn unsorted_keeps_load_order() {
        let rows = numbered_rows(3);
        let view = derive(&rows, &TableState::new(PageSize::DEFAULT));
        assert_eq!(names(&view), vec!["Player00", "Player01", "Player02"]);
    }

    #[test]
    fn page_links_window() {
        let rows = numbered_rows(100);
        let at = |page: usize| {
            let state = TableState::new(PageSize::DEFAULT).apply(TableAction::SetPageIndex(page));
            derive(&rows, &state).page_links()
        };
        let page = |index: usize, current: bool| PageLink::Page { index, current };

        assert_eq!(
            at(0),
            vec![
                page(0, true),
                page(1, false),
                page(2, false),
                page(3, false),
                page(4, false),
                PageLink::Ellipsis,
                page(9, false),
            ]
        );
        assert_eq!(
            at(5),
            vec![
                page(0, false),
                PageLink::Ellipsis,
                page(3, false),
                page(4, false),
                page(5, true),
                page(6, false),
                page(7, false),
                PageLink::Ellipsis,
                page(9, false),
            ]
        );
        assert_eq!(
            at(9),
            vec![
                page(0, false),
                PageLink::Ellipsis,
                page(5, false),
                page(6, false),
                page(7, false),
                page(8, false),
                page(9, true),
            ]
        );
    }

    #[test]
    fn few_pages_show_every_link() {
        let rows = numbered_rows(25);
        let view = derive(&rows, &TableState::new(PageSize::DEFAULT));
        assert_eq!(
            view.page_links(),
            vec![
                PageLink::Page { index: 0, current: true },
                PageLink::Page { index: 1, current: false },
                PageLink::Page { index: 2, current: false },
            ]
        );
    }
}
