// Query string <-> TableState.
//
// The page is stateless: every link and form carries the whole table state in
// its query string. Decoding replays the parameters as reducer actions on top
// of the initial state, so the same rules apply as for any other transition.

use tracing::debug;
use url::form_urlencoded;

use crate::data::Dataset;
use crate::table::{
    ColumnFilter, ColumnId, FilterPredicate, PageSize, SortDirection, SortKey, TableAction,
    TableState,
};

/// Query value that removes the year filter.
pub const ALL_YEARS: &str = "all";

/// Raw parameters as they appear in the URL.
#[derive(Debug, Default)]
struct QueryParams {
    q: Option<String>,
    year: Option<String>,
    regions: Vec<String>,
    games_min: Option<String>,
    games_max: Option<String>,
    sort: Option<String>,
    dir: Option<String>,
    page: Option<String>,
    size: Option<String>,
}

impl QueryParams {
    fn parse(query: &str) -> QueryParams {
        let mut params = QueryParams::default();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let value = value.into_owned();
            match key.as_ref() {
                "q" => params.q = Some(value),
                "year" => params.year = Some(value),
                "region" => params.regions.push(value),
                "games_min" => params.games_min = Some(value),
                "games_max" => params.games_max = Some(value),
                "sort" => params.sort = Some(value),
                "dir" => params.dir = Some(value),
                "page" => params.page = Some(value),
                "size" => params.size = Some(value),
                other => debug!("ignoring unknown query parameter `{other}`"),
            }
        }
        params
    }
}

/// Decode a query string into table state. Invalid values are ignored and the
/// corresponding part of the initial state is kept.
pub fn parse_state(query: &str, dataset: &Dataset, default_size: PageSize) -> TableState {
    let params = QueryParams::parse(query);
    let mut state = TableState::initial(dataset, default_size);

    match params.year.as_deref().map(str::trim) {
        Some(ALL_YEARS) => state = state.apply(TableAction::ClearColumnFilter(ColumnId::Year)),
        Some(value) => match value.parse::<i32>() {
            Ok(year) => state = state.apply(TableAction::SetColumnFilter(ColumnFilter::year(year))),
            Err(_) => debug!("ignoring invalid year `{value}`"),
        },
        None => {}
    }

    if !params.regions.is_empty() {
        match ColumnFilter::new(ColumnId::Region, FilterPredicate::any_of(params.regions)) {
            Ok(filter) => state = state.apply(TableAction::SetColumnFilter(filter)),
            Err(e) => debug!("ignoring region filter: {e}"),
        }
    }

    let min = parse_bound(params.games_min.as_deref());
    let max = parse_bound(params.games_max.as_deref());
    if min.is_some() || max.is_some() {
        match ColumnFilter::new(ColumnId::Games, FilterPredicate::NumericRange { min, max }) {
            Ok(filter) => state = state.apply(TableAction::SetColumnFilter(filter)),
            Err(e) => debug!("ignoring games filter: {e}"),
        }
    }

    if let Some(q) = params.q {
        state = state.apply(TableAction::SetGlobalFilter(q));
    }

    if let Some(column) = params.sort.as_deref().and_then(ColumnId::from_key) {
        let direction = params
            .dir
            .as_deref()
            .and_then(SortDirection::parse)
            .unwrap_or(SortDirection::Asc);
        state = state.apply(TableAction::SetSort(Some(SortKey { column, direction })));
    }

    if let Some(size) = params
        .size
        .as_deref()
        .and_then(|s| s.trim().parse().ok())
        .and_then(PageSize::new)
    {
        state = state.apply(TableAction::SetPageSize(size));
    }

    // Pages are 1-based in the URL. Applied last: the actions above reset it.
    if let Some(page) = params
        .page
        .as_deref()
        .and_then(|p| p.trim().parse::<usize>().ok())
        .filter(|p| *p >= 1)
    {
        state = state.apply(TableAction::SetPageIndex(page - 1));
    }

    state
}

fn parse_bound(value: Option<&str>) -> Option<f64> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Encode table state as a query string that `parse_state` turns back into the
/// same state.
pub fn encode_state(state: &TableState) -> String {
    let mut out = form_urlencoded::Serializer::new(String::new());

    let q = state.global_filter().trim();
    if !q.is_empty() {
        out.append_pair("q", q);
    }

    // Always explicit, otherwise decoding would re-apply the latest-year default.
    match state.column_filter(ColumnId::Year) {
        Some(FilterPredicate::Exact(year)) => out.append_pair("year", year),
        _ => out.append_pair("year", ALL_YEARS),
    };

    if let Some(FilterPredicate::AnyOf(regions)) = state.column_filter(ColumnId::Region) {
        for region in regions {
            out.append_pair("region", region);
        }
    }

    if let Some(FilterPredicate::NumericRange { min, max }) = state.column_filter(ColumnId::Games)
    {
        if let Some(min) = min {
            out.append_pair("games_min", &min.to_string());
        }
        if let Some(max) = max {
            out.append_pair("games_max", &max.to_string());
        }
    }

    if let Some(key) = state.sorting().first() {
        out.append_pair("sort", key.column.key());
        out.append_pair("dir", key.direction.as_str());
    }

    let pagination = state.pagination();
    out.append_pair("size", &pagination.page_size.get().to_string());
    if pagination.page_index > 0 {
        out.append_pair("page", &(pagination.page_index + 1).to_string());
    }

    out.finish()
}

/// Link to the table page showing `state`.
pub fn href(state: &TableState) -> String {
    format!("/?{}", encode_state(state))
}
