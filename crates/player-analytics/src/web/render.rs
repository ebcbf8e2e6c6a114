// Server-side HTML rendering.
//
// Pages are assembled by pushing formatted fragments onto a `String`. Every piece of data that
// comes from the CSV or the query string goes through `escape`.

use std::collections::BTreeSet;

use url::Url;

use crate::config::SiteConfig;
use crate::data::player::{region_display_name, region_key_for};
use crate::data::{Dataset, PlayerRow};
use crate::table::{
    ColumnId, FilterPredicate, PageLink, PageSize, SortDirection, TableAction, TableState,
    TableView,
};

use super::query::{href, ALL_YEARS};

const STYLE: &str = r#"
body { margin: 0; font-family: system-ui, sans-serif; color: #111827; background: #f9fafb; }
nav { display: flex; align-items: center; gap: 1rem; padding: 0.75rem 1.5rem; background: #111827; }
nav a { color: #f9fafb; text-decoration: none; font-weight: 600; }
main { padding: 1.5rem; max-width: 100%; }
footer { padding: 1rem 1.5rem; color: #6b7280; font-size: 0.875rem; border-top: 1px solid #e5e7eb; }
form.controls { display: flex; flex-wrap: wrap; gap: 1rem; align-items: flex-end; margin-bottom: 1rem; }
form.controls fieldset { border: 1px solid #e5e7eb; padding: 0.25rem 0.5rem; }
.table-wrap { overflow-x: auto; border: 1px solid #e5e7eb; border-radius: 0.375rem; background: #fff; }
table { border-collapse: collapse; width: 100%; font-size: 0.875rem; }
th, td { padding: 0.5rem 0.75rem; border-bottom: 1px solid #e5e7eb; white-space: nowrap; }
th a { color: inherit; text-decoration: none; }
td.empty { text-align: center; height: 6rem; }
.role-citizen { background: #fef2f2; }
.role-sheriff { background: #fefce8; }
.role-mafia { background: #f3f4f6; }
.role-don { background: #f5f3ff; }
.pager { display: flex; flex-wrap: wrap; gap: 0.5rem; align-items: center; margin-top: 1rem; }
.pager .current { font-weight: 700; }
.pager .disabled { color: #9ca3af; }
.error { max-width: 32rem; margin: 4rem auto; text-align: center; }
.error .actions { display: flex; gap: 1rem; justify-content: center; }
"#;

// ---------------------------------------------------------------------------
// Escaping
// ---------------------------------------------------------------------------

/// Escape text for HTML element content and double-quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Wrap `body` in the document shell: head, navbar, footer.
pub fn layout(site: &SiteConfig, title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n\
         <meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <meta name=\"description\" content=\"{description}\">\n\
         <title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
         <nav><a href=\"/\">{brand}</a></nav>\n\
         <main>\n{body}</main>\n\
         <footer>&copy; {year} {brand}. All rights reserved.</footer>\n\
         </body>\n</html>\n",
        description = escape(&site.description),
        title = escape(title),
        brand = escape(&site.brand),
        year = site.copyright_year,
    )
}

// ---------------------------------------------------------------------------
// Table page
// ---------------------------------------------------------------------------

/// The full table page for one derived view.
pub fn table_page(
    site: &SiteConfig,
    dataset: &Dataset,
    state: &TableState,
    view: &TableView<'_>,
) -> String {
    let mut body = String::new();
    body.push_str(&format!("<h1>{}</h1>\n", escape(&site.title)));
    controls(&mut body, dataset, state);
    table(&mut body, state, view);
    pager(&mut body, state, view);
    layout(site, &site.title, &body)
}

fn controls(out: &mut String, dataset: &Dataset, state: &TableState) {
    out.push_str(&format!(
        "<form class=\"controls\" method=\"get\" action=\"/\">\n\
         <label>Search <input type=\"search\" name=\"q\" value=\"{}\" \
         placeholder=\"Search all columns...\"></label>\n",
        escape(state.global_filter())
    ));

    // Year: single select, with an explicit "all" choice.
    let selected_year = match state.column_filter(ColumnId::Year) {
        Some(FilterPredicate::Exact(year)) => year.as_str(),
        _ => ALL_YEARS,
    };
    out.push_str("<label>Year <select name=\"year\">\n");
    option(out, ALL_YEARS, "All years", selected_year == ALL_YEARS);
    for year in dataset.years() {
        let value = year.to_string();
        option(out, &value, &value, selected_year == value);
    }
    out.push_str("</select></label>\n");

    // Region: multi-select as checkboxes. Nothing checked shows every region.
    let no_regions = BTreeSet::new();
    let selected_regions = match state.column_filter(ColumnId::Region) {
        Some(FilterPredicate::AnyOf(values)) => values,
        _ => &no_regions,
    };
    out.push_str("<fieldset><legend>Region</legend>\n");
    for key in dataset.regions() {
        let display = region_display_name(key);
        let checked = selected_regions
            .iter()
            .any(|v| v == key || region_key_for(v) == Some(key));
        out.push_str(&format!(
            "<label><input type=\"checkbox\" name=\"region\" value=\"{}\"{}> {}</label>\n",
            escape(key),
            if checked { " checked" } else { "" },
            escape(display)
        ));
    }
    out.push_str("</fieldset>\n");

    let (games_min, games_max) = match state.column_filter(ColumnId::Games) {
        Some(FilterPredicate::NumericRange { min, max }) => (*min, *max),
        _ => (None, None),
    };
    out.push_str(&format!(
        "<label>Games from <input type=\"number\" name=\"games_min\" min=\"0\" value=\"{}\"></label>\n\
         <label>to <input type=\"number\" name=\"games_max\" min=\"0\" value=\"{}\"></label>\n",
        games_min.map(|v| v.to_string()).unwrap_or_default(),
        games_max.map(|v| v.to_string()).unwrap_or_default(),
    ));

    // Sorting and page size carry over; the page itself restarts at 1.
    if let Some(key) = state.sorting().first() {
        hidden(out, "sort", key.column.key());
        hidden(out, "dir", key.direction.as_str());
    }
    hidden(out, "size", &state.pagination().page_size.get().to_string());

    out.push_str("<button type=\"submit\">Apply</button>\n<a href=\"/\">Reset</a>\n</form>\n");
}

fn option(out: &mut String, value: &str, label: &str, selected: bool) {
    out.push_str(&format!(
        "<option value=\"{}\"{}>{}</option>\n",
        escape(value),
        if selected { " selected" } else { "" },
        escape(label)
    ));
}

fn hidden(out: &mut String, name: &str, value: &str) {
    out.push_str(&format!(
        "<input type=\"hidden\" name=\"{}\" value=\"{}\">\n",
        name,
        escape(value)
    ));
}

fn table(out: &mut String, state: &TableState, view: &TableView<'_>) {
    out.push_str("<div class=\"table-wrap\">\n<table>\n<thead>\n<tr>");
    for column in ColumnId::ALL {
        let arrow = match state.sort_for(column) {
            Some(SortDirection::Asc) => " \u{2191}",
            Some(SortDirection::Desc) => " \u{2193}",
            None => "",
        };
        let target = state.apply(TableAction::ToggleSort(column));
        out.push_str(&format!(
            "<th{}><a href=\"{}\">{}{}</a></th>",
            role_class(column),
            escape(&href(&target)),
            escape(column.header()),
            arrow
        ));
    }
    out.push_str("</tr>\n</thead>\n<tbody>\n");

    if view.rows().is_empty() {
        out.push_str(&format!(
            "<tr><td class=\"empty\" colspan=\"{}\">No results.</td></tr>\n",
            ColumnId::ALL.len()
        ));
    }
    for row in view.rows() {
        out.push_str("<tr>");
        for column in ColumnId::ALL {
            out.push_str(&format!("<td{}>", role_class(column)));
            cell(out, column, row);
            out.push_str("</td>");
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</tbody>\n</table>\n</div>\n");
}

fn role_class(column: ColumnId) -> String {
    match column.role() {
        Some(role) => format!(" class=\"role-{}\"", role.key()),
        None => String::new(),
    }
}

fn cell(out: &mut String, column: ColumnId, row: &PlayerRow) {
    let text = escape(&column.display(row));
    match (column, row.stats_url.as_deref().filter(|url| is_web_link(url))) {
        (ColumnId::Name, Some(url)) => {
            out.push_str(&format!(
                "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a>",
                escape(url),
                text
            ));
        }
        _ => out.push_str(&text),
    }
}

/// Only absolute http(s) URLs from the data file become links.
fn is_web_link(url: &str) -> bool {
    Url::parse(url).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
}

fn pager(out: &mut String, state: &TableState, view: &TableView<'_>) {
    out.push_str("<div class=\"pager\">\n");
    out.push_str(&format!(
        "<span>Showing {}-{} of {} players ({} total)</span>\n",
        view.first_row_number(),
        view.last_row_number(),
        view.filtered_count(),
        view.total_count()
    ));

    let goto = |index: usize| href(&state.apply(TableAction::SetPageIndex(index)));

    if view.can_previous() {
        out.push_str(&format!(
            "<a href=\"{}\">Previous</a>\n",
            escape(&goto(view.page_index() - 1))
        ));
    } else {
        out.push_str("<span class=\"disabled\">Previous</span>\n");
    }

    for link in view.page_links() {
        match link {
            PageLink::Page {
                index,
                current: true,
            } => {
                out.push_str(&format!("<span class=\"current\">{}</span>\n", index + 1));
            }
            PageLink::Page { index, .. } => {
                out.push_str(&format!("<a href=\"{}\">{}</a>\n", escape(&goto(index)), index + 1));
            }
            PageLink::Ellipsis => out.push_str("<span>&hellip;</span>\n"),
        }
    }

    if view.can_next() {
        out.push_str(&format!(
            "<a href=\"{}\">Next</a>\n",
            escape(&goto(view.page_index() + 1))
        ));
    } else {
        out.push_str("<span class=\"disabled\">Next</span>\n");
    }

    out.push_str(&format!(
        "<span>Page {} of {}</span>\n",
        if view.page_count() == 0 {
            0
        } else {
            view.page_index() + 1
        },
        view.page_count()
    ));

    // Resize from the page actually shown, which may have been clamped.
    let shown = state.apply(TableAction::SetPageIndex(view.page_index()));
    out.push_str("<span>Rows per page:");
    for size in PageSize::OPTIONS.into_iter().filter_map(PageSize::new) {
        if size == state.pagination().page_size {
            out.push_str(&format!(" <span class=\"current\">{}</span>", size.get()));
        } else {
            let target = shown.apply(TableAction::SetPageSize(size));
            out.push_str(&format!(" <a href=\"{}\">{}</a>", escape(&href(&target)), size.get()));
        }
    }
    out.push_str("</span>\n</div>\n");
}

// ---------------------------------------------------------------------------
// Error pages
// ---------------------------------------------------------------------------

/// A link button on an error page.
pub struct Action<'a> {
    pub href: &'a str,
    pub label: &'a str,
}

/// Centered error card with a heading, message, actions, and optional
/// technical details.
pub fn error_page(
    site: &SiteConfig,
    heading: &str,
    message: &str,
    actions: &[Action<'_>],
    details: Option<&str>,
) -> String {
    let mut body = String::new();
    body.push_str(&format!(
        "<section class=\"error\">\n<h1>{}</h1>\n<p>{}</p>\n<div class=\"actions\">\n",
        escape(heading),
        escape(message)
    ));
    for action in actions {
        body.push_str(&format!(
            "<a href=\"{}\">{}</a>\n",
            escape(action.href),
            escape(action.label)
        ));
    }
    body.push_str("</div>\n");
    if let Some(details) = details {
        body.push_str(&format!(
            "<details>\n<summary>Error details</summary>\n<pre>{}</pre>\n</details>\n",
            escape(details)
        ));
    }
    body.push_str("</section>\n");
    layout(site, heading, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::load_players_from_reader;
    use crate::table::derive;

    fn site() -> SiteConfig {
        SiteConfig {
            title: "Players".into(),
            brand: "Brand <b>".into(),
            description: "desc".into(),
            copyright_year: 2025,
        }
    }

    fn dataset() -> Dataset {
        let csv = "name,year,region,stats_url,total_games,mafia_games\n\
                   Ivanov,2024,far_east,https://example.com/1?a=1&b=2,1200,10\n\
                   <Petrov>,2024,south,,40,5\n";
        load_players_from_reader(csv.as_bytes()).unwrap()
    }

    #[test]
    fn escape_special_characters() {
        assert_eq!(
            escape(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn layout_has_brand_and_footer() {
        let html = layout(&site(), "Title", "<p>body</p>");
        assert!(html.contains("<title>Title</title>"));
        assert!(html.contains("Brand &lt;b&gt;"));
        assert!(html.contains("&copy; 2025 Brand &lt;b&gt;. All rights reserved."));
        assert!(html.contains("<p>body</p>"));
    }

    #[test]
    fn table_page_renders_rows_and_links() {
        let ds = dataset();
        let state = TableState::initial(&ds, PageSize::DEFAULT);
        let view = derive(ds.rows(), &state);
        let html = table_page(&site(), &ds, &state, &view);

        assert!(html.contains(
            "<a href=\"https://example.com/1?a=1&amp;b=2\" target=\"_blank\" \
             rel=\"noopener noreferrer\">Ivanov</a>"
        ));
        assert!(html.contains("&lt;Petrov&gt;"));
        assert!(html.contains("1,200"));
        assert!(html.contains("<td class=\"role-mafia\">10</td>"));
        assert!(html.contains("Far East"));
        assert!(html.contains("Showing 1-2 of 2 players (2 total)"));
        assert!(html.contains("<option value=\"2024\" selected>2024</option>"));
        assert!(!html.contains("No results."));
    }

    #[test]
    fn non_web_stats_urls_render_as_plain_names() {
        let csv = "name,year,stats_url\n\
                   Sokolov,2024,javascript:alert(1)\n\
                   Belov,2024,/relative/path\n\
                   Volkov,2024,http://example.com/v\n";
        let ds = load_players_from_reader(csv.as_bytes()).unwrap();
        let state = TableState::initial(&ds, PageSize::DEFAULT);
        let view = derive(ds.rows(), &state);
        let html = table_page(&site(), &ds, &state, &view);

        assert!(!html.contains("javascript:"));
        assert!(!html.contains("/relative/path"));
        assert!(html.contains("<td>Sokolov</td>"));
        assert!(html.contains("<td>Belov</td>"));
        assert!(html.contains("<a href=\"http://example.com/v\""));
    }

    #[test]
    fn sorted_header_shows_arrow_and_next_direction() {
        let ds = dataset();
        let state = TableState::initial(&ds, PageSize::DEFAULT)
            .apply(TableAction::ToggleSort(ColumnId::Name));
        let view = derive(ds.rows(), &state);
        let html = table_page(&site(), &ds, &state, &view);
        assert!(html.contains("Name \u{2191}</a>"));
        assert!(html.contains("sort=name&amp;dir=desc"));
    }

    #[test]
    fn empty_view_says_no_results() {
        let ds = dataset();
        let state = TableState::initial(&ds, PageSize::DEFAULT)
            .apply(TableAction::SetGlobalFilter("zzz".into()));
        let view = derive(ds.rows(), &state);
        let html = table_page(&site(), &ds, &state, &view);
        assert!(html.contains("No results."));
        assert!(html.contains("<span class=\"disabled\">Previous</span>"));
        assert!(html.contains("<span class=\"disabled\">Next</span>"));
        assert!(html.contains("Page 0 of 0"));
    }

    #[test]
    fn error_page_details_are_optional() {
        let actions = [Action {
            href: "/",
            label: "Home",
        }];
        let without = error_page(&site(), "Oops", "Broken", &actions, None);
        assert!(!without.contains("<details>"));
        assert!(without.contains("<a href=\"/\">Home</a>"));

        let with = error_page(&site(), "Oops", "Broken", &actions, Some("io <error>"));
        assert!(with.contains("<details>"));
        assert!(with.contains("io &lt;error&gt;"));
    }
}
