// Table view model: column definitions, typed filters, the state reducer,
// and the derived page of rows.

pub mod column;
pub mod filter;
pub mod state;
pub mod view;

pub use column::{ColumnId, ColumnKind};
pub use filter::{ColumnFilter, FilterError, FilterPredicate};
pub use state::{PageSize, Pagination, SortDirection, SortKey, TableAction, TableState};
pub use view::{derive, PageLink, TableView};
