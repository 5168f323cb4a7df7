pub mod query;
pub mod types;

pub use query::SearchQuery;
pub use types::{PageInfo, PageRequest, SearchFilters, SortDirection, SortKey};
