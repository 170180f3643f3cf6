//! In-memory catalog and the views derived from it

pub mod related;
pub mod resolver;
pub mod sort;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use related::{related_to, DEFAULT_RELATED_LIMIT};
pub use resolver::{resolve, resolve_query, Resolution};
pub use sort::{filter_records, sort_records, SortKey};
pub use store::{CatalogStore, StoreStatus};
