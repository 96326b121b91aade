//! Resource details table for ocmscope
//!
//! This crate flattens topology nodes into resource rows and provides the
//! filtering, sorting, pagination and page-size persistence behind the
//! details table.

mod pagination;
mod rows;
mod store;
mod table;

pub use pagination::{DEFAULT_PAGE_SIZE, PAGE_SIZES, Pagination};
pub use rows::{build_rows, sort_by_status};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError, page_size_key, restore_page_size};
pub use table::{Column, DetailsTable, SortBy, SortDirection, filter_rows, sort_rows};

// Re-export types used in our public API
pub use ocmscope_types::{Pulse, ResourceRow, ResourceType, TopologyNode};
