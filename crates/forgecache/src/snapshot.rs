//! Snapshot store - CRUD and query operations for repository snapshots.
//!
//! This module provides functions for reading, upserting, and searching
//! snapshot records, including a bulk upsert for saving remote search and
//! listing results efficiently.

mod bulk;
mod errors;
mod query;
mod single;

pub use bulk::bulk_upsert;
pub use errors::{Result, StoreError};
pub use query::{
    PaginatedResult, Pagination, SearchFilters, count, find_stale, find_top_by_stars,
    search_by_text,
};
pub use single::{delete, find_by_external_id, find_by_full_name, insert, update, upsert};
