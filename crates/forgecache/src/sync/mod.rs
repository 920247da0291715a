//! Read-through synchronization between the snapshot store and the host.
//!
//! The [`Synchronizer`] is the subsystem's state machine: consult the
//! store, apply the freshness policy, call the hosting client for missing
//! or stale pieces, upsert the result, and fall back to the last known
//! good snapshot when a refresh fails. Availability is prioritized over
//! freshness once a cached copy exists.
//!
//! # Module Structure
//!
//! - [`progress`] - Progress reporting: `SyncProgress`, `ProgressCallback`, `emit()`
//! - [`bulk`] - Bulk fan-out: `bulk_sync()`, `RepoRef`, `BulkSyncResult`
//!
//! # Example
//!
//! ```ignore
//! use forgecache::sync::{BulkOptions, RepoRef, Synchronizer};
//!
//! async fn warm(sync: &Synchronizer) {
//!     let targets = vec![
//!         RepoRef::new("acme", "widget"),
//!         RepoRef::new("acme", "gadget"),
//!     ];
//!     let result = sync.bulk_sync(targets, &BulkOptions::default(), None).await;
//!     println!("{} synced, {} failed", result.succeeded.len(), result.failed.len());
//! }
//! ```

pub mod bulk;
mod errors;
mod flight;
mod progress;
mod service;

// Re-export the public surface
pub use bulk::{BulkFailure, BulkOptions, BulkSyncResult, RepoRef};
pub use errors::SyncError;
pub use progress::{ProgressCallback, SyncProgress, emit};
pub use service::Synchronizer;

/// Default number of concurrent repository syncs in a bulk operation.
pub const DEFAULT_BULK_CONCURRENCY: usize = 8;

/// Initial backoff delay in milliseconds for rate-limited retries.
pub const INITIAL_BACKOFF_MS: u64 = 1_000;

/// Maximum backoff delay in milliseconds for rate-limited retries.
pub const MAX_BACKOFF_MS: u64 = 60_000;

/// Maximum retries for a single sync operation when retrying is enabled.
pub const MAX_SYNC_RETRIES: u32 = 3;
