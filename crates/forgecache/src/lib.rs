//! Forgecache - a local snapshot cache for hosted repository metadata.
//!
//! This library maintains a persistent mirror of repository metadata
//! (stats, description, topics, README, language breakdown) fetched from
//! an external code hosting API, so that expensive, rate-limited remote
//! lookups are not repeated on every request.
//!
//! # Features
//!
//! - `migrate` - Enables database migration support. When enabled, you can
//!   use [`connect_and_migrate`] to automatically run migrations on
//!   connection. On by default.
//! - `sqlite` / `postgres` - Select the sea-orm database backend.
//!
//! # Example
//!
//! ```ignore
//! use forgecache::{connect_and_migrate, FreshnessPolicy, HostingClient, HostingConfig, Synchronizer};
//! use std::sync::Arc;
//!
//! let db = connect_and_migrate("sqlite://forgecache.db?mode=rwc").await?;
//! let client = HostingClient::new(HostingConfig::default())?;
//! let sync = Synchronizer::new(db, Arc::new(client), FreshnessPolicy::default());
//!
//! // Read-through fetch: served from cache when fresh, refreshed when stale.
//! let snapshot = sync.get_by_full_name("rust-lang/rust").await?;
//! println!("{} stars: {}", snapshot.full_name, snapshot.stars);
//! ```

pub mod db;
pub mod entity;
pub mod freshness;
pub mod hosting;
pub mod http;
pub mod retry;
pub mod snapshot;
pub mod sync;

#[cfg(feature = "migrate")]
pub mod migration;

pub use db::connect;
#[cfg(feature = "migrate")]
pub use db::connect_and_migrate;
pub use entity::prelude::*;
pub use freshness::FreshnessPolicy;
pub use hosting::{HostingApi, HostingClient, HostingConfig, HostingError};
pub use snapshot::StoreError;
pub use sync::{BulkSyncResult, RepoRef, SyncError, Synchronizer};
