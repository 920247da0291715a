//! Typed client for the external code hosting API.
//!
//! This module wraps the host's repository, search, README, languages,
//! user-listing, and rate-limit endpoints behind a small typed surface,
//! translating transport and HTTP-status failures into the
//! [`HostingError`] taxonomy. The client applies a bounded per-request
//! timeout through its transport and never retries on its own - retry
//! policy belongs to the synchronizer and its callers.
//!
//! # Example
//!
//! ```ignore
//! use forgecache::hosting::{HostingApi, HostingClient, HostingConfig};
//!
//! let client = HostingClient::new(HostingConfig {
//!     token: std::env::var("FORGECACHE_HOSTING_TOKEN").ok(),
//!     ..HostingConfig::default()
//! })?;
//! let repo = client.get_repository("rust-lang", "rust").await?;
//! println!("{} has {} stars", repo.full_name, repo.stargazers_count);
//! ```

mod api;
mod client;
mod convert;
mod error;
mod types;

pub use api::HostingApi;
pub use client::{DEFAULT_API_BASE, DEFAULT_TIMEOUT, HostingClient, HostingConfig};
pub use convert::{MAX_DESCRIPTION_CHARS, MAX_README_CHARS, to_active_model, truncate_chars};
pub use error::{HostingError, Result, short_error_message};
pub use types::{
    ListOptions, RateLimitResources, RateLimitStatus, RateLimitWindow, RemoteLicense, RemoteOwner,
    RemoteRepo, SearchOptions, SearchResponse, SearchSort,
};
