//! The trait seam between the synchronizer and the hosting API.

use std::collections::HashMap;

use async_trait::async_trait;

use super::error::Result;
use super::types::{ListOptions, RateLimitStatus, RemoteRepo, SearchOptions, SearchResponse};

/// Read-only interface to the external hosting API.
///
/// The synchronizer consumes the client through this trait so tests can
/// substitute a scripted fake without network access or global state. The
/// production implementation is [`HostingClient`](super::HostingClient),
/// constructed explicitly and injected where needed.
///
/// # Implementation notes
///
/// Implementors should:
/// - Apply a bounded per-request timeout
/// - Never retry automatically - retry policy belongs to the caller
/// - Translate failures into the [`HostingError`](super::HostingError) taxonomy
/// - Treat a missing README as data (`Ok(None)`), not an error
#[async_trait]
pub trait HostingApi: Send + Sync {
    /// Fetch a repository by owner and name.
    async fn get_repository(&self, owner: &str, name: &str) -> Result<RemoteRepo>;

    /// Fetch a repository by its host-assigned numeric id.
    ///
    /// Resolves the current repository even after renames or transfers.
    async fn get_repository_by_id(&self, id: i64) -> Result<RemoteRepo>;

    /// Search repositories on the host.
    async fn search_repositories(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<SearchResponse>;

    /// Fetch the repository README as raw text.
    ///
    /// Returns `Ok(None)` when the repository has no README.
    async fn get_readme(&self, owner: &str, name: &str) -> Result<Option<String>>;

    /// Fetch the repository's language byte counts.
    async fn get_languages(&self, owner: &str, name: &str) -> Result<HashMap<String, i64>>;

    /// List a user's public repositories (one page).
    async fn get_user_repositories(
        &self,
        username: &str,
        options: &ListOptions,
    ) -> Result<Vec<RemoteRepo>>;

    /// Get the current rate limit status.
    async fn get_rate_limit_status(&self) -> Result<RateLimitStatus>;
}
