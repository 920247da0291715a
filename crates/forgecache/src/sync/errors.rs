use thiserror::Error;

use crate::hosting::HostingError;
use crate::snapshot::StoreError;

/// Errors surfaced by the synchronizer.
///
/// First-time fetch failures propagate with the hosting taxonomy intact;
/// refresh failures on an existing snapshot are recorded on the snapshot
/// and suppressed, so callers only see errors when there is nothing to
/// fall back to.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Snapshot store failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Hosting API failure.
    #[error(transparent)]
    Hosting(#[from] HostingError),

    /// A repository reference that is not of the form "owner/name".
    #[error("Invalid repository reference: {value}")]
    InvalidReference { value: String },
}

impl SyncError {
    /// Whether this error means the repository exists neither in the cache
    /// nor upstream.
    #[inline]
    pub fn is_not_found(&self) -> bool {
        match self {
            SyncError::Store(StoreError::NotFound { .. }) => true,
            SyncError::Hosting(err) => err.is_not_found(),
            _ => false,
        }
    }

    /// Whether this error is a host rate limit (retryable by callers).
    #[inline]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, SyncError::Hosting(err) if err.is_rate_limited())
    }
}
