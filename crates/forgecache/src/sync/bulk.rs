//! Bulk synchronization with partial-failure tolerance.

use std::fmt;
use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::entity::repo_snapshot::Model;
use crate::retry::with_retry;

use super::errors::SyncError;
use super::progress::{ProgressCallback, SyncProgress, emit};
use super::service::Synchronizer;
use super::DEFAULT_BULK_CONCURRENCY;

/// A repository reference by owner and name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Parse an "owner/name" reference.
    pub fn parse(reference: &str) -> Result<Self, SyncError> {
        match reference.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok(Self::new(owner, name))
            }
            _ => Err(SyncError::InvalidReference {
                value: reference.to_string(),
            }),
        }
    }

    /// The "owner/name" form.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Options for a bulk sync.
#[derive(Debug, Clone)]
pub struct BulkOptions {
    /// Maximum concurrent repository syncs.
    pub concurrency: usize,
    /// Retry rate-limited fetches with exponential backoff instead of
    /// recording them as failures.
    pub retry_rate_limited: bool,
}

impl Default for BulkOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_BULK_CONCURRENCY,
            retry_rate_limited: false,
        }
    }
}

/// One failed entry of a bulk sync.
#[derive(Debug)]
pub struct BulkFailure {
    /// The repository that failed.
    pub repo: RepoRef,
    /// Why it failed.
    pub error: SyncError,
}

/// Outcome of a bulk sync: successes and failures collected independently.
#[derive(Debug, Default)]
pub struct BulkSyncResult {
    pub succeeded: Vec<Model>,
    pub failed: Vec<BulkFailure>,
}

impl Synchronizer {
    /// Synchronize a batch of repositories concurrently.
    ///
    /// All targets run through the read-through sync; one failure never
    /// aborts the batch. Used for pre-warming a set of repositories, e.g.
    /// a recruiter linking several example repos to a job post.
    pub async fn bulk_sync(
        &self,
        targets: Vec<RepoRef>,
        options: &BulkOptions,
        on_progress: Option<&ProgressCallback>,
    ) -> BulkSyncResult {
        emit(
            on_progress,
            SyncProgress::BatchStarted {
                total: targets.len(),
            },
        );

        let semaphore = Arc::new(Semaphore::new(options.concurrency.max(1)));
        let mut handles = Vec::with_capacity(targets.len());
        for target in targets {
            let semaphore = Arc::clone(&semaphore);
            let service = self.clone();
            let retry = options.retry_rate_limited;
            handles.push(tokio::spawn(async move {
                // The semaphore lives for the whole batch and is never closed
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("bulk semaphore closed");
                let result = service.sync_target(&target, retry).await;
                (target, result)
            }));
        }

        let mut result = BulkSyncResult::default();
        for handle in handles {
            match handle.await {
                Ok((_, Ok(model))) => {
                    emit(
                        on_progress,
                        SyncProgress::Synced {
                            full_name: model.full_name.clone(),
                        },
                    );
                    result.succeeded.push(model);
                }
                Ok((target, Err(error))) => {
                    emit(
                        on_progress,
                        SyncProgress::SyncFailed {
                            full_name: target.full_name(),
                            error: error.to_string(),
                        },
                    );
                    result.failed.push(BulkFailure {
                        repo: target,
                        error,
                    });
                }
                Err(join_err) => {
                    tracing::warn!(error = %join_err, "bulk sync task did not complete");
                }
            }
        }

        emit(
            on_progress,
            SyncProgress::BatchCompleted {
                succeeded: result.succeeded.len(),
                failed: result.failed.len(),
            },
        );
        result
    }

    async fn sync_target(&self, target: &RepoRef, retry_rate_limited: bool) -> Result<Model, SyncError> {
        let full_name = target.full_name();
        if retry_rate_limited {
            with_retry(
                || self.get_by_full_name(&full_name),
                |err: &SyncError| err.is_rate_limited(),
                &full_name,
                None,
            )
            .await
        } else {
            self.get_by_full_name(&full_name).await
        }
    }
}
