//! Progress reporting types for sync operations.

/// Progress events emitted during bulk synchronization.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum SyncProgress {
    /// A bulk sync batch is starting.
    BatchStarted {
        /// Number of repositories in the batch.
        total: usize,
    },

    /// A repository synced successfully.
    Synced {
        /// The repository's "owner/name".
        full_name: String,
    },

    /// A repository failed to sync.
    SyncFailed {
        /// The repository's "owner/name".
        full_name: String,
        /// Error message.
        error: String,
    },

    /// Rate limited, backing off before retry.
    RateLimitBackoff {
        /// The repository's "owner/name".
        full_name: String,
        /// Time to wait before retry (ms).
        retry_after_ms: u64,
        /// Current attempt number.
        attempt: u32,
    },

    /// A bulk sync batch finished.
    BatchCompleted {
        /// Number of repositories that synced.
        succeeded: usize,
        /// Number of repositories that failed.
        failed: usize,
    },
}

/// Callback for progress updates during sync operations.
pub type ProgressCallback = Box<dyn Fn(SyncProgress) + Send + Sync>;

/// Emit a progress event if a callback is provided.
#[inline]
pub fn emit(on_progress: Option<&ProgressCallback>, event: SyncProgress) {
    if let Some(cb) = on_progress {
        cb(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn emit_with_callback_invokes_it() {
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = Arc::clone(&count);

        let callback: ProgressCallback = Box::new(move |_event| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        emit(Some(&callback), SyncProgress::BatchStarted { total: 3 });
        emit(
            Some(&callback),
            SyncProgress::BatchCompleted {
                succeeded: 2,
                failed: 1,
            },
        );

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn emit_without_callback_is_a_no_op() {
        emit(None, SyncProgress::BatchStarted { total: 3 });
    }

    #[test]
    fn events_carry_their_context_in_debug_output() {
        let event = SyncProgress::SyncFailed {
            full_name: "acme/widget".to_string(),
            error: "Rate limit exceeded".to_string(),
        };
        let debug_str = format!("{:?}", event);
        assert!(debug_str.contains("acme/widget"));
        assert!(debug_str.contains("Rate limit exceeded"));
    }
}
