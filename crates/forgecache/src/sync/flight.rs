//! Per-key in-flight guards for collapsing concurrent refreshes.
//!
//! Concurrent callers that each observe a stale snapshot for the same key
//! would each issue a remote fetch. Holding the key's guard across the
//! check-fetch-upsert sequence serializes them: the first caller fetches,
//! later callers re-check freshness after acquiring and skip the fetch.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// A mutex-guarded map from key to a shared per-key async lock.
///
/// Entries are weakly held: a key's lock lives only as long as some caller
/// holds or awaits it, and dead entries are pruned on the next acquire.
#[derive(Clone, Default)]
pub(crate) struct FlightMap {
    inner: Arc<Mutex<HashMap<String, Weak<AsyncMutex<()>>>>>,
}

/// Holds the per-key lock until dropped.
pub(crate) struct FlightGuard {
    _permit: OwnedMutexGuard<()>,
}

impl FlightMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the guard for `key`, waiting for any in-flight holder.
    pub async fn acquire(&self, key: impl Into<String>) -> FlightGuard {
        let key = key.into();
        let lock = {
            let mut map = self
                .inner
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            map.retain(|_, weak| weak.strong_count() > 0);
            match map.get(&key).and_then(Weak::upgrade) {
                Some(existing) => existing,
                None => {
                    let created = Arc::new(AsyncMutex::new(()));
                    map.insert(key, Arc::downgrade(&created));
                    created
                }
            }
        };

        FlightGuard {
            _permit: lock.lock_owned().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn same_key_holders_are_serialized() {
        let flights = FlightMap::new();
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..10 {
            let flights = flights.clone();
            let active = Arc::clone(&active);
            let peak = Arc::clone(&peak);
            handles.push(tokio::spawn(async move {
                let _guard = flights.acquire("core:42").await;
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                active.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.expect("task");
        }

        assert_eq!(peak.load(Ordering::SeqCst), 1, "guards must not overlap");
    }

    #[tokio::test]
    async fn different_keys_do_not_block_each_other() {
        let flights = FlightMap::new();
        let _first = flights.acquire("core:1").await;

        // Acquiring a different key while the first is held must not wait
        let second = tokio::time::timeout(Duration::from_secs(1), flights.acquire("core:2"))
            .await
            .expect("different key should be immediately available");
        drop(second);
    }

    #[tokio::test]
    async fn key_is_reusable_after_release() {
        let flights = FlightMap::new();
        {
            let _guard = flights.acquire("core:1").await;
        }
        // Entry was weakly held; re-acquiring allocates a fresh lock
        let _again = tokio::time::timeout(Duration::from_secs(1), flights.acquire("core:1"))
            .await
            .expect("released key should be available");
    }
}
