//! Freshness policy for cached snapshots.
//!
//! Pure decision functions over snapshot timestamps. Different
//! sub-resources of a repository change at different rates - stars move
//! daily while the README and language mix move rarely - so core fields,
//! README, and language breakdown each carry their own staleness rule.

use chrono::{DateTime, Duration, Utc};

use crate::entity::repo_snapshot::Model;

/// Staleness windows for a snapshot's sub-resources.
///
/// The window is a single configurable value per sub-resource; callers
/// with different tolerances construct different policies rather than
/// hard-coding thresholds at call sites.
#[derive(Debug, Clone, Copy)]
pub struct FreshnessPolicy {
    /// Maximum age of the core fields (stats, description, topics) before
    /// a refresh is attempted.
    pub core_max_age: Duration,
    /// Maximum age of a fetched README before a refresh is attempted.
    pub readme_max_age: Duration,
}

impl Default for FreshnessPolicy {
    /// Point-lookup defaults: 1 hour for core fields, 7 days for the README.
    fn default() -> Self {
        Self {
            core_max_age: Duration::hours(1),
            readme_max_age: Duration::days(7),
        }
    }
}

impl FreshnessPolicy {
    /// Create a policy with explicit windows.
    #[must_use]
    pub fn new(core_max_age: Duration, readme_max_age: Duration) -> Self {
        Self {
            core_max_age,
            readme_max_age,
        }
    }

    /// Relaxed policy for overview/detail pages that tolerate day-old stats.
    #[must_use]
    pub fn relaxed() -> Self {
        Self {
            core_max_age: Duration::hours(24),
            ..Self::default()
        }
    }

    /// Whether the snapshot's core fields must be refreshed from the host.
    ///
    /// True when the snapshot has never successfully synced or the last
    /// successful sync is older than [`core_max_age`](Self::core_max_age).
    #[must_use]
    pub fn needs_core_refresh(&self, snapshot: &Model, now: DateTime<Utc>) -> bool {
        match snapshot.last_synced_at {
            None => true,
            Some(synced_at) => now.signed_duration_since(synced_at) > self.core_max_age,
        }
    }

    /// Whether the snapshot's README must be refreshed from the host.
    ///
    /// True when no README text is cached, or the last fetch is unknown or
    /// older than [`readme_max_age`](Self::readme_max_age).
    #[must_use]
    pub fn needs_readme_refresh(&self, snapshot: &Model, now: DateTime<Utc>) -> bool {
        if !snapshot.has_readme() {
            return true;
        }
        match snapshot.readme_fetched_at {
            None => true,
            Some(fetched_at) => now.signed_duration_since(fetched_at) > self.readme_max_age,
        }
    }

    /// Whether the snapshot's language breakdown must be refreshed.
    ///
    /// Languages carry no time-based expiry: once fetched they are treated
    /// as stable until explicitly re-synced.
    #[must_use]
    pub fn needs_languages_refresh(&self, snapshot: &Model) -> bool {
        snapshot.language_stats().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_synced_at(last_synced_at: Option<DateTime<Utc>>) -> Model {
        Model {
            external_id: 1,
            full_name: "acme/widget".to_string(),
            owner: "acme".to_string(),
            name: "widget".to_string(),
            description: None,
            html_url: None,
            clone_url: None,
            primary_language: None,
            default_branch: "main".to_string(),
            license_spdx: None,
            topics: serde_json::json!([]),
            is_private: false,
            is_fork: false,
            stars: 0,
            forks: 0,
            watchers: 0,
            open_issues: 0,
            languages: serde_json::json!([]),
            readme: None,
            readme_fetched_at: None,
            last_synced_at: last_synced_at.map(|t| t.fixed_offset()),
            sync_error: None,
        }
    }

    #[test]
    fn core_is_fresh_when_just_synced() {
        let now = Utc::now();
        let snapshot = snapshot_synced_at(Some(now));
        assert!(!FreshnessPolicy::default().needs_core_refresh(&snapshot, now));
    }

    #[test]
    fn core_is_stale_past_the_window() {
        let now = Utc::now();
        let snapshot = snapshot_synced_at(Some(now - Duration::hours(2)));
        assert!(FreshnessPolicy::default().needs_core_refresh(&snapshot, now));
    }

    #[test]
    fn core_is_stale_when_never_synced() {
        let snapshot = snapshot_synced_at(None);
        assert!(FreshnessPolicy::default().needs_core_refresh(&snapshot, Utc::now()));
    }

    #[test]
    fn relaxed_policy_tolerates_older_core_fields() {
        let now = Utc::now();
        let snapshot = snapshot_synced_at(Some(now - Duration::hours(2)));

        assert!(FreshnessPolicy::default().needs_core_refresh(&snapshot, now));
        assert!(!FreshnessPolicy::relaxed().needs_core_refresh(&snapshot, now));

        let day_old = snapshot_synced_at(Some(now - Duration::hours(25)));
        assert!(FreshnessPolicy::relaxed().needs_core_refresh(&day_old, now));
    }

    #[test]
    fn readme_refresh_when_absent_or_empty() {
        let now = Utc::now();
        let policy = FreshnessPolicy::default();

        let mut snapshot = snapshot_synced_at(Some(now));
        assert!(policy.needs_readme_refresh(&snapshot, now));

        snapshot.readme = Some(String::new());
        snapshot.readme_fetched_at = Some(now.fixed_offset());
        assert!(policy.needs_readme_refresh(&snapshot, now));
    }

    #[test]
    fn readme_fresh_within_window_and_stale_after() {
        let now = Utc::now();
        let policy = FreshnessPolicy::default();

        let mut snapshot = snapshot_synced_at(Some(now));
        snapshot.readme = Some("# Widget".to_string());
        snapshot.readme_fetched_at = Some((now - Duration::days(3)).fixed_offset());
        assert!(!policy.needs_readme_refresh(&snapshot, now));

        snapshot.readme_fetched_at = Some((now - Duration::days(8)).fixed_offset());
        assert!(policy.needs_readme_refresh(&snapshot, now));

        snapshot.readme_fetched_at = None;
        assert!(policy.needs_readme_refresh(&snapshot, now));
    }

    #[test]
    fn languages_refresh_only_when_empty() {
        let now = Utc::now();
        let policy = FreshnessPolicy::default();

        let mut snapshot = snapshot_synced_at(Some(now - Duration::days(365)));
        assert!(policy.needs_languages_refresh(&snapshot));

        snapshot.languages = serde_json::json!([
            {"name": "Rust", "bytes": 100, "percentage": 100}
        ]);
        // No time-based expiry, even a year later
        assert!(!policy.needs_languages_refresh(&snapshot));
    }
}
