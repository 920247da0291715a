//! RepoSnapshot entity - the locally persisted mirror of one hosted repository.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::entity::language::LanguageStat;

/// RepoSnapshot model - cached metadata for one externally hosted repository.
///
/// Identity is the host-assigned numeric id, which never changes even when
/// the repository is renamed or transferred. `full_name` is a denormalized
/// lookup field and may go stale between syncs after an upstream rename.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "repo_snapshots")]
pub struct Model {
    /// Host-assigned numeric repository id. Immutable.
    #[sea_orm(primary_key, auto_increment = false)]
    pub external_id: i64,

    // ─── Naming ──────────────────────────────────────────────────────────────
    /// "owner/name" as reported by the host. Mutable upstream on rename.
    pub full_name: String,
    /// Owner login (user or organization).
    pub owner: String,
    /// Repository name (URL-safe slug).
    pub name: String,

    // ─── Content ─────────────────────────────────────────────────────────────
    /// Repository description, truncated to 1000 characters on ingest.
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    /// Canonical web URL of the repository.
    #[sea_orm(column_type = "Text", nullable)]
    pub html_url: Option<String>,
    /// HTTPS clone URL.
    #[sea_orm(column_type = "Text", nullable)]
    pub clone_url: Option<String>,
    /// Primary programming language.
    pub primary_language: Option<String>,
    /// Default branch name.
    #[sea_orm(default_value = "main")]
    pub default_branch: String,
    /// License SPDX identifier (best-effort extraction).
    pub license_spdx: Option<String>,
    /// Repository topics/tags (stored as JSON array for cross-database compatibility).
    #[sea_orm(column_type = "Json")]
    pub topics: Json,

    // ─── Visibility ──────────────────────────────────────────────────────────
    /// Whether the repository is private on the host.
    #[sea_orm(default_value = false)]
    pub is_private: bool,
    /// Whether this is a fork of another repository.
    #[sea_orm(default_value = false)]
    pub is_fork: bool,

    // ─── Statistics ──────────────────────────────────────────────────────────
    // Overwritten wholesale on each core refresh; never incremented locally.
    /// Star count.
    pub stars: i32,
    /// Fork count.
    pub forks: i32,
    /// Watcher count.
    pub watchers: i32,
    /// Open issue count.
    pub open_issues: i32,

    // ─── Enrichments ─────────────────────────────────────────────────────────
    /// Language breakdown as a JSON array of `{name, bytes, percentage}`,
    /// ordered by byte count descending. Cached independently of core fields.
    #[sea_orm(column_type = "Json")]
    pub languages: Json,
    /// Raw README text, capped at 50,000 characters.
    #[sea_orm(column_type = "Text", nullable)]
    pub readme: Option<String>,
    /// When the README was last fetched (also recorded when the host has none).
    pub readme_fetched_at: Option<DateTimeWithTimeZone>,

    // ─── Sync bookkeeping ────────────────────────────────────────────────────
    /// When core fields were last successfully refreshed from the host.
    /// A failed refresh never updates this.
    pub last_synced_at: Option<DateTimeWithTimeZone>,
    /// Last refresh failure message; cleared on the next successful refresh.
    #[sea_orm(column_type = "Text", nullable)]
    pub sync_error: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Parse the cached language breakdown.
    ///
    /// Returns an empty list when languages have never been fetched or the
    /// stored JSON does not parse (treated as never fetched).
    pub fn language_stats(&self) -> Vec<LanguageStat> {
        serde_json::from_value(self.languages.clone()).unwrap_or_default()
    }

    /// Parse the cached topic list.
    pub fn topic_list(&self) -> Vec<String> {
        serde_json::from_value(self.topics.clone()).unwrap_or_default()
    }

    /// Whether a non-empty README is cached.
    pub fn has_readme(&self) -> bool {
        self.readme.as_deref().is_some_and(|r| !r.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn make_test_model(owner: &str, name: &str) -> Model {
        Model {
            external_id: 12345,
            full_name: format!("{owner}/{name}"),
            owner: owner.to_string(),
            name: name.to_string(),
            description: Some("A test repository".to_string()),
            html_url: Some(format!("https://example.com/{owner}/{name}")),
            clone_url: Some(format!("https://example.com/{owner}/{name}.git")),
            primary_language: Some("Rust".to_string()),
            default_branch: "main".to_string(),
            license_spdx: Some("MIT".to_string()),
            topics: serde_json::json!(["rust", "cli"]),
            is_private: false,
            is_fork: false,
            stars: 100,
            forks: 10,
            watchers: 50,
            open_issues: 5,
            languages: serde_json::json!([]),
            readme: None,
            readme_fetched_at: None,
            last_synced_at: Some(Utc::now().fixed_offset()),
            sync_error: None,
        }
    }

    #[test]
    fn language_stats_parses_stored_json() {
        let mut model = make_test_model("octocat", "hello-world");
        model.languages = serde_json::json!([
            {"name": "Rust", "bytes": 900, "percentage": 90},
            {"name": "Shell", "bytes": 100, "percentage": 10}
        ]);

        let stats = model.language_stats();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].name, "Rust");
        assert_eq!(stats[0].bytes, 900);
        assert_eq!(stats[1].percentage, 10);
    }

    #[test]
    fn language_stats_is_empty_for_unfetched_or_malformed_json() {
        let model = make_test_model("octocat", "hello-world");
        assert!(model.language_stats().is_empty());

        let mut malformed = make_test_model("octocat", "hello-world");
        malformed.languages = serde_json::json!({"not": "a list"});
        assert!(malformed.language_stats().is_empty());
    }

    #[test]
    fn topic_list_parses_stored_json() {
        let model = make_test_model("octocat", "hello-world");
        assert_eq!(model.topic_list(), vec!["rust", "cli"]);
    }

    #[test]
    fn has_readme_requires_non_empty_text() {
        let mut model = make_test_model("octocat", "hello-world");
        assert!(!model.has_readme());

        model.readme = Some(String::new());
        assert!(!model.has_readme());

        model.readme = Some("# Hello".to_string());
        assert!(model.has_readme());
    }
}
