//! Conversion from hosting wire types to snapshot models.

use chrono::{DateTime, Utc};
use sea_orm::Set;

use crate::entity::repo_snapshot::ActiveModel;

use super::types::RemoteRepo;

/// Maximum stored description length, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 1_000;

/// Maximum stored README length, in characters.
pub const MAX_README_CHARS: usize = 50_000;

/// Build a snapshot active model from a fetched repository.
///
/// Core fields and sync bookkeeping are `Set`; enrichment fields (README,
/// languages) are left `NotSet` so an upsert never clobbers independently
/// cached data. `last_synced_at` is stamped and `sync_error` cleared -
/// this function is only called with a successful fetch in hand.
pub fn to_active_model(repo: &RemoteRepo, synced_at: DateTime<Utc>) -> ActiveModel {
    ActiveModel {
        external_id: Set(repo.id),
        full_name: Set(repo.full_name.clone()),
        owner: Set(repo.owner_login()),
        name: Set(repo.name.clone()),
        description: Set(repo
            .description
            .as_deref()
            .map(|d| truncate_chars(d, MAX_DESCRIPTION_CHARS))),
        html_url: Set(repo.html_url.clone()),
        clone_url: Set(repo.clone_url.clone()),
        primary_language: Set(repo.language.clone()),
        default_branch: Set(repo
            .default_branch
            .clone()
            .unwrap_or_else(|| "main".to_string())),
        license_spdx: Set(repo.license_spdx()),
        topics: Set(serde_json::json!(repo.topics)),
        is_private: Set(repo.private),
        is_fork: Set(repo.fork),
        stars: Set(repo.stargazers_count),
        forks: Set(repo.forks_count),
        watchers: Set(repo.watchers_count),
        open_issues: Set(repo.open_issues_count),
        last_synced_at: Set(Some(synced_at.fixed_offset())),
        sync_error: Set(None),
        ..Default::default()
    }
}

/// Truncate a string to at most `max` characters on a char boundary.
#[must_use]
pub fn truncate_chars(input: &str, max: usize) -> String {
    match input.char_indices().nth(max) {
        Some((idx, _)) => input[..idx].to_string(),
        None => input.to_string(),
    }
}
