//! The read-through synchronizer.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{DatabaseConnection, Set};

use crate::entity::language::{LanguageStat, language_breakdown};
use crate::entity::repo_snapshot::{ActiveModel, Model};
use crate::freshness::FreshnessPolicy;
use crate::hosting::{
    HostingApi, HostingError, ListOptions, MAX_README_CHARS, RateLimitStatus, RemoteRepo,
    SearchOptions, short_error_message, to_active_model, truncate_chars,
};
use crate::snapshot::{self, PaginatedResult, Pagination, SearchFilters, StoreError};

use super::errors::SyncError;
use super::flight::FlightMap;

/// Read-through synchronizer between the snapshot store and the host.
///
/// Cheap to clone: the database handle and client are shared. All
/// dependencies are injected; tests substitute a fake [`HostingApi`].
#[derive(Clone)]
pub struct Synchronizer {
    db: Arc<DatabaseConnection>,
    client: Arc<dyn HostingApi>,
    policy: FreshnessPolicy,
    flights: FlightMap,
}

impl Synchronizer {
    /// Create a synchronizer over a store and hosting client.
    pub fn new(
        db: impl Into<Arc<DatabaseConnection>>,
        client: Arc<dyn HostingApi>,
        policy: FreshnessPolicy,
    ) -> Self {
        Self {
            db: db.into(),
            client,
            policy,
            flights: FlightMap::new(),
        }
    }

    /// The freshness policy this synchronizer applies.
    pub fn policy(&self) -> &FreshnessPolicy {
        &self.policy
    }

    /// Get a snapshot by its host-assigned id, fetching or refreshing as
    /// the freshness policy requires.
    ///
    /// - Cache miss: fetch from the host; failures propagate (there is
    ///   nothing to fall back to).
    /// - Stale hit: attempt a refresh; on failure the stale snapshot is
    ///   returned with `sync_error` recorded.
    /// - Fresh hit: returned as-is with zero remote calls.
    pub async fn get_by_external_id(&self, external_id: i64) -> Result<Model, SyncError> {
        if let Some(model) = snapshot::find_by_external_id(&self.db, external_id).await?
            && !self.policy.needs_core_refresh(&model, Utc::now())
        {
            return Ok(model);
        }
        self.refresh_by_external_id(external_id).await
    }

    /// Get a snapshot by "owner/name", fetching or refreshing as the
    /// freshness policy requires.
    ///
    /// This is the find-or-create path: a cache miss fetches by owner and
    /// name, and the snapshot is keyed by the external id the host returns.
    /// It is the only path that can discover a new external id.
    pub async fn get_by_full_name(&self, full_name: &str) -> Result<Model, SyncError> {
        let (owner, name) = parse_full_name(full_name)?;

        if let Some(model) = snapshot::find_by_full_name(&self.db, full_name).await? {
            if !self.policy.needs_core_refresh(&model, Utc::now()) {
                return Ok(model);
            }
            // Identity is known: refresh by id so an upstream rename still
            // lands on the same snapshot.
            return self.refresh_by_external_id(model.external_id).await;
        }

        let _guard = self.flights.acquire(format!("name:{full_name}")).await;
        // A concurrent caller may have created the snapshot while we waited
        if let Some(model) = snapshot::find_by_full_name(&self.db, full_name).await?
            && !self.policy.needs_core_refresh(&model, Utc::now())
        {
            return Ok(model);
        }

        match self.client.get_repository(owner, name).await {
            Ok(repo) => Ok(self.persist_fetched(&repo).await?),
            Err(err) => match snapshot::find_by_full_name(&self.db, full_name).await? {
                Some(model) => Ok(self.record_refresh_failure(model, &err).await),
                None => Err(err.into()),
            },
        }
    }

    /// Load the repository README, refreshing it from the host when the
    /// cached copy is absent or older than the policy's window.
    ///
    /// Refresh failures are swallowed: the README is an enrichment, so the
    /// cached value (possibly `None`) is served instead of an error.
    pub async fn load_readme(&self, external_id: i64) -> Result<Option<String>, SyncError> {
        let current = self.get_by_external_id(external_id).await?;
        if !self.policy.needs_readme_refresh(&current, Utc::now()) {
            return Ok(current.readme);
        }

        let _guard = self.flights.acquire(format!("readme:{external_id}")).await;
        let current = snapshot::find_by_external_id(&self.db, external_id)
            .await?
            .unwrap_or(current);
        if !self.policy.needs_readme_refresh(&current, Utc::now()) {
            return Ok(current.readme);
        }

        match self.client.get_readme(&current.owner, &current.name).await {
            Ok(text) => {
                let capped = text.map(|t| truncate_chars(&t, MAX_README_CHARS));
                let patch = ActiveModel {
                    external_id: Set(external_id),
                    readme: Set(capped.clone()),
                    readme_fetched_at: Set(Some(Utc::now().fixed_offset())),
                    ..Default::default()
                };
                snapshot::update(&self.db, patch).await?;
                Ok(capped)
            }
            Err(err) => {
                tracing::debug!(
                    external_id,
                    error = %short_error_message(&err),
                    "readme refresh failed, serving cached value"
                );
                Ok(current.readme)
            }
        }
    }

    /// Load the repository's language breakdown, fetching it from the host
    /// when it has never been fetched.
    ///
    /// Refresh failures are swallowed like README failures.
    pub async fn load_languages(&self, external_id: i64) -> Result<Vec<LanguageStat>, SyncError> {
        let current = self.get_by_external_id(external_id).await?;
        if !self.policy.needs_languages_refresh(&current) {
            return Ok(current.language_stats());
        }

        let _guard = self.flights.acquire(format!("languages:{external_id}")).await;
        let current = snapshot::find_by_external_id(&self.db, external_id)
            .await?
            .unwrap_or(current);
        if !self.policy.needs_languages_refresh(&current) {
            return Ok(current.language_stats());
        }

        match self
            .client
            .get_languages(&current.owner, &current.name)
            .await
        {
            Ok(bytes_by_language) => {
                let stats = language_breakdown(&bytes_by_language);
                let stats_json =
                    serde_json::to_value(&stats).unwrap_or_else(|_| serde_json::json!([]));
                let patch = ActiveModel {
                    external_id: Set(external_id),
                    languages: Set(stats_json),
                    ..Default::default()
                };
                snapshot::update(&self.db, patch).await?;
                Ok(stats)
            }
            Err(err) => {
                tracing::debug!(
                    external_id,
                    error = %short_error_message(&err),
                    "languages refresh failed, serving cached value"
                );
                Ok(current.language_stats())
            }
        }
    }

    /// Search cached snapshots only; no remote calls.
    pub async fn search_cached(
        &self,
        query: &str,
        filters: &SearchFilters,
        pagination: Pagination,
    ) -> Result<PaginatedResult<Model>, SyncError> {
        Ok(snapshot::search_by_text(&self.db, query, filters, pagination).await?)
    }

    /// Search the host and cache every result, returning the stored
    /// snapshots.
    pub async fn search_and_cache(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<Model>, SyncError> {
        let response = self.client.search_repositories(query, options).await?;
        self.store_remote_batch(&response.items).await
    }

    /// Fetch one page of a user's repositories and cache them all,
    /// returning the stored snapshots. Used to pre-warm a profile.
    pub async fn sync_user_repositories(
        &self,
        username: &str,
        options: &ListOptions,
    ) -> Result<Vec<Model>, SyncError> {
        let repos = self.client.get_user_repositories(username, options).await?;
        self.store_remote_batch(&repos).await
    }

    /// Current rate limit status of the hosting API.
    pub async fn rate_limit_status(&self) -> Result<RateLimitStatus, SyncError> {
        Ok(self.client.get_rate_limit_status().await?)
    }

    // ─── Internals ───────────────────────────────────────────────────────────

    /// Refresh (or create) the snapshot for an external id under its
    /// flight guard, falling back to the stale copy on remote failure.
    async fn refresh_by_external_id(&self, external_id: i64) -> Result<Model, SyncError> {
        let _guard = self.flights.acquire(format!("core:{external_id}")).await;

        // Re-check under the guard: the previous holder may have refreshed it
        let existing = snapshot::find_by_external_id(&self.db, external_id).await?;
        if let Some(model) = &existing
            && !self.policy.needs_core_refresh(model, Utc::now())
        {
            return Ok(model.clone());
        }

        match self.client.get_repository_by_id(external_id).await {
            Ok(repo) => Ok(self.persist_fetched(&repo).await?),
            Err(err) => match existing {
                Some(model) => Ok(self.record_refresh_failure(model, &err).await),
                None => Err(err.into()),
            },
        }
    }

    async fn persist_fetched(&self, repo: &RemoteRepo) -> Result<Model, StoreError> {
        snapshot::upsert(&self.db, to_active_model(repo, Utc::now())).await
    }

    /// Record a refresh failure on the existing snapshot (best-effort) and
    /// return the stale copy with `sync_error` set. `last_synced_at` is
    /// deliberately untouched.
    async fn record_refresh_failure(&self, model: Model, err: &HostingError) -> Model {
        let message = short_error_message(err);
        tracing::debug!(
            external_id = model.external_id,
            error = %message,
            "serving stale snapshot after refresh failure"
        );

        let patch = ActiveModel {
            external_id: Set(model.external_id),
            sync_error: Set(Some(message.clone())),
            ..Default::default()
        };
        if let Err(persist_err) = snapshot::update(&self.db, patch).await {
            tracing::debug!(
                external_id = model.external_id,
                error = %persist_err,
                "failed to record sync error"
            );
        }

        Model {
            sync_error: Some(message),
            ..model
        }
    }

    /// Bulk-upsert a batch of fetched repositories and read back the stored rows.
    async fn store_remote_batch(&self, repos: &[RemoteRepo]) -> Result<Vec<Model>, SyncError> {
        let now = Utc::now();
        let models = repos.iter().map(|r| to_active_model(r, now)).collect();
        snapshot::bulk_upsert(&self.db, models).await?;

        let mut stored = Vec::with_capacity(repos.len());
        for repo in repos {
            if let Some(model) = snapshot::find_by_external_id(&self.db, repo.id).await? {
                stored.push(model);
            }
        }
        Ok(stored)
    }
}

fn parse_full_name(full_name: &str) -> Result<(&str, &str), SyncError> {
    match full_name.split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
            Ok((owner, name))
        }
        _ => Err(SyncError::InvalidReference {
            value: full_name.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_name_accepts_owner_slash_name() {
        assert_eq!(parse_full_name("acme/widget").unwrap(), ("acme", "widget"));
    }

    #[test]
    fn parse_full_name_rejects_malformed_references() {
        for input in ["", "acme", "/widget", "acme/", "a/b/c"] {
            let err = parse_full_name(input).expect_err("should reject");
            assert!(matches!(err, SyncError::InvalidReference { .. }), "{input}");
        }
    }
}
