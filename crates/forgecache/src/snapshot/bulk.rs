use sea_orm::{
    DatabaseConnection, EntityTrait,
    sea_query::OnConflict,
};

use crate::entity::repo_snapshot::{ActiveModel, Column, Entity as RepoSnapshot};

use super::errors::{Result, StoreError};

// ─── Bulk Operations ─────────────────────────────────────────────────────────

/// Bulk upsert snapshots using a single SQL ON CONFLICT statement.
///
/// Used when saving remote search results or a user's repository listing,
/// where inserting one row at a time would cost a round trip per repository.
/// Conflict detection is the external id; all core columns are overwritten
/// on conflict while enrichment columns (README, languages) and sync
/// bookkeeping keep their stored values.
///
/// # Returns
/// The number of rows inserted or updated.
pub async fn bulk_upsert(db: &DatabaseConnection, models: Vec<ActiveModel>) -> Result<u64> {
    if models.is_empty() {
        return Ok(0);
    }

    tracing::debug!(count = models.len(), "bulk upserting snapshots");

    RepoSnapshot::insert_many(models)
        .on_conflict(build_upsert_on_conflict())
        .exec_without_returning(db)
        .await
        .map_err(StoreError::from)
}

/// Build the ON CONFLICT clause used by bulk upsert.
///
/// Enrichment columns (readme, readme_fetched_at, languages) and sync_error
/// are deliberately absent from the update list: bulk paths only carry core
/// fields, and overwriting would erase independently cached data.
pub(crate) fn build_upsert_on_conflict() -> OnConflict {
    OnConflict::column(Column::ExternalId)
        .update_columns([
            Column::FullName,
            Column::Owner,
            Column::Name,
            Column::Description,
            Column::HtmlUrl,
            Column::CloneUrl,
            Column::PrimaryLanguage,
            Column::DefaultBranch,
            Column::LicenseSpdx,
            Column::Topics,
            Column::IsPrivate,
            Column::IsFork,
            Column::Stars,
            Column::Forks,
            Column::Watchers,
            Column::OpenIssues,
            Column::LastSyncedAt,
        ])
        .to_owned()
}
