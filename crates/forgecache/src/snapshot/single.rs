use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder,
};

use crate::entity::repo_snapshot::{ActiveModel, Column, Entity as RepoSnapshot, Model};

use super::errors::{Result, StoreError};

// ─── Single Record Operations ────────────────────────────────────────────────

/// Insert a new snapshot.
///
/// # Errors
/// Returns `StoreError::Database` if the insert fails (e.g., the external id
/// already exists).
pub async fn insert(db: &DatabaseConnection, model: ActiveModel) -> Result<Model> {
    model.insert(db).await.map_err(StoreError::from)
}

/// Update an existing snapshot. Only `Set` fields are written.
///
/// # Errors
/// Returns `StoreError::Database` if the update fails or no row matches.
pub async fn update(db: &DatabaseConnection, model: ActiveModel) -> Result<Model> {
    model.update(db).await.map_err(StoreError::from)
}

/// Find a snapshot by the host-assigned external id.
pub async fn find_by_external_id(db: &DatabaseConnection, external_id: i64) -> Result<Option<Model>> {
    RepoSnapshot::find_by_id(external_id)
        .one(db)
        .await
        .map_err(StoreError::from)
}

/// Find a snapshot by its "owner/name" full name.
///
/// `full_name` is denormalized and not unique: after an upstream rename a
/// stale snapshot can briefly claim the same name as a newly created one.
/// The most recently synced match wins.
pub async fn find_by_full_name(db: &DatabaseConnection, full_name: &str) -> Result<Option<Model>> {
    RepoSnapshot::find()
        .filter(Column::FullName.eq(full_name))
        .order_by_desc(Column::LastSyncedAt)
        .one(db)
        .await
        .map_err(StoreError::from)
}

/// Insert or update a snapshot keyed by its external id.
///
/// If a snapshot with the same external id exists, the `Set` fields of
/// `model` are merged into it; fields left `NotSet` keep their stored
/// values (a core refresh does not clobber a cached README). Otherwise a
/// new row is inserted.
///
/// Safe to call repeatedly with identical input, and safe under concurrent
/// callers targeting the same external id: a lost insert race degrades into
/// an update of the row the winner created (last write wins per field).
pub async fn upsert(db: &DatabaseConnection, model: ActiveModel) -> Result<Model> {
    let external_id = required_active_value("external_id", &model.external_id)?;

    let existing = find_by_external_id(db, external_id).await?;

    match existing {
        Some(_) => update(db, model).await,
        None => match model.clone().insert(db).await {
            Ok(inserted) => Ok(inserted),
            // Concurrent caller inserted the same external id between our
            // check and insert; fall back to updating their row.
            Err(err) if is_unique_violation(&err) => update(db, model).await,
            Err(err) => Err(StoreError::from(err)),
        },
    }
}

/// Delete a snapshot by external id. Administrative use only; the
/// synchronizer never deletes.
///
/// Returns the number of rows deleted (0 or 1).
pub async fn delete(db: &DatabaseConnection, external_id: i64) -> Result<u64> {
    let result = RepoSnapshot::delete_by_id(external_id).exec(db).await?;
    Ok(result.rows_affected)
}

fn required_active_value<T: Clone + Into<sea_orm::Value>>(
    field: &str,
    value: &ActiveValue<T>,
) -> Result<T> {
    match value {
        ActiveValue::Set(value) | ActiveValue::Unchanged(value) => Ok(value.clone()),
        ActiveValue::NotSet => Err(StoreError::InvalidInput {
            message: format!("Missing required field: {}", field),
        }),
    }
}

/// Check whether a database error is a primary-key/unique constraint violation.
fn is_unique_violation(err: &DbErr) -> bool {
    match err {
        DbErr::Exec(_) | DbErr::Query(_) => {
            let msg = err.to_string().to_lowercase();
            // SQLite: "UNIQUE constraint failed"
            // PostgreSQL: "duplicate key value violates unique constraint"
            msg.contains("unique") || msg.contains("duplicate key")
        }
        _ => false,
    }
}
