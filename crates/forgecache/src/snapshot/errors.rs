use sea_orm::DbErr;
use thiserror::Error;

/// Errors that can occur during snapshot store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sea-orm.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// Snapshot not found.
    #[error("Snapshot not found: {context}")]
    NotFound { context: String },

    /// Invalid input data.
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

impl StoreError {
    /// Create a NotFound error for an external id lookup.
    pub fn not_found_by_external_id(external_id: i64) -> Self {
        Self::NotFound {
            context: format!("external_id={}", external_id),
        }
    }

    /// Create a NotFound error for a full name lookup.
    pub fn not_found_by_full_name(full_name: &str) -> Self {
        Self::NotFound {
            context: full_name.to_string(),
        }
    }
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
