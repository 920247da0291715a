//! Common re-exports for convenient entity usage.

pub use super::language::LanguageStat;
pub use super::repo_snapshot::{
    ActiveModel as RepoSnapshotActiveModel, Column as RepoSnapshotColumn, Entity as RepoSnapshot,
    Model as RepoSnapshotModel,
};
