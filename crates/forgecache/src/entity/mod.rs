//! SeaORM entity definitions for the snapshot cache schema.

pub mod language;
pub mod prelude;
pub mod repo_snapshot;
