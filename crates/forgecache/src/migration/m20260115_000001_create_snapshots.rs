//! Initial migration to create the repository snapshot table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RepoSnapshots::Table)
                    .if_not_exists()
                    // Identity: the host-assigned id, stable across renames
                    .col(
                        ColumnDef::new(RepoSnapshots::ExternalId)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    // Naming
                    .col(ColumnDef::new(RepoSnapshots::FullName).string().not_null())
                    .col(ColumnDef::new(RepoSnapshots::Owner).string().not_null())
                    .col(ColumnDef::new(RepoSnapshots::Name).string().not_null())
                    // Content
                    .col(ColumnDef::new(RepoSnapshots::Description).text().null())
                    .col(ColumnDef::new(RepoSnapshots::HtmlUrl).text().null())
                    .col(ColumnDef::new(RepoSnapshots::CloneUrl).text().null())
                    .col(
                        ColumnDef::new(RepoSnapshots::PrimaryLanguage)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(RepoSnapshots::DefaultBranch)
                            .string()
                            .not_null()
                            .default("main"),
                    )
                    .col(ColumnDef::new(RepoSnapshots::LicenseSpdx).string().null())
                    .col(
                        ColumnDef::new(RepoSnapshots::Topics)
                            .json()
                            .not_null()
                            .default(Expr::cust("'[]'")),
                    )
                    // Visibility
                    .col(
                        ColumnDef::new(RepoSnapshots::IsPrivate)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(RepoSnapshots::IsFork)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    // Statistics
                    .col(
                        ColumnDef::new(RepoSnapshots::Stars)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(RepoSnapshots::Forks)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(RepoSnapshots::Watchers)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(RepoSnapshots::OpenIssues)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    // Enrichments
                    .col(
                        ColumnDef::new(RepoSnapshots::Languages)
                            .json()
                            .not_null()
                            .default(Expr::cust("'[]'")),
                    )
                    .col(ColumnDef::new(RepoSnapshots::Readme).text().null())
                    .col(
                        ColumnDef::new(RepoSnapshots::ReadmeFetchedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    // Sync bookkeeping
                    .col(
                        ColumnDef::new(RepoSnapshots::LastSyncedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(RepoSnapshots::SyncError).text().null())
                    .to_owned(),
            )
            .await?;

        // Secondary lookup by full name. Deliberately NOT unique: full_name is
        // denormalized and an upstream rename can briefly leave two snapshots
        // claiming the same name until the older one re-syncs.
        manager
            .create_index(
                Index::create()
                    .name("idx_repo_snapshots_full_name")
                    .table(RepoSnapshots::Table)
                    .col(RepoSnapshots::FullName)
                    .to_owned(),
            )
            .await?;

        // Index on stars (descending) for top-repositories queries
        manager
            .create_index(
                Index::create()
                    .name("idx_repo_snapshots_stars")
                    .table(RepoSnapshots::Table)
                    .col((RepoSnapshots::Stars, IndexOrder::Desc))
                    .to_owned(),
            )
            .await?;

        // Index on last_synced_at for stale scans
        manager
            .create_index(
                Index::create()
                    .name("idx_repo_snapshots_synced")
                    .table(RepoSnapshots::Table)
                    .col(RepoSnapshots::LastSyncedAt)
                    .to_owned(),
            )
            .await?;

        // Composite index on (is_private, stars) backing the cached search,
        // which always filters to public repositories
        manager
            .create_index(
                Index::create()
                    .name("idx_repo_snapshots_private_stars")
                    .table(RepoSnapshots::Table)
                    .col(RepoSnapshots::IsPrivate)
                    .col((RepoSnapshots::Stars, IndexOrder::Desc))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RepoSnapshots::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
#[sea_orm(iden = "repo_snapshots")]
enum RepoSnapshots {
    Table,
    ExternalId,
    FullName,
    Owner,
    Name,
    Description,
    HtmlUrl,
    CloneUrl,
    PrimaryLanguage,
    DefaultBranch,
    LicenseSpdx,
    Topics,
    IsPrivate,
    IsFork,
    Stars,
    Forks,
    Watchers,
    OpenIssues,
    Languages,
    Readme,
    ReadmeFetchedAt,
    LastSyncedAt,
    SyncError,
}
