use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Condition, Expr, Func, LikeExpr};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait, QueryFilter, QueryOrder,
};

use crate::entity::repo_snapshot::{Column, Entity as RepoSnapshot, Model};

use super::errors::{Result, StoreError};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    /// Page number (0-indexed).
    pub page: u64,
    /// Items per page.
    pub per_page: u64,
}

const MIN_PER_PAGE: u64 = 1;

impl Pagination {
    /// Create a new pagination with the given page and per_page values.
    pub fn new(page: u64, per_page: u64) -> Self {
        Self {
            page,
            per_page: per_page.max(MIN_PER_PAGE),
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 0,
            per_page: 20,
        }
    }
}

/// Result of a paginated query.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    /// The items for the current page.
    pub items: Vec<T>,
    /// Total number of items across all pages.
    pub total: u64,
    /// Current page number (0-indexed).
    pub page: u64,
    /// Items per page.
    pub per_page: u64,
    /// Total number of pages.
    pub total_pages: u64,
}

/// Optional filters for cached snapshot search.
///
/// Private repositories are always excluded regardless of filters.
#[derive(Debug, Clone)]
pub struct SearchFilters {
    /// Only snapshots whose primary language matches (case-insensitive).
    pub language: Option<String>,
    /// Only snapshots with at least this many stars.
    pub min_stars: Option<i32>,
    /// Whether forks are included in results.
    pub include_forks: bool,
}

impl Default for SearchFilters {
    fn default() -> Self {
        Self {
            language: None,
            min_stars: None,
            include_forks: true,
        }
    }
}

// ─── Query Operations ────────────────────────────────────────────────────────

/// Search cached snapshots by a case-insensitive substring over name and
/// description.
///
/// Only public repositories are returned. Results where the *name* matches
/// rank above description-only matches, then by star count descending.
pub async fn search_by_text(
    db: &DatabaseConnection,
    query: &str,
    filters: &SearchFilters,
    pagination: Pagination,
) -> Result<PaginatedResult<Model>> {
    let pattern = format!("%{}%", escape_like(&query.to_lowercase()));
    let name_matches = Expr::expr(Func::lower(Expr::col(Column::Name)))
        .like(LikeExpr::new(&pattern).escape('\\'));
    let description_matches = Expr::expr(Func::lower(Expr::col(Column::Description)))
        .like(LikeExpr::new(&pattern).escape('\\'));

    let mut select = RepoSnapshot::find()
        .filter(Column::IsPrivate.eq(false))
        .filter(
            Condition::any()
                .add(name_matches.clone())
                .add(description_matches),
        );

    if let Some(language) = &filters.language {
        select = select.filter(
            Expr::expr(Func::lower(Expr::col(Column::PrimaryLanguage)))
                .eq(language.to_lowercase()),
        );
    }
    if let Some(min_stars) = filters.min_stars {
        select = select.filter(Column::Stars.gte(min_stars));
    }
    if !filters.include_forks {
        select = select.filter(Column::IsFork.eq(false));
    }

    let paginator = select
        .order_by(name_matches, Order::Desc)
        .order_by_desc(Column::Stars)
        .order_by_asc(Column::FullName)
        .paginate(db, pagination.per_page);

    let total = paginator.num_items().await?;
    let total_pages = paginator.num_pages().await?;
    let items = paginator.fetch_page(pagination.page).await?;

    Ok(PaginatedResult {
        items,
        total,
        page: pagination.page,
        per_page: pagination.per_page,
        total_pages,
    })
}

/// Find the public snapshots with the highest star counts.
pub async fn find_top_by_stars(db: &DatabaseConnection, limit: u64) -> Result<Vec<Model>> {
    RepoSnapshot::find()
        .filter(Column::IsPrivate.eq(false))
        .order_by_desc(Column::Stars)
        .paginate(db, limit.max(1))
        .fetch_page(0)
        .await
        .map_err(StoreError::from)
}

/// Find snapshots whose core fields haven't been refreshed since the given
/// time, oldest first. Never-synced snapshots are included.
///
/// Returns up to `limit` snapshots; used by background re-sync sweeps.
pub async fn find_stale(
    db: &DatabaseConnection,
    older_than: DateTime<Utc>,
    limit: u64,
) -> Result<Vec<Model>> {
    RepoSnapshot::find()
        .filter(
            Condition::any()
                .add(Column::LastSyncedAt.is_null())
                .add(Column::LastSyncedAt.lt(older_than)),
        )
        .order_by_asc(Column::LastSyncedAt)
        .paginate(db, limit.max(1))
        .fetch_page(0)
        .await
        .map_err(StoreError::from)
}

/// Count total snapshots.
pub async fn count(db: &DatabaseConnection) -> Result<u64> {
    RepoSnapshot::find()
        .count(db)
        .await
        .map_err(StoreError::from)
}

/// Escape LIKE wildcards in user-supplied search text.
fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(all(test, feature = "migrate"))]
mod tests {
    use chrono::{Duration, Utc};
    use sea_orm::Set;

    use crate::connect_and_migrate;
    use crate::entity::repo_snapshot::ActiveModel;
    use crate::snapshot;

    use super::*;

    async fn setup_db() -> DatabaseConnection {
        connect_and_migrate("sqlite::memory:")
            .await
            .expect("test db should migrate")
    }

    struct Seed {
        external_id: i64,
        name: &'static str,
        description: Option<&'static str>,
        stars: i32,
        language: Option<&'static str>,
        is_private: bool,
        is_fork: bool,
    }

    impl Seed {
        fn new(external_id: i64, name: &'static str, stars: i32) -> Self {
            Self {
                external_id,
                name,
                description: None,
                stars,
                language: None,
                is_private: false,
                is_fork: false,
            }
        }
    }

    async fn seed(db: &DatabaseConnection, seeds: Vec<Seed>) {
        let now = Utc::now().fixed_offset();
        for s in seeds {
            let model = ActiveModel {
                external_id: Set(s.external_id),
                full_name: Set(format!("acme/{}", s.name)),
                owner: Set("acme".to_string()),
                name: Set(s.name.to_string()),
                description: Set(s.description.map(|d| d.to_string())),
                html_url: Set(None),
                clone_url: Set(None),
                primary_language: Set(s.language.map(|l| l.to_string())),
                default_branch: Set("main".to_string()),
                license_spdx: Set(None),
                topics: Set(serde_json::json!([])),
                is_private: Set(s.is_private),
                is_fork: Set(s.is_fork),
                stars: Set(s.stars),
                forks: Set(0),
                watchers: Set(0),
                open_issues: Set(0),
                languages: Set(serde_json::json!([])),
                readme: Set(None),
                readme_fetched_at: Set(None),
                last_synced_at: Set(Some(now)),
                sync_error: Set(None),
            };
            snapshot::insert(db, model).await.expect("seed insert");
        }
    }

    #[tokio::test]
    async fn search_matches_name_and_description_case_insensitively() {
        let db = setup_db().await;
        seed(
            &db,
            vec![
                Seed {
                    description: Some("A terminal widget toolkit"),
                    ..Seed::new(1, "tui-kit", 50)
                },
                Seed::new(2, "WidgetFactory", 10),
                Seed::new(3, "unrelated", 999),
            ],
        )
        .await;

        let result = search_by_text(&db, "WIDGET", &SearchFilters::default(), Pagination::default())
            .await
            .expect("search should succeed");

        assert_eq!(result.total, 2);
        let names: Vec<&str> = result.items.iter().map(|m| m.name.as_str()).collect();
        assert!(names.contains(&"tui-kit"));
        assert!(names.contains(&"WidgetFactory"));
    }

    #[tokio::test]
    async fn search_ranks_name_matches_before_description_matches() {
        let db = setup_db().await;
        seed(
            &db,
            vec![
                Seed {
                    description: Some("mentions widget only in description"),
                    ..Seed::new(1, "popular", 10_000)
                },
                Seed::new(2, "widget", 3),
            ],
        )
        .await;

        let result = search_by_text(&db, "widget", &SearchFilters::default(), Pagination::default())
            .await
            .expect("search should succeed");

        assert_eq!(result.items[0].name, "widget");
        assert_eq!(result.items[1].name, "popular");
    }

    #[tokio::test]
    async fn search_orders_by_stars_within_same_relevance() {
        let db = setup_db().await;
        seed(
            &db,
            vec![
                Seed::new(1, "widget-a", 5),
                Seed::new(2, "widget-b", 500),
                Seed::new(3, "widget-c", 50),
            ],
        )
        .await;

        let result = search_by_text(&db, "widget", &SearchFilters::default(), Pagination::default())
            .await
            .expect("search should succeed");

        let stars: Vec<i32> = result.items.iter().map(|m| m.stars).collect();
        assert_eq!(stars, vec![500, 50, 5]);
    }

    #[tokio::test]
    async fn search_excludes_private_snapshots() {
        let db = setup_db().await;
        seed(
            &db,
            vec![
                Seed::new(1, "widget-public", 5),
                Seed {
                    is_private: true,
                    ..Seed::new(2, "widget-private", 500)
                },
            ],
        )
        .await;

        let result = search_by_text(&db, "widget", &SearchFilters::default(), Pagination::default())
            .await
            .expect("search should succeed");

        assert_eq!(result.total, 1);
        assert_eq!(result.items[0].name, "widget-public");
    }

    #[tokio::test]
    async fn search_applies_filters() {
        let db = setup_db().await;
        seed(
            &db,
            vec![
                Seed {
                    language: Some("Rust"),
                    ..Seed::new(1, "widget-rs", 100)
                },
                Seed {
                    language: Some("Go"),
                    ..Seed::new(2, "widget-go", 200)
                },
                Seed {
                    language: Some("Rust"),
                    is_fork: true,
                    ..Seed::new(3, "widget-fork", 300)
                },
                Seed {
                    language: Some("Rust"),
                    ..Seed::new(4, "widget-small", 1)
                },
            ],
        )
        .await;

        let filters = SearchFilters {
            language: Some("rust".to_string()),
            min_stars: Some(50),
            include_forks: false,
        };
        let result = search_by_text(&db, "widget", &filters, Pagination::default())
            .await
            .expect("search should succeed");

        assert_eq!(result.total, 1);
        assert_eq!(result.items[0].name, "widget-rs");
    }

    #[tokio::test]
    async fn search_escapes_like_wildcards() {
        let db = setup_db().await;
        seed(
            &db,
            vec![Seed::new(1, "plain", 10), Seed::new(2, "100%rust", 20)],
        )
        .await;

        let result = search_by_text(&db, "%", &SearchFilters::default(), Pagination::default())
            .await
            .expect("search should succeed");

        // A literal "%" must not act as a wildcard matching everything
        assert_eq!(result.total, 1);
        assert_eq!(result.items[0].name, "100%rust");
    }

    #[tokio::test]
    async fn search_paginates() {
        let db = setup_db().await;
        // Distinct star counts give a stable order
        seed(
            &db,
            vec![
                Seed::new(1, "widget-1", 10),
                Seed::new(2, "widget-2", 20),
                Seed::new(3, "widget-3", 30),
                Seed::new(4, "widget-4", 40),
                Seed::new(5, "widget-5", 50),
            ],
        )
        .await;

        let page0 = search_by_text(
            &db,
            "widget",
            &SearchFilters::default(),
            Pagination::new(0, 2),
        )
        .await
        .expect("page 0");
        assert_eq!(page0.total, 5);
        assert_eq!(page0.total_pages, 3);
        assert_eq!(page0.items.len(), 2);
        assert_eq!(page0.items[0].stars, 50);

        let page2 = search_by_text(
            &db,
            "widget",
            &SearchFilters::default(),
            Pagination::new(2, 2),
        )
        .await
        .expect("page 2");
        assert_eq!(page2.items.len(), 1);
        assert_eq!(page2.items[0].stars, 10);
    }

    #[tokio::test]
    async fn find_top_by_stars_skips_private() {
        let db = setup_db().await;
        seed(
            &db,
            vec![
                Seed::new(1, "small", 5),
                Seed::new(2, "big", 500),
                Seed {
                    is_private: true,
                    ..Seed::new(3, "hidden", 9_000)
                },
            ],
        )
        .await;

        let top = find_top_by_stars(&db, 2).await.expect("top query");
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].name, "big");
        assert_eq!(top[1].name, "small");
    }

    #[tokio::test]
    async fn find_stale_orders_oldest_first_and_honors_limit() {
        let db = setup_db().await;
        let now = Utc::now();
        seed(&db, vec![Seed::new(1, "a", 0), Seed::new(2, "b", 0), Seed::new(3, "c", 0)]).await;

        // Age the snapshots
        for (id, days) in [(1, 20), (2, 10), (3, 0)] {
            let patch = ActiveModel {
                external_id: Set(id),
                last_synced_at: Set(Some((now - Duration::days(days)).fixed_offset())),
                ..Default::default()
            };
            snapshot::update(&db, patch).await.expect("age update");
        }

        let stale = find_stale(&db, now - Duration::days(2), 2)
            .await
            .expect("find_stale should succeed");

        assert_eq!(stale.len(), 2);
        assert_eq!(stale[0].name, "a");
        assert_eq!(stale[1].name, "b");
    }

    #[tokio::test]
    async fn count_counts_everything() {
        let db = setup_db().await;
        seed(
            &db,
            vec![
                Seed::new(1, "a", 0),
                Seed {
                    is_private: true,
                    ..Seed::new(2, "b", 0)
                },
            ],
        )
        .await;
        assert_eq!(count(&db).await.expect("count"), 2);
    }

    #[test]
    fn escape_like_escapes_all_wildcards() {
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
        assert_eq!(escape_like("plain"), "plain");
    }
}
