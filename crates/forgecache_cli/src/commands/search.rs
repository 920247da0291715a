use console::style;
use forgecache::RepoSnapshotModel;
use forgecache::hosting::SearchOptions;
use forgecache::snapshot::{Pagination, SearchFilters};

use crate::commands::limits::OutputFormat;
use crate::config::Config;

pub(crate) struct SearchArgs {
    pub(crate) language: Option<String>,
    pub(crate) min_stars: Option<i32>,
    pub(crate) no_forks: bool,
    pub(crate) remote: bool,
    pub(crate) page: u64,
    pub(crate) limit: u64,
    pub(crate) format: OutputFormat,
}

/// Handle the search command.
pub(crate) async fn handle(
    query: &str,
    args: SearchArgs,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let (_db, sync) = config.synchronizer(false).await?;

    if args.remote {
        let options = SearchOptions {
            per_page: args.limit.min(100) as u32,
            page: args.page as u32 + 1, // the host counts pages from 1
            ..SearchOptions::default()
        };
        let stored = sync.search_and_cache(query, &options).await?;
        println!(
            "{} cached {} repositories from the host\n",
            style("✓").green(),
            stored.len()
        );
        print_snapshots(&stored, args.format)?;
        return Ok(());
    }

    let filters = SearchFilters {
        language: args.language,
        min_stars: args.min_stars,
        include_forks: !args.no_forks,
    };
    let result = sync
        .search_cached(query, &filters, Pagination::new(args.page, args.limit))
        .await?;

    print_snapshots(&result.items, args.format)?;
    if matches!(args.format, OutputFormat::Table) {
        println!(
            "{}",
            style(format!(
                "page {}/{} ({} total)",
                result.page + 1,
                result.total_pages.max(1),
                result.total
            ))
            .dim()
        );
    }
    Ok(())
}

/// Handle the top command: most-starred cached repositories.
pub(crate) async fn handle_top(
    limit: u64,
    format: OutputFormat,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let url = config.database_url()?;
    let db = forgecache::connect_and_migrate(&url).await?;
    let top = forgecache::snapshot::find_top_by_stars(&db, limit).await?;
    print_snapshots(&top, format)?;
    Ok(())
}

/// One row of the search/top output table.
#[derive(Debug, serde::Serialize, tabled::Tabled)]
struct SnapshotRow {
    #[tabled(rename = "Repository")]
    repository: String,
    #[tabled(rename = "Stars")]
    stars: i32,
    #[tabled(rename = "Language")]
    language: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl From<&RepoSnapshotModel> for SnapshotRow {
    fn from(model: &RepoSnapshotModel) -> Self {
        const MAX_DESCRIPTION: usize = 60;
        let mut description = model.description.clone().unwrap_or_default();
        if description.chars().count() > MAX_DESCRIPTION {
            description = format!(
                "{}…",
                description.chars().take(MAX_DESCRIPTION).collect::<String>()
            );
        }
        Self {
            repository: model.full_name.clone(),
            stars: model.stars,
            language: model.primary_language.clone().unwrap_or_default(),
            description,
        }
    }
}

fn print_snapshots(
    snapshots: &[RepoSnapshotModel],
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Table => {
            if snapshots.is_empty() {
                println!("{}", style("no results").dim());
                return Ok(());
            }
            let rows: Vec<SnapshotRow> = snapshots.iter().map(SnapshotRow::from).collect();
            let mut table = tabled::Table::new(rows);
            table.with(tabled::settings::Style::rounded());
            println!("{table}");
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(snapshots)?);
        }
    }
    Ok(())
}
