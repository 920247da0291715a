use console::style;
use forgecache::sync::{BulkOptions, ProgressCallback, RepoRef, SyncProgress};

use crate::config::Config;

/// Handle the warm command: bulk-sync a list of repositories.
pub(crate) async fn handle(
    repos: &[String],
    concurrency: Option<usize>,
    retry: bool,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let targets = repos
        .iter()
        .map(|reference| RepoRef::parse(reference))
        .collect::<Result<Vec<_>, _>>()?;

    let (_db, sync) = config.synchronizer(false).await?;

    let options = BulkOptions {
        concurrency: concurrency.unwrap_or(config.sync.concurrency),
        retry_rate_limited: retry || config.sync.retry_rate_limited,
    };

    let on_progress: ProgressCallback = Box::new(|event| match event {
        SyncProgress::Synced { full_name } => {
            println!("{} {}", style("✓").green(), full_name);
        }
        SyncProgress::SyncFailed { full_name, error } => {
            println!("{} {} ({})", style("✗").red(), full_name, style(error).dim());
        }
        SyncProgress::RateLimitBackoff {
            full_name,
            retry_after_ms,
            attempt,
        } => {
            println!(
                "{} {} rate limited, retry {} in {}ms",
                style("…").yellow(),
                full_name,
                attempt,
                retry_after_ms
            );
        }
        _ => {}
    });

    let result = sync.bulk_sync(targets, &options, Some(&on_progress)).await;

    println!(
        "\n{} synced, {} failed",
        style(result.succeeded.len()).green().bold(),
        if result.failed.is_empty() {
            style(0).dim()
        } else {
            style(result.failed.len()).red().bold()
        }
    );

    if !result.failed.is_empty() {
        std::process::exit(2);
    }
    Ok(())
}
