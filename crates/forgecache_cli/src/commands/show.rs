use console::style;
use forgecache::RepoSnapshotModel;

use crate::config::Config;

/// Handle the show command: fetch-or-refresh one snapshot and print it.
pub(crate) async fn handle(
    reference: &str,
    readme: bool,
    languages: bool,
    relaxed: bool,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let (_db, sync) = config.synchronizer(relaxed).await?;

    // A bare number is an external id, anything else is "owner/name"
    let snapshot = match reference.parse::<i64>() {
        Ok(external_id) => sync.get_by_external_id(external_id).await?,
        Err(_) => sync.get_by_full_name(reference).await?,
    };

    print_snapshot(&snapshot);

    if languages {
        let stats = sync.load_languages(snapshot.external_id).await?;
        if stats.is_empty() {
            println!("\n{}", style("no language data").dim());
        } else {
            println!("\n{}", style("Languages").bold());
            for stat in stats {
                println!("  {:<16} {:>3}%  ({} bytes)", stat.name, stat.percentage, stat.bytes);
            }
        }
    }

    if readme {
        match sync.load_readme(snapshot.external_id).await? {
            Some(text) => println!("\n{}\n{}", style("README").bold(), text),
            None => println!("\n{}", style("no readme").dim()),
        }
    }

    Ok(())
}

fn print_snapshot(snapshot: &RepoSnapshotModel) {
    println!(
        "{} {}",
        style(&snapshot.full_name).bold(),
        style(format!("#{}", snapshot.external_id)).dim()
    );
    if let Some(description) = &snapshot.description {
        println!("{description}");
    }
    println!(
        "★ {}  ⑂ {}  issues {}  watchers {}",
        snapshot.stars, snapshot.forks, snapshot.open_issues, snapshot.watchers
    );
    if let Some(language) = &snapshot.primary_language {
        println!("language: {language}");
    }
    if let Some(license) = &snapshot.license_spdx {
        println!("license: {license}");
    }
    let topics = snapshot.topic_list();
    if !topics.is_empty() {
        println!("topics: {}", topics.join(", "));
    }
    if let Some(url) = &snapshot.html_url {
        println!("{url}");
    }
    match &snapshot.last_synced_at {
        Some(synced) => println!("{}", style(format!("synced {synced}")).dim()),
        None => println!("{}", style("never synced").dim()),
    }
    if let Some(error) = &snapshot.sync_error {
        println!(
            "{} {}",
            style("stale:").yellow().bold(),
            style(error).yellow()
        );
    }
}
