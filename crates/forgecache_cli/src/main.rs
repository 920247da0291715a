//! Forgecache CLI - operational interface for the repository snapshot cache.

mod commands;
mod config;

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commands::limits::OutputFormat;

#[derive(Parser)]
#[command(name = "forgecache")]
#[command(version)]
#[command(about = "A local snapshot cache for hosted repository metadata")]
#[command(
    long_about = "Forgecache mirrors repository metadata (stats, description, topics, README, \
language breakdown) from a code hosting API into a local database, so that \
rate-limited remote lookups are not repeated on every request."
)]
#[command(after_long_help = r#"EXAMPLES
    Fetch (or refresh) one repository:
        $ forgecache show rust-lang/rust

    Include the README and language breakdown:
        $ forgecache show rust-lang/rust --readme --languages

    Pre-warm a set of repositories:
        $ forgecache warm acme/widget acme/gadget acme/gizmo

    Search the local cache:
        $ forgecache search "terminal ui" --language rust

    Search the host and cache every result:
        $ forgecache search tokio --remote

CONFIGURATION
    Forgecache reads configuration from:
      1. ~/.config/forgecache/config.toml (or $XDG_CONFIG_HOME/forgecache/config.toml)
      2. ./forgecache.toml in the current directory
      3. Environment variables (FORGECACHE_* prefix, e.g., FORGECACHE_HOSTING_TOKEN)
      4. .env file in the current directory

ENVIRONMENT VARIABLES
    FORGECACHE_DATABASE_URL    Database connection string (default: ~/.local/state/forgecache/forgecache.db)
    FORGECACHE_HOSTING_TOKEN   Bearer token for the hosting API (optional, raises rate limits)
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
    /// Fetch or refresh one repository snapshot and print it
    Show {
        /// Repository as "owner/name", or a numeric external id
        reference: String,
        /// Also load the README
        #[arg(long)]
        readme: bool,
        /// Also load the language breakdown
        #[arg(long)]
        languages: bool,
        /// Tolerate day-old stats (24h freshness window instead of 1h)
        #[arg(long)]
        relaxed: bool,
    },
    /// Pre-warm the cache for a set of repositories
    Warm {
        /// Repositories as "owner/name"
        #[arg(required = true)]
        repos: Vec<String>,
        /// Maximum concurrent syncs
        #[arg(long)]
        concurrency: Option<usize>,
        /// Retry rate-limited fetches with backoff
        #[arg(long)]
        retry: bool,
    },
    /// Search repositories
    Search {
        /// Search text, matched against name and description
        query: String,
        /// Only repositories with this primary language
        #[arg(long)]
        language: Option<String>,
        /// Only repositories with at least this many stars
        #[arg(long)]
        min_stars: Option<i32>,
        /// Exclude forks
        #[arg(long)]
        no_forks: bool,
        /// Search the host and cache the results instead of searching locally
        #[arg(long)]
        remote: bool,
        /// Page number (0-indexed)
        #[arg(long, default_value_t = 0)]
        page: u64,
        /// Results per page
        #[arg(long, default_value_t = 20)]
        limit: u64,
        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// List the most-starred cached repositories
    Top {
        /// How many to list
        #[arg(long, default_value_t = 10)]
        limit: u64,
        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Show the hosting API rate limit status
    Limits {
        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum MigrateAction {
    /// Apply all pending migrations
    Up,
    /// Rollback the last migration
    Down,
    /// Show migration status
    Status,
    /// Fresh install - drop all tables and reapply migrations
    Fresh,
}

#[tokio::main]
async fn main() {
    // .env is optional; ignore a missing file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    if let Err(err) = run().await {
        eprintln!("{} {}", console::style("error:").red().bold(), err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = config::Config::load()?;

    match cli.command {
        Commands::Migrate { action } => commands::migrate::handle(action, &config).await,
        Commands::Show {
            reference,
            readme,
            languages,
            relaxed,
        } => commands::show::handle(&reference, readme, languages, relaxed, &config).await,
        Commands::Warm {
            repos,
            concurrency,
            retry,
        } => commands::warm::handle(&repos, concurrency, retry, &config).await,
        Commands::Search {
            query,
            language,
            min_stars,
            no_forks,
            remote,
            page,
            limit,
            format,
        } => {
            commands::search::handle(
                &query,
                commands::search::SearchArgs {
                    language,
                    min_stars,
                    no_forks,
                    remote,
                    page,
                    limit,
                    format,
                },
                &config,
            )
            .await
        }
        Commands::Top { limit, format } => commands::search::handle_top(limit, format, &config).await,
        Commands::Limits { format } => commands::limits::handle(format, &config).await,
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }
    }
}
