//! Configuration file support for the forgecache CLI.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (prefixed with `FORGECACHE_`, e.g., `FORGECACHE_DATABASE_URL`)
//! 3. Config file (~/.config/forgecache/config.toml or ./forgecache.toml)
//! 4. Built-in defaults
//!
//! The database URL defaults to `sqlite://~/.local/state/forgecache/forgecache.db`
//! on Linux (using the XDG state directory) if not explicitly configured.
//!
//! Example config file:
//! ```toml
//! [database]
//! url = "sqlite://~/.local/state/forgecache/forgecache.db"  # optional, this is the default
//!
//! [hosting]
//! token = "ghp_..."      # or use FORGECACHE_HOSTING_TOKEN env var
//! api_base = "https://api.github.com"
//! timeout_secs = 10
//!
//! [freshness]
//! core_max_age_hours = 1
//! readme_max_age_days = 7
//!
//! [sync]
//! concurrency = 8
//! retry_rate_limited = false
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use directories::ProjectDirs;
use forgecache::{FreshnessPolicy, HostingClient, HostingConfig, Synchronizer};
use sea_orm::DatabaseConnection;
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Hosting API configuration.
    pub hosting: HostingSection,
    /// Freshness windows.
    pub freshness: FreshnessSection,
    /// Default sync options.
    pub sync: SyncSection,
}

/// Database configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database connection URL. Supports sqlite:// and postgres:// schemes.
    /// Defaults to `sqlite://~/.local/state/forgecache/forgecache.db` if not specified.
    pub url: Option<String>,
}

/// Hosting API configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HostingSection {
    /// Bearer token. Can also be set via FORGECACHE_HOSTING_TOKEN.
    pub token: Option<String>,
    /// API base URL. Can also be set via FORGECACHE_HOSTING_API_BASE.
    pub api_base: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for HostingSection {
    fn default() -> Self {
        Self {
            token: None,
            api_base: forgecache::hosting::DEFAULT_API_BASE.to_string(),
            timeout_secs: forgecache::hosting::DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

/// Freshness windows.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FreshnessSection {
    /// Maximum core-field age in hours before a refresh is attempted.
    pub core_max_age_hours: i64,
    /// Maximum README age in days before a refresh is attempted.
    pub readme_max_age_days: i64,
}

impl Default for FreshnessSection {
    fn default() -> Self {
        Self {
            core_max_age_hours: 1,
            readme_max_age_days: 7,
        }
    }
}

/// Default sync options.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SyncSection {
    /// Maximum concurrent syncs in a bulk operation.
    pub concurrency: usize,
    /// Whether bulk syncs retry rate-limited fetches by default.
    pub retry_rate_limited: bool,
}

impl Default for SyncSection {
    fn default() -> Self {
        Self {
            concurrency: forgecache::sync::DEFAULT_BULK_CONCURRENCY,
            retry_rate_limited: false,
        }
    }
}

impl Config {
    /// Load configuration from files and the environment.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = config_file_path() {
            builder = builder.add_source(
                File::from(path)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }
        builder = builder.add_source(
            File::with_name("forgecache")
                .format(FileFormat::Toml)
                .required(false),
        );
        builder = builder.add_source(Environment::with_prefix("FORGECACHE").separator("_"));

        let config = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// The effective database URL, creating the default state directory if needed.
    pub fn database_url(&self) -> Result<String, Box<dyn std::error::Error>> {
        if let Some(url) = &self.database.url {
            return Ok(url.clone());
        }
        let dir = state_dir().ok_or("could not determine a state directory for the database")?;
        std::fs::create_dir_all(&dir)?;
        Ok(format!(
            "sqlite://{}/forgecache.db?mode=rwc",
            dir.display()
        ))
    }

    /// The freshness policy derived from configuration.
    pub fn freshness_policy(&self, relaxed: bool) -> FreshnessPolicy {
        if relaxed {
            return FreshnessPolicy::relaxed();
        }
        FreshnessPolicy::new(
            chrono::Duration::hours(self.freshness.core_max_age_hours),
            chrono::Duration::days(self.freshness.readme_max_age_days),
        )
    }

    /// Build the hosting client from configuration.
    pub fn hosting_client(&self) -> Result<HostingClient, Box<dyn std::error::Error>> {
        let client = HostingClient::new(HostingConfig {
            api_base: self.hosting.api_base.clone(),
            token: self.hosting.token.clone(),
            timeout: StdDuration::from_secs(self.hosting.timeout_secs),
        })?;
        Ok(client)
    }

    /// Connect, migrate, and assemble a synchronizer.
    pub async fn synchronizer(
        &self,
        relaxed: bool,
    ) -> Result<(Arc<DatabaseConnection>, Synchronizer), Box<dyn std::error::Error>> {
        let db = Arc::new(forgecache::connect_and_migrate(&self.database_url()?).await?);
        let client = Arc::new(self.hosting_client()?);
        let sync = Synchronizer::new(Arc::clone(&db), client, self.freshness_policy(relaxed));
        Ok((db, sync))
    }
}

fn config_file_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "forgecache").map(|dirs| dirs.config_dir().join("config.toml"))
}

fn state_dir() -> Option<PathBuf> {
    let dirs = ProjectDirs::from("", "", "forgecache")?;
    Some(
        dirs.state_dir()
            .map(PathBuf::from)
            .unwrap_or_else(|| dirs.data_local_dir().to_path_buf()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_library() {
        let config = Config::default();
        assert_eq!(config.hosting.api_base, forgecache::hosting::DEFAULT_API_BASE);
        assert_eq!(config.hosting.timeout_secs, 10);
        assert_eq!(config.freshness.core_max_age_hours, 1);
        assert_eq!(config.freshness.readme_max_age_days, 7);
        assert_eq!(
            config.sync.concurrency,
            forgecache::sync::DEFAULT_BULK_CONCURRENCY
        );
    }

    #[test]
    fn freshness_policy_honors_configuration_and_relaxed_flag() {
        let mut config = Config::default();
        config.freshness.core_max_age_hours = 4;

        let policy = config.freshness_policy(false);
        assert_eq!(policy.core_max_age, chrono::Duration::hours(4));

        let relaxed = config.freshness_policy(true);
        assert_eq!(relaxed.core_max_age, chrono::Duration::hours(24));
    }

    #[test]
    fn explicit_database_url_is_used_verbatim() {
        let config = Config {
            database: DatabaseConfig {
                url: Some("sqlite://custom.db".to_string()),
            },
            ..Config::default()
        };
        assert_eq!(config.database_url().unwrap(), "sqlite://custom.db");
    }
}
