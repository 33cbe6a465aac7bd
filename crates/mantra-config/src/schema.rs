//! Configuration schema definitions using serde.

use mantra_common::{GuildId, LoggingConfig, Topic};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration structure for Mantra.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Discord configuration.
    pub discord: DiscordConfig,
    /// Guild configuration database.
    pub database: DatabaseConfig,
    /// Reddit content source configuration.
    pub reddit: RedditConfig,
    /// Background ingestion configuration.
    pub ingestion: IngestionConfig,
    /// Logging configuration.
    pub logging: LoggingSettings,
}

/// Discord bot configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    /// Discord bot token.
    pub token: String,
    /// Prefix used in direct messages and for guilds seen for the first time.
    pub default_prefix: String,
    /// Guilds that get commands registered immediately instead of globally.
    pub test_guilds: Vec<GuildId>,
}

/// Guild configuration database.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite connection URL.
    pub url: String,
    /// Maximum pooled connections.
    pub max_connections: u32,
    /// Seconds to wait for a pooled connection before failing.
    pub acquire_timeout_seconds: u64,
}

/// Reddit content source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedditConfig {
    /// Base URL of the Reddit JSON API.
    pub base_url: String,
    /// User agent sent with every request.
    pub user_agent: String,
    /// Subreddits kept warm in the content cache.
    pub topics: Vec<Topic>,
    /// Topic used when a command does not name one.
    pub default_topic: Topic,
    /// Number of posts requested per fetch.
    pub fetch_limit: u32,
    /// Request budget shared by all topics.
    pub requests_per_minute: u32,
}

/// Background ingestion configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestionConfig {
    /// Seconds between successful refreshes of a topic.
    pub refresh_interval_seconds: u64,
    /// Upper bound on a single fetch.
    pub fetch_timeout_seconds: u64,
    /// Maximum cached items per topic.
    pub capacity: usize,
    /// First retry delay after a failure.
    pub backoff_initial_seconds: u64,
    /// Retry delay ceiling.
    pub backoff_max_seconds: u64,
    /// Growth factor applied per consecutive failure.
    pub backoff_multiplier: f64,
}

impl IngestionConfig {
    /// Steady state refresh interval.
    pub const fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_seconds)
    }

    /// Per-fetch timeout.
    pub const fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_seconds)
    }

    /// First backoff delay.
    pub const fn backoff_initial(&self) -> Duration {
        Duration::from_secs(self.backoff_initial_seconds)
    }

    /// Backoff ceiling.
    pub const fn backoff_max(&self) -> Duration {
        Duration::from_secs(self.backoff_max_seconds)
    }
}

/// Logging configuration as written in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter directive, e.g. `info,mantra_content=debug`.
    pub level: String,
    /// Emit JSON lines.
    pub json: bool,
    /// Use the multi-line pretty formatter; ignored when `json` is set.
    pub pretty: bool,
    /// Optional log file, rotated daily.
    pub file: Option<String>,
}

impl LoggingSettings {
    /// Converts to the logging bootstrap configuration.
    pub fn to_logging_config(&self) -> LoggingConfig {
        LoggingConfig {
            level: self.level.clone(),
            json_format: self.json,
            pretty_format: self.pretty,
            file_path: self.file.clone(),
            ..LoggingConfig::default()
        }
    }
}
