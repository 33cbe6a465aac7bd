//! Default values for every configuration section.

use crate::schema::*;
use mantra_common::Topic;

/// Prefix used when nothing else is configured.
pub const DEFAULT_PREFIX: &str = ".";

/// Subreddit cached out of the box.
pub const DEFAULT_TOPIC: &str = "memes";

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            default_prefix: DEFAULT_PREFIX.to_string(),
            test_guilds: Vec::new(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://mantra.db".to_string(),
            max_connections: 5,
            acquire_timeout_seconds: 10,
        }
    }
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.reddit.com".to_string(),
            user_agent: concat!("mantra-bot/", env!("CARGO_PKG_VERSION")).to_string(),
            topics: vec![Topic::new(DEFAULT_TOPIC)],
            default_topic: Topic::new(DEFAULT_TOPIC),
            fetch_limit: 50,
            requests_per_minute: 30,
        }
    }
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            refresh_interval_seconds: 600,
            fetch_timeout_seconds: 15,
            capacity: 100,
            backoff_initial_seconds: 5,
            backoff_max_seconds: 900,
            backoff_multiplier: 2.0,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            pretty: false,
            file: None,
        }
    }
}
