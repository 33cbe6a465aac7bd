//! Runtime validation of a loaded configuration.

use crate::loader::ConfigError;
use crate::schema::Config;
use mantra_common::{validate_prefix, Topic};

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates a configuration, reporting the first offending field.
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.discord.token.trim().is_empty() {
            return Err(invalid("discord.token", "Discord token cannot be empty"));
        }

        validate_prefix(&config.discord.default_prefix)
            .map_err(|reason| invalid("discord.default_prefix", reason))?;
        if config.discord.test_guilds.iter().any(|g| g.get() == 0) {
            return Err(invalid("discord.test_guilds", "guild ids must be non-zero"));
        }

        if config.database.url.trim().is_empty() {
            return Err(invalid("database.url", "database URL cannot be empty"));
        }
        if config.database.max_connections == 0 {
            return Err(invalid("database.max_connections", "must be at least 1"));
        }
        if config.database.acquire_timeout_seconds == 0 {
            return Err(invalid("database.acquire_timeout_seconds", "must be positive"));
        }

        if config.reddit.topics.iter().any(Topic::is_empty) {
            return Err(invalid("reddit.topics", "topic names cannot be empty"));
        }
        if !config.reddit.topics.iter().all(Topic::is_valid_name) {
            return Err(invalid(
                "reddit.topics",
                "topic names may only contain a-z, 0-9 and underscores",
            ));
        }
        if config.reddit.default_topic.is_empty() {
            return Err(invalid("reddit.default_topic", "topic name cannot be empty"));
        }
        if !config.reddit.default_topic.is_valid_name() {
            return Err(invalid(
                "reddit.default_topic",
                "topic name may only contain a-z, 0-9 and underscores",
            ));
        }
        if config.reddit.fetch_limit == 0 {
            return Err(invalid("reddit.fetch_limit", "must be at least 1"));
        }
        if config.reddit.requests_per_minute == 0 {
            return Err(invalid("reddit.requests_per_minute", "must be at least 1"));
        }

        let ingestion = &config.ingestion;
        if ingestion.capacity == 0 {
            return Err(invalid("ingestion.capacity", "must be at least 1"));
        }
        if ingestion.refresh_interval_seconds == 0 {
            return Err(invalid("ingestion.refresh_interval_seconds", "must be positive"));
        }
        if ingestion.fetch_timeout_seconds == 0 {
            return Err(invalid("ingestion.fetch_timeout_seconds", "must be positive"));
        }
        if ingestion.backoff_initial_seconds == 0 {
            return Err(invalid("ingestion.backoff_initial_seconds", "must be positive"));
        }
        if ingestion.backoff_max_seconds < ingestion.backoff_initial_seconds {
            return Err(invalid(
                "ingestion.backoff_max_seconds",
                "must not be smaller than backoff_initial_seconds",
            ));
        }
        if !ingestion.backoff_multiplier.is_finite() || ingestion.backoff_multiplier < 1.0 {
            return Err(invalid("ingestion.backoff_multiplier", "must be at least 1.0"));
        }

        Ok(())
    }
}

impl Config {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigValidator::validate(self)
    }
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        message: message.to_string(),
    }
}
