//! Configuration loading utilities

use crate::schema::Config;
use mantra_common::{GuildId, MantraError, Topic};
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error when reading configuration file
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML configuration: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// Environment variable parsing error
    #[error("Failed to parse environment variable '{var}': {source}")]
    EnvParseError {
        var: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Configuration validation error
    #[error("Invalid configuration value for '{field}': {message}")]
    Invalid { field: String, message: String },
}

impl From<ConfigError> for MantraError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Invalid { field, message } => {
                MantraError::validation_field(message, field)
            }
            other => MantraError::config_with_source("Failed to load configuration", other),
        }
    }
}

/// Configuration loader for the application
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML file with environment variable overrides
    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let mut config = Self::parse(&content)?;

        Self::apply_env_overrides(&mut config)?;
        config.validate()?;

        info!("Loaded configuration from {}", path.as_ref().display());
        Ok(config)
    }

    /// Parse configuration from YAML text without overrides or validation
    pub fn parse(content: &str) -> Result<Config, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Load configuration from the usual locations.
    ///
    /// `MANTRA_CONFIG_PATH` wins, then `config.yaml` and `config.yml` in the
    /// working directory, then built-in defaults with environment overrides.
    pub fn load() -> Result<Config, ConfigError> {
        if let Ok(config_path) = env::var("MANTRA_CONFIG_PATH") {
            return Self::load_config(config_path);
        }

        for candidate in ["config.yaml", "config.yml"] {
            if Path::new(candidate).exists() {
                return Self::load_config(candidate);
            }
        }

        debug!("No configuration file found, using defaults");
        let mut config = Config::default();
        Self::apply_env_overrides(&mut config)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(config: &mut Config) -> Result<(), ConfigError> {
        Self::apply_overrides_from(config, |var| env::var(var).ok())
    }

    /// Apply overrides using an arbitrary variable lookup
    pub fn apply_overrides_from<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("DISCORD_TOKEN") {
            config.discord.token = token;
        }

        if let Some(prefix) = lookup("MANTRA_PREFIX") {
            config.discord.default_prefix = prefix;
        }

        if let Some(guilds) = lookup("MANTRA_TEST_GUILDS") {
            config.discord.test_guilds = split_list(&guilds)
                .map(|id| {
                    id.parse::<u64>()
                        .map(GuildId)
                        .map_err(|e| ConfigError::EnvParseError {
                            var: "MANTRA_TEST_GUILDS".to_string(),
                            source: Box::new(e),
                        })
                })
                .collect::<Result<_, _>>()?;
        }

        if let Some(url) = lookup("DATABASE_URL") {
            config.database.url = url;
        }

        if let Some(topics) = lookup("REDDIT_TOPICS") {
            config.reddit.topics = split_list(&topics).map(Topic::new).collect();
        }

        if let Some(level) = lookup("MANTRA_LOG_LEVEL") {
            config.logging.level = level;
        }

        Ok(())
    }
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}
