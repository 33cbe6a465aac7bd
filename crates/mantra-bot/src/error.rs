//! Application-wide error types using thiserror.

use mantra_common::MantraError;
use mantra_config::ConfigError;
use mantra_store::StoreError;
use poise::serenity_prelude as serenity;

/// Main application error type.
#[derive(thiserror::Error, Debug)]
pub enum BotError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Setup error from a shared component.
    #[error(transparent)]
    Common(#[from] MantraError),

    /// Guild store error.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Discord/Serenity error.
    #[error("Discord error: {0}")]
    Discord(#[from] serenity::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the bot application.
pub type BotResult<T> = Result<T, BotError>;
