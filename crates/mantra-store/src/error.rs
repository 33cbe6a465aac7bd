//! Store error types.

use mantra_common::{BoxedSource, MantraError};
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by guild stores and the prefix resolver.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not be reached or failed the query.
    #[error("Guild store unavailable: {message}")]
    Unavailable {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// A prefix was rejected before reaching the store.
    #[error("Invalid prefix '{prefix}': {reason}")]
    InvalidPrefix { prefix: String, reason: &'static str },
}

impl StoreError {
    /// Create an unavailability error without an underlying cause.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable {
            message: msg.into(),
            source: None,
        }
    }

    /// Returns true when the store itself failed, as opposed to bad input.
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        Self::Unavailable {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<StoreError> for MantraError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidPrefix { reason, .. } => {
                MantraError::validation_field(reason, "prefix")
            }
            StoreError::Unavailable { .. } => MantraError::with_source("Guild store failure", err),
        }
    }
}
