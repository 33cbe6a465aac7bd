//! Content source error types.

use mantra_common::BoxedSource;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Result type for content source calls.
pub type SourceResult<T> = Result<T, SourceError>;

/// Failures reported by a [`ContentSource`](crate::ContentSource).
///
/// Both variants are retried with backoff. `Malformed` is kept apart because
/// it points at a changed upstream contract rather than a passing outage.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Timeout, network failure, rate limiting or a server-side error.
    #[error("Transient source failure: {message}")]
    Transient {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// The response could not be understood.
    #[error("Malformed source response: {message}")]
    Malformed {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },
}

impl SourceError {
    /// Create a transient error
    pub fn transient(msg: impl Into<String>) -> Self {
        Self::Transient {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a transient error with source
    pub fn transient_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Transient {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a malformed-response error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a malformed-response error with source
    pub fn malformed_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Malformed {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// The error raised when a fetch exceeds its time budget.
    pub fn timed_out(after: Duration) -> Self {
        Self::transient(format!("fetch timed out after {after:?}"))
    }

    /// Classification recorded on the cache entry.
    pub const fn kind(&self) -> RefreshErrorKind {
        match self {
            Self::Transient { .. } => RefreshErrorKind::Transient,
            Self::Malformed { .. } => RefreshErrorKind::Malformed,
        }
    }

    /// The message without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Transient { message, .. } | Self::Malformed { message, .. } => message,
        }
    }
}

/// Kind of the most recent refresh failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshErrorKind {
    /// See [`SourceError::Transient`].
    Transient,
    /// See [`SourceError::Malformed`].
    Malformed,
}

impl fmt::Display for RefreshErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transient => write!(f, "transient"),
            Self::Malformed => write!(f, "malformed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(SourceError::transient("x").kind(), RefreshErrorKind::Transient);
        assert_eq!(SourceError::malformed("x").kind(), RefreshErrorKind::Malformed);
    }

    #[test]
    fn test_timed_out_is_transient() {
        let err = SourceError::timed_out(Duration::from_secs(3));
        assert_eq!(err.kind(), RefreshErrorKind::Transient);
        assert_eq!(err.message(), "fetch timed out after 3s");
        assert_eq!(err.to_string(), "Transient source failure: fetch timed out after 3s");
    }
}
