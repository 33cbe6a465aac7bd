//! Common type definitions and newtype wrappers for domain modeling.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A Discord guild ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GuildId(pub u64);

impl GuildId {
    /// Returns the raw snowflake value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for GuildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for GuildId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// A content topic, i.e. the name of a subreddit.
///
/// Topics are normalized on construction: surrounding whitespace and a
/// leading `r/` or `/r/` are removed and the name is lowercased, so
/// `"r/Cats"` and `"cats"` address the same cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Topic(String);

impl Topic {
    /// Creates a normalized topic.
    pub fn new(name: impl AsRef<str>) -> Self {
        let trimmed = name.as_ref().trim();
        let stripped = trimmed
            .strip_prefix("/r/")
            .or_else(|| trimmed.strip_prefix("r/"))
            .unwrap_or(trimmed);
        Self(stripped.trim_matches('/').to_lowercase())
    }

    /// Returns the topic name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the topic has no name after normalization.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if the name is usable as a subreddit: non-empty and made
    /// of lowercase ASCII letters, digits and underscores only.
    pub fn is_valid_name(&self) -> bool {
        !self.0.is_empty()
            && self
                .0
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_')
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Topic {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<&str> for Topic {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<Topic> for String {
    fn from(topic: Topic) -> Self {
        topic.0
    }
}

impl AsRef<str> for Topic {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
