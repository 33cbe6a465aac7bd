//! Content items as stored in the cache.

use chrono::{DateTime, Utc};
use mantra_common::Topic;
use serde::{Deserialize, Serialize};

/// Body of a post. The cache carries it around without looking inside.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContentPayload {
    /// Post title.
    pub title: String,
    /// Linked media or article.
    pub url: String,
    /// Link to the discussion page.
    pub permalink: String,
    /// Author name.
    pub author: String,
    /// Net votes at fetch time.
    pub score: i64,
    /// Marked as not safe for work.
    pub nsfw: bool,
}

/// A single item fetched for a topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    /// Source-assigned identifier, unique within a topic.
    pub id: String,
    /// Topic the item was fetched for.
    pub topic: Topic,
    /// Post body.
    pub payload: ContentPayload,
    /// When the item was ingested.
    pub fetched_at: DateTime<Utc>,
}

impl ContentItem {
    /// Creates an item.
    pub fn new(
        id: impl Into<String>,
        topic: Topic,
        payload: ContentPayload,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            topic,
            payload,
            fetched_at,
        }
    }
}
