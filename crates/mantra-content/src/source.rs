//! The content source seam.

use crate::error::SourceResult;
use crate::item::ContentItem;
use async_trait::async_trait;
use mantra_common::Topic;

/// Something that can produce the latest items for a topic.
///
/// Implementations should be cancel-safe: the scheduler drops the returned
/// future on timeout or shutdown.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetches the current items of `topic`, newest first.
    async fn fetch_latest(&self, topic: &Topic) -> SourceResult<Vec<ContentItem>>;

    /// Short name used in logs.
    fn name(&self) -> &str {
        "content source"
    }
}
