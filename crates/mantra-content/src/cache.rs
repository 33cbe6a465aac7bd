//! Per-topic content cache.
//!
//! Each topic maps to an immutable [`CacheEntry`] snapshot behind an [`Arc`].
//! Writers build a replacement entry and swap it in while holding the topic's
//! map shard, so readers always observe either the previous or the next state
//! and never a half-merged list.

use crate::error::{RefreshErrorKind, SourceError};
use crate::item::ContentItem;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use mantra_common::Topic;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Snapshot of one topic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheEntry {
    /// Items ordered by `fetched_at`, newest first. Ids are unique.
    pub items: Vec<ContentItem>,
    /// Time of the last successful refresh.
    pub last_refresh_at: Option<DateTime<Utc>>,
    /// The most recent refresh failure, cleared by the next success.
    pub last_refresh_error: Option<RefreshError>,
}

impl CacheEntry {
    /// Number of cached items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the entry holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The newest item, if any.
    pub fn latest(&self) -> Option<&ContentItem> {
        self.items.first()
    }

    /// Whether the last successful refresh is older than `max_age` at `now`.
    /// An entry that was never refreshed is stale.
    pub fn is_stale(&self, max_age: chrono::Duration, now: DateTime<Utc>) -> bool {
        self.last_refresh_at
            .map_or(true, |refreshed| now - refreshed > max_age)
    }
}

/// Details of a failed refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshError {
    /// Failure classification.
    pub kind: RefreshErrorKind,
    /// Human-readable cause.
    pub message: String,
    /// When the failure was recorded.
    pub at: DateTime<Utc>,
    /// Failures in a row since the last success.
    pub consecutive_failures: u32,
}

/// Bounded, deduplicated, newest-first cache of content per topic.
///
/// Reads never block on ingestion. Only the ingestion scheduler writes.
#[derive(Debug)]
pub struct ContentCache {
    entries: DashMap<Topic, Arc<CacheEntry>>,
    capacity: usize,
}

impl ContentCache {
    /// Creates an empty cache keeping at most `capacity` items per topic.
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            capacity: capacity.max(1),
        }
    }

    /// Maximum items per topic.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Snapshot of `topic`. Unknown topics yield an empty entry.
    pub fn get(&self, topic: &Topic) -> Arc<CacheEntry> {
        self.entries
            .get(topic)
            .map(|entry| Arc::clone(entry.value()))
            .unwrap_or_default()
    }

    /// The newest item of `topic`.
    pub fn latest(&self, topic: &Topic) -> Option<ContentItem> {
        self.get(topic).latest().cloned()
    }

    /// Topics that have been written at least once.
    pub fn topics(&self) -> Vec<Topic> {
        let mut topics: Vec<Topic> = self.entries.iter().map(|e| e.key().clone()).collect();
        topics.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        topics
    }

    /// Merges a fresh batch into `topic` and marks the refresh successful.
    /// Returns the number of previously unseen items.
    pub(crate) fn put(&self, topic: &Topic, items: Vec<ContentItem>) -> usize {
        self.put_at(topic, items, Utc::now())
    }

    pub(crate) fn put_at(&self, topic: &Topic, items: Vec<ContentItem>, now: DateTime<Utc>) -> usize {
        let mut slot = self.entries.entry(topic.clone()).or_default();
        let (merged, added) = merge(&slot.value().items, items, self.capacity);
        *slot.value_mut() = Arc::new(CacheEntry {
            items: merged,
            last_refresh_at: Some(now),
            last_refresh_error: None,
        });

        debug!(%topic, added, "Cache entry refreshed");
        added
    }

    /// Records a failed refresh of `topic`, leaving its items untouched.
    pub(crate) fn record_failure(&self, topic: &Topic, error: &SourceError) {
        self.record_failure_at(topic, error, Utc::now());
    }

    pub(crate) fn record_failure_at(&self, topic: &Topic, error: &SourceError, now: DateTime<Utc>) {
        let mut slot = self.entries.entry(topic.clone()).or_default();
        let previous = slot.value();
        let consecutive_failures = previous
            .last_refresh_error
            .as_ref()
            .map_or(1, |e| e.consecutive_failures.saturating_add(1));

        let updated = CacheEntry {
            items: previous.items.clone(),
            last_refresh_at: previous.last_refresh_at,
            last_refresh_error: Some(RefreshError {
                kind: error.kind(),
                message: error.message().to_string(),
                at: now,
                consecutive_failures,
            }),
        };
        *slot.value_mut() = Arc::new(updated);
    }
}

/// Keeps existing items over incoming ones with the same id, orders newest
/// first and truncates to `capacity`. Ties on `fetched_at` keep their
/// relative order, existing items before incoming ones.
fn merge(
    current: &[ContentItem],
    incoming: Vec<ContentItem>,
    capacity: usize,
) -> (Vec<ContentItem>, usize) {
    let mut seen: HashSet<String> = current.iter().map(|item| item.id.clone()).collect();
    let mut merged = current.to_vec();
    let mut added = 0;

    for item in incoming {
        if seen.insert(item.id.clone()) {
            merged.push(item);
            added += 1;
        }
    }

    merged.sort_by(|a, b| b.fetched_at.cmp(&a.fetched_at));
    merged.truncate(capacity);
    (merged, added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ContentPayload;
    use mantra_common::test_utils::at_second;
    use proptest::prelude::*;

    fn item(topic: &Topic, id: &str, second: i64) -> ContentItem {
        ContentItem::new(
            id,
            topic.clone(),
            ContentPayload {
                title: format!("post {id}"),
                ..ContentPayload::default()
            },
            at_second(second),
        )
    }

    fn ids(entry: &CacheEntry) -> Vec<&str> {
        entry.items.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn test_unknown_topic_is_empty() {
        let cache = ContentCache::new(10);
        let entry = cache.get(&Topic::new("nothing"));

        assert!(entry.is_empty());
        assert!(entry.last_refresh_at.is_none());
        assert!(entry.last_refresh_error.is_none());
        assert!(cache.latest(&Topic::new("nothing")).is_none());
        assert!(cache.topics().is_empty());
    }

    #[test]
    fn test_cats_refreshes_merge_newest_first() {
        let cache = ContentCache::new(10);
        let cats = Topic::new("cats");

        cache.put_at(&cats, vec![item(&cats, "1", 10), item(&cats, "2", 12)], at_second(20));
        assert_eq!(ids(&cache.get(&cats)), ["2", "1"]);

        let added = cache.put_at(
            &cats,
            vec![item(&cats, "2", 12), item(&cats, "3", 15)],
            at_second(30),
        );
        let entry = cache.get(&cats);

        assert_eq!(added, 1);
        assert_eq!(ids(&entry), ["3", "2", "1"]);
        assert_eq!(entry.last_refresh_at, Some(at_second(30)));
        assert_eq!(cache.latest(&cats).unwrap().id, "3");
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let cache = ContentCache::new(2);
        let topic = Topic::new("memes");

        for (id, second) in [("1", 1), ("2", 2), ("3", 3)] {
            cache.put_at(&topic, vec![item(&topic, id, second)], at_second(second));
        }

        assert_eq!(ids(&cache.get(&topic)), ["3", "2"]);
    }

    #[test]
    fn test_existing_item_wins_over_duplicate() {
        let cache = ContentCache::new(10);
        let topic = Topic::new("memes");

        cache.put_at(&topic, vec![item(&topic, "a", 5)], at_second(5));
        let mut refetched = item(&topic, "a", 50);
        refetched.payload.score = 999;
        cache.put_at(&topic, vec![refetched], at_second(50));

        let entry = cache.get(&topic);
        assert_eq!(entry.len(), 1);
        assert_eq!(entry.items[0].fetched_at, at_second(5));
        assert_eq!(entry.items[0].payload.score, 0);
    }

    #[test]
    fn test_failure_keeps_items_and_counts() {
        let cache = ContentCache::new(10);
        let topic = Topic::new("memes");
        cache.put_at(&topic, vec![item(&topic, "a", 1)], at_second(1));

        cache.record_failure_at(&topic, &SourceError::transient("503"), at_second(2));
        cache.record_failure_at(&topic, &SourceError::malformed("bad json"), at_second(3));

        let entry = cache.get(&topic);
        assert_eq!(ids(&entry), ["a"]);
        assert_eq!(entry.last_refresh_at, Some(at_second(1)));

        let error = entry.last_refresh_error.as_ref().unwrap();
        assert_eq!(error.kind, RefreshErrorKind::Malformed);
        assert_eq!(error.message, "bad json");
        assert_eq!(error.at, at_second(3));
        assert_eq!(error.consecutive_failures, 2);
    }

    #[test]
    fn test_success_clears_error() {
        let cache = ContentCache::new(10);
        let topic = Topic::new("memes");

        cache.record_failure_at(&topic, &SourceError::transient("timeout"), at_second(1));
        assert!(cache.get(&topic).last_refresh_error.is_some());
        assert!(cache.get(&topic).last_refresh_at.is_none());

        cache.put_at(&topic, Vec::new(), at_second(2));
        let entry = cache.get(&topic);
        assert!(entry.last_refresh_error.is_none());
        assert_eq!(entry.last_refresh_at, Some(at_second(2)));
    }

    #[test]
    fn test_snapshots_are_isolated_from_later_writes() {
        let cache = ContentCache::new(10);
        let topic = Topic::new("memes");
        cache.put_at(&topic, vec![item(&topic, "a", 1)], at_second(1));

        let before = cache.get(&topic);
        cache.put_at(&topic, vec![item(&topic, "b", 2)], at_second(2));

        assert_eq!(ids(&before), ["a"]);
        assert_eq!(ids(&cache.get(&topic)), ["b", "a"]);
    }

    #[test]
    fn test_topics_are_independent() {
        let cache = ContentCache::new(10);
        let cats = Topic::new("cats");
        let dogs = Topic::new("dogs");

        cache.put_at(&cats, vec![item(&cats, "c", 1)], at_second(1));
        cache.record_failure_at(&dogs, &SourceError::transient("down"), at_second(1));

        assert!(cache.get(&cats).last_refresh_error.is_none());
        assert!(cache.get(&dogs).is_empty());
        assert_eq!(cache.topics(), vec![cats, dogs]);
    }

    #[test]
    fn test_stale_entry() {
        let mut entry = CacheEntry::default();
        assert!(entry.is_stale(chrono::Duration::seconds(60), at_second(0)));

        entry.last_refresh_at = Some(at_second(0));
        assert!(!entry.is_stale(chrono::Duration::seconds(60), at_second(60)));
        assert!(entry.is_stale(chrono::Duration::seconds(60), at_second(61)));
    }

    #[test]
    fn test_zero_capacity_is_raised() {
        assert_eq!(ContentCache::new(0).capacity(), 1);
    }

    proptest! {
        #[test]
        fn prop_entries_stay_bounded_sorted_and_unique(
            capacity in 1usize..8,
            batches in prop::collection::vec(
                prop::collection::vec((0u8..20, 0i64..1000), 0..10),
                1..10,
            ),
        ) {
            let cache = ContentCache::new(capacity);
            let topic = Topic::new("prop");

            for (round, batch) in batches.into_iter().enumerate() {
                let items = batch
                    .into_iter()
                    .map(|(id, second)| item(&topic, &id.to_string(), second))
                    .collect();
                cache.put_at(&topic, items, at_second(i64::try_from(round).unwrap()));

                let entry = cache.get(&topic);
                prop_assert!(entry.len() <= capacity);

                let unique: HashSet<&str> = entry.items.iter().map(|i| i.id.as_str()).collect();
                prop_assert_eq!(unique.len(), entry.len());

                prop_assert!(entry
                    .items
                    .windows(2)
                    .all(|pair| pair[0].fetched_at >= pair[1].fetched_at));
            }
        }
    }
}
