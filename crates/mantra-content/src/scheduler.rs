//! Background ingestion of content into the cache.
//!
//! One task runs per topic. Each task fetches under a hard timeout, merges
//! the result into the [`ContentCache`] and sleeps until the next refresh.
//! Failures are recorded on the entry without touching its items and the
//! task backs off exponentially. Every wait races against a shared
//! [`CancellationToken`], so shutdown interrupts an in-flight fetch instead
//! of waiting for it, and an interrupted fetch writes nothing.

use crate::backoff::Backoff;
use crate::cache::ContentCache;
use crate::error::{RefreshErrorKind, SourceError};
use crate::item::ContentItem;
use crate::source::ContentSource;
use dashmap::DashMap;
use mantra_common::Topic;
use mantra_config::{IngestionConfig, RedditConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// What a topic's ingestion task is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IngestionPhase {
    /// Waiting for the next scheduled refresh.
    Idle,
    /// A fetch is in flight.
    Fetching,
    /// Waiting out a backoff delay after a failure.
    Backoff,
}

/// Timing and topic set for the scheduler.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestionSettings {
    /// Topics to keep warm. Duplicates are ignored.
    pub topics: Vec<Topic>,
    /// Delay after a successful refresh.
    pub refresh_interval: Duration,
    /// Upper bound on a single fetch.
    pub fetch_timeout: Duration,
    /// Delay after the first failure.
    pub backoff_initial: Duration,
    /// Cap on backoff delays.
    pub backoff_max: Duration,
    /// Growth factor between consecutive backoff delays.
    pub backoff_multiplier: f64,
}

impl IngestionSettings {
    /// Derives settings from configuration. The default topic is always
    /// ingested, even when the topic list omits it.
    pub fn from_config(reddit: &RedditConfig, ingestion: &IngestionConfig) -> Self {
        let mut topics = reddit.topics.clone();
        if !reddit.default_topic.is_empty() {
            topics.push(reddit.default_topic.clone());
        }

        Self {
            topics: dedup(topics),
            refresh_interval: ingestion.refresh_interval(),
            fetch_timeout: ingestion.fetch_timeout(),
            backoff_initial: ingestion.backoff_initial(),
            backoff_max: ingestion.backoff_max(),
            backoff_multiplier: ingestion.backoff_multiplier,
        }
    }

    fn backoff(&self) -> Backoff {
        Backoff::new(self.backoff_initial, self.backoff_max, self.backoff_multiplier)
    }
}

fn dedup(topics: Vec<Topic>) -> Vec<Topic> {
    let mut unique: Vec<Topic> = Vec::with_capacity(topics.len());
    for topic in topics {
        if !topic.is_empty() && !unique.contains(&topic) {
            unique.push(topic);
        }
    }
    unique
}

/// Polls a [`ContentSource`] for every configured topic and feeds the cache.
pub struct IngestionScheduler {
    source: Arc<dyn ContentSource>,
    cache: Arc<ContentCache>,
    settings: IngestionSettings,
}

impl IngestionScheduler {
    /// Creates a scheduler. Nothing runs until [`spawn`](Self::spawn).
    pub fn new(
        source: Arc<dyn ContentSource>,
        cache: Arc<ContentCache>,
        settings: IngestionSettings,
    ) -> Self {
        Self {
            source,
            cache,
            settings,
        }
    }

    /// Starts one task per topic. The tasks stop when `shutdown` is
    /// cancelled or the returned handle is shut down or dropped.
    pub fn spawn(self, shutdown: CancellationToken) -> IngestionHandle {
        let phases = Arc::new(DashMap::new());
        let mut tasks = JoinSet::new();
        let topics = dedup(self.settings.topics.clone());

        info!(
            "Starting ingestion for {} topic(s) from {}",
            topics.len(),
            self.source.name()
        );

        for topic in topics {
            phases.insert(topic.clone(), IngestionPhase::Idle);
            let worker = TopicWorker {
                topic,
                source: Arc::clone(&self.source),
                cache: Arc::clone(&self.cache),
                phases: Arc::clone(&phases),
                backoff: self.settings.backoff(),
                refresh_interval: self.settings.refresh_interval,
                fetch_timeout: self.settings.fetch_timeout,
                shutdown: shutdown.clone(),
            };
            tasks.spawn(worker.run());
        }

        IngestionHandle {
            shutdown,
            tasks,
            phases,
        }
    }
}

/// Handle to running ingestion tasks.
pub struct IngestionHandle {
    shutdown: CancellationToken,
    tasks: JoinSet<()>,
    phases: Arc<DashMap<Topic, IngestionPhase>>,
}

impl IngestionHandle {
    /// Current phase of `topic`, or `None` if it is not ingested.
    pub fn phase(&self, topic: &Topic) -> Option<IngestionPhase> {
        self.phases.get(topic).map(|phase| *phase.value())
    }

    /// Topics with a running task.
    pub fn topics(&self) -> Vec<Topic> {
        self.phases.iter().map(|e| e.key().clone()).collect()
    }

    /// Cancels every task and waits for all of them to exit.
    pub async fn shutdown(mut self) {
        self.shutdown.cancel();

        while let Some(joined) = self.tasks.join_next().await {
            if let Err(e) = joined {
                if e.is_panic() {
                    error!("Ingestion task panicked: {}", e);
                }
            }
        }

        info!("Ingestion stopped");
    }
}

struct TopicWorker {
    topic: Topic,
    source: Arc<dyn ContentSource>,
    cache: Arc<ContentCache>,
    phases: Arc<DashMap<Topic, IngestionPhase>>,
    backoff: Backoff,
    refresh_interval: Duration,
    fetch_timeout: Duration,
    shutdown: CancellationToken,
}

impl TopicWorker {
    async fn run(mut self) {
        debug!(topic = %self.topic, "Ingestion task started");

        while !self.shutdown.is_cancelled() {
            self.set_phase(IngestionPhase::Fetching);
            let outcome = tokio::select! {
                biased;
                () = self.shutdown.cancelled() => break,
                outcome = tokio::time::timeout(
                    self.fetch_timeout,
                    self.source.fetch_latest(&self.topic),
                ) => outcome,
            };

            let (delay, phase) = match outcome {
                Ok(Ok(items)) => (self.on_success(items), IngestionPhase::Idle),
                Ok(Err(err)) => (self.on_failure(&err), IngestionPhase::Backoff),
                Err(_) => (
                    self.on_failure(&SourceError::timed_out(self.fetch_timeout)),
                    IngestionPhase::Backoff,
                ),
            };

            self.set_phase(phase);
            tokio::select! {
                biased;
                () = self.shutdown.cancelled() => break,
                () = tokio::time::sleep(delay) => {}
            }
            self.set_phase(IngestionPhase::Idle);
        }

        self.set_phase(IngestionPhase::Idle);
        debug!(topic = %self.topic, "Ingestion task stopped");
    }

    fn on_success(&mut self, items: Vec<ContentItem>) -> Duration {
        let fetched = items.len();
        let added = self.cache.put(&self.topic, items);

        if self.backoff.failures() > 0 {
            info!(
                topic = %self.topic,
                "Refresh recovered after {} failure(s)",
                self.backoff.failures()
            );
        }
        self.backoff.reset();

        debug!(topic = %self.topic, fetched, added, "Refresh succeeded");
        self.refresh_interval
    }

    fn on_failure(&mut self, err: &SourceError) -> Duration {
        self.cache.record_failure(&self.topic, err);
        let delay = self.backoff.next_delay();
        let failures = self.backoff.failures();

        match err.kind() {
            RefreshErrorKind::Transient => warn!(
                topic = %self.topic,
                failures,
                "Refresh failed, retrying in {:?}: {}",
                delay,
                err
            ),
            RefreshErrorKind::Malformed => error!(
                topic = %self.topic,
                failures,
                "Refresh returned an unusable response, retrying in {:?}: {}",
                delay,
                err
            ),
        }

        delay
    }

    fn set_phase(&self, phase: IngestionPhase) {
        self.phases.insert(self.topic.clone(), phase);
    }
}
