//! Startup and shutdown of the bot's long-lived services.
//!
//! Components come up in dependency order and go down in reverse: the
//! Reddit source is built first, then the guild store is opened, then the
//! cache is created and ingestion is spawned against it. Stopping cancels
//! and joins ingestion before closing the store.

use crate::error::BotResult;
use chrono::{DateTime, Utc};
use mantra_commands::Data;
use mantra_common::Topic;
use mantra_config::Config;
use mantra_content::{
    ContentCache, ContentSource, IngestionHandle, IngestionScheduler, IngestionSettings,
    RedditSource,
};
use mantra_store::{PrefixResolver, SqliteGuildStore};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Entry point for bringing services up.
pub struct Lifecycle;

impl Lifecycle {
    /// Starts every service with the Reddit source from `config`.
    pub async fn start(config: &Config) -> BotResult<Services> {
        let source = RedditSource::new(&config.reddit, config.ingestion.fetch_timeout())?;
        Self::start_with_source(config, Arc::new(source)).await
    }

    /// Starts every service, ingesting from `source`.
    pub async fn start_with_source(
        config: &Config,
        source: Arc<dyn ContentSource>,
    ) -> BotResult<Services> {
        let store = Arc::new(SqliteGuildStore::connect(&config.database).await?);
        info!("Guild store ready");

        let resolver = Arc::new(PrefixResolver::new(
            store.clone(),
            config.discord.default_prefix.clone(),
        ));

        let cache = Arc::new(ContentCache::new(config.ingestion.capacity));
        let shutdown = CancellationToken::new();
        let settings = IngestionSettings::from_config(&config.reddit, &config.ingestion);
        let mut tracked_topics = settings.topics.clone();
        tracked_topics.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        let ingestion =
            IngestionScheduler::new(source, Arc::clone(&cache), settings).spawn(shutdown.clone());

        info!("Services started");
        Ok(Services {
            resolver,
            cache,
            store,
            ingestion,
            shutdown,
            default_topic: config.reddit.default_topic.clone(),
            tracked_topics,
            started_at: Utc::now(),
        })
    }
}

/// Running services. Dropping without [`stop`](Self::stop) aborts ingestion
/// but leaves the store pool to close on its own.
pub struct Services {
    /// Guild prefix lookups.
    pub resolver: Arc<PrefixResolver>,
    /// Ingested content.
    pub cache: Arc<ContentCache>,
    store: Arc<SqliteGuildStore>,
    ingestion: IngestionHandle,
    shutdown: CancellationToken,
    default_topic: Topic,
    tracked_topics: Vec<Topic>,
    started_at: DateTime<Utc>,
}

impl Services {
    /// Command data sharing these services.
    pub fn command_data(&self) -> Data {
        Data {
            resolver: Arc::clone(&self.resolver),
            cache: Arc::clone(&self.cache),
            default_topic: self.default_topic.clone(),
            tracked_topics: self.tracked_topics.clone(),
            started_at: self.started_at,
        }
    }

    /// Token cancelled when the services begin stopping. Child tokens may be
    /// handed to anything that should stop with them.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Ingestion task handle.
    pub const fn ingestion(&self) -> &IngestionHandle {
        &self.ingestion
    }

    /// Stops ingestion, waits for it, then closes the store.
    pub async fn stop(self) {
        info!("Stopping services");
        self.shutdown.cancel();
        self.ingestion.shutdown().await;
        self.store.close().await;
        info!("Services stopped");
    }
}
