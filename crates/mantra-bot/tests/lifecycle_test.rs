//! Start/stop orchestration against an in-memory database and stub sources.

use async_trait::async_trait;
use mantra_bot::{Lifecycle, MantraBot};
use mantra_common::test_utils::{discord_fixtures, init_test_logging};
use mantra_common::Topic;
use mantra_config::{Config, ConfigLoader};
use mantra_content::{ContentItem, ContentPayload, ContentSource, IngestionPhase, SourceResult};
use std::future::pending;
use std::sync::Arc;
use std::time::Duration;

struct OnePost;

#[async_trait]
impl ContentSource for OnePost {
    async fn fetch_latest(&self, topic: &Topic) -> SourceResult<Vec<ContentItem>> {
        Ok(vec![ContentItem::new(
            "abc",
            topic.clone(),
            ContentPayload {
                title: "hello".into(),
                ..ContentPayload::default()
            },
            chrono::Utc::now(),
        )])
    }
}

struct Stuck;

#[async_trait]
impl ContentSource for Stuck {
    async fn fetch_latest(&self, _topic: &Topic) -> SourceResult<Vec<ContentItem>> {
        pending().await
    }
}

fn test_config() -> Config {
    let mut config = ConfigLoader::parse(
        r#"
discord:
  token: "test-token"
  default_prefix: "m!"
database:
  url: "sqlite::memory:"
reddit:
  topics: ["cats"]
  default_topic: "memes"
ingestion:
  fetch_timeout_seconds: 3600
"#,
    )
    .unwrap();
    config.ingestion.refresh_interval_seconds = 3600;
    config
}

#[tokio::test]
async fn test_start_serves_prefixes_and_content_then_stops() {
    init_test_logging();
    let services = Lifecycle::start_with_source(&test_config(), Arc::new(OnePost))
        .await
        .unwrap();

    let guild = discord_fixtures::test_guild_id();
    assert_eq!(services.resolver.resolve(Some(guild)).await.unwrap(), "m!");
    assert_eq!(services.resolver.resolve(None).await.unwrap(), "m!");

    let cats = Topic::new("cats");
    let mut latest = None;
    for _ in 0..100 {
        latest = services.cache.latest(&cats);
        if latest.is_some() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(latest.unwrap().id, "abc");

    let data = services.command_data();
    assert_eq!(data.default_topic, Topic::new("memes"));
    assert_eq!(data.tracked_topics, vec![cats.clone(), Topic::new("memes")]);
    assert!(Arc::ptr_eq(&data.cache, &services.cache));

    let mut topics = services.ingestion().topics();
    topics.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    assert_eq!(topics, vec![cats, Topic::new("memes")]);

    let resolver = Arc::clone(&services.resolver);
    services.stop().await;

    let err = resolver.resolve(Some(guild)).await.unwrap_err();
    assert!(err.is_unavailable());
}

#[tokio::test]
async fn test_stop_does_not_wait_for_stuck_fetches() {
    init_test_logging();
    let services = Lifecycle::start_with_source(&test_config(), Arc::new(Stuck))
        .await
        .unwrap();

    let cats = Topic::new("cats");
    for _ in 0..100 {
        if services.ingestion().phase(&cats) == Some(IngestionPhase::Fetching) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    let stopped = tokio::time::timeout(Duration::from_secs(2), services.stop()).await;
    assert!(stopped.is_ok());
}

#[tokio::test]
async fn test_shutdown_token_is_shared() {
    let services = Lifecycle::start_with_source(&test_config(), Arc::new(Stuck))
        .await
        .unwrap();
    let token = services.shutdown_token();
    assert!(!token.is_cancelled());

    services.stop().await;
    assert!(token.is_cancelled());
}

#[tokio::test]
async fn test_unreachable_database_fails_start() {
    let mut config = test_config();
    config.database.url = "sqlite:///nonexistent-dir/for/mantra/test.db".to_string();
    config.database.acquire_timeout_seconds = 1;

    let result = Lifecycle::start_with_source(&config, Arc::new(Stuck)).await;
    assert!(result.is_err());
}

#[test]
fn test_intents_include_message_content() {
    let intents = MantraBot::intents();
    assert!(intents.contains(poise::serenity_prelude::GatewayIntents::MESSAGE_CONTENT));
    assert!(intents.contains(poise::serenity_prelude::GatewayIntents::GUILD_MESSAGES));
}
