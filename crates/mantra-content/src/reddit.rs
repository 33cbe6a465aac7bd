//! Reddit listing client.
//!
//! Fetches `/r/{topic}/hot.json` through a shared request budget and maps
//! every failure onto the [`SourceError`] taxonomy.

use crate::error::{SourceError, SourceResult};
use crate::item::{ContentItem, ContentPayload};
use crate::source::ContentSource;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use governor::{DefaultDirectRateLimiter, Quota};
use mantra_common::{MantraError, Result, Topic};
use mantra_config::RedditConfig;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::{num::NonZeroU32, sync::Arc, time::Duration};
use tracing::{debug, instrument};

/// Where permalinks point.
const REDDIT_WEB_URL: &str = "https://www.reddit.com";

/// [`ContentSource`] backed by the public Reddit JSON API.
#[derive(Debug, Clone)]
pub struct RedditSource {
    client: Client,
    base_url: String,
    fetch_limit: u32,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
}

impl RedditSource {
    /// Builds a client from `config`. `request_timeout` bounds each HTTP
    /// request and should not exceed the scheduler's fetch timeout.
    pub fn new(config: &RedditConfig, request_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(request_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| MantraError::config_with_source("Failed to create HTTP client", e))?;

        let quota = Quota::per_minute(
            NonZeroU32::new(config.requests_per_minute)
                .ok_or_else(|| MantraError::config("Reddit request budget must be greater than 0"))?,
        );
        let rate_limiter = Arc::new(DefaultDirectRateLimiter::direct(quota));

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            fetch_limit: config.fetch_limit,
            rate_limiter,
        })
    }

    fn listing_url(&self, topic: &Topic) -> String {
        format!("{}/r/{}/hot.json", self.base_url, topic)
    }
}

#[async_trait]
impl ContentSource for RedditSource {
    #[instrument(skip(self), fields(topic = %topic))]
    async fn fetch_latest(&self, topic: &Topic) -> SourceResult<Vec<ContentItem>> {
        if !topic.is_valid_name() {
            return Err(SourceError::malformed(format!(
                "`{topic}` is not a subreddit name"
            )));
        }
        self.rate_limiter.until_ready().await;

        let url = self.listing_url(topic);
        let limit = self.fetch_limit.to_string();
        debug!("Requesting {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[("limit", limit.as_str()), ("raw_json", "1")])
            .send()
            .await
            .map_err(classify_request_error)?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            return Err(SourceError::transient(format!("Reddit returned {status}")));
        }
        if !status.is_success() {
            return Err(SourceError::transient(format!(
                "Reddit refused the listing with {status}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SourceError::transient_with_source("Failed to read response body", e))?;

        parse_listing(topic, &body, Utc::now())
    }

    fn name(&self) -> &str {
        "reddit"
    }
}

fn classify_request_error(error: reqwest::Error) -> SourceError {
    if error.is_timeout() {
        SourceError::transient_with_source("Request timeout", error)
    } else if error.is_connect() {
        SourceError::transient_with_source("Connection error", error)
    } else if error.is_decode() {
        SourceError::malformed_with_source("Undecodable response", error)
    } else {
        SourceError::transient_with_source("Request failed", error)
    }
}

#[derive(Debug, Deserialize)]
struct Listing {
    kind: String,
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    children: Vec<Thing>,
}

#[derive(Debug, Deserialize)]
struct Thing {
    data: Post,
}

#[derive(Debug, Deserialize)]
struct Post {
    id: String,
    title: String,
    #[serde(default)]
    url: String,
    permalink: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    over_18: bool,
    #[serde(default)]
    stickied: bool,
}

/// Parses a listing body into items stamped with `fetched_at`.
///
/// Stickied posts are skipped. Source order is preserved, so the cache keeps
/// Reddit's ranking among items fetched together.
pub fn parse_listing(
    topic: &Topic,
    body: &str,
    fetched_at: DateTime<Utc>,
) -> SourceResult<Vec<ContentItem>> {
    let listing: Listing = serde_json::from_str(body)
        .map_err(|e| SourceError::malformed_with_source("Unexpected listing shape", e))?;

    if listing.kind != "Listing" {
        return Err(SourceError::malformed(format!(
            "Expected a Listing, got {}",
            listing.kind
        )));
    }

    let items = listing
        .data
        .children
        .into_iter()
        .map(|thing| thing.data)
        .filter(|post| !post.stickied)
        .map(|post| {
            ContentItem::new(
                post.id,
                topic.clone(),
                ContentPayload {
                    title: post.title,
                    url: post.url,
                    permalink: format!("{REDDIT_WEB_URL}{}", post.permalink),
                    author: post.author,
                    score: post.score,
                    nsfw: post.over_18,
                },
                fetched_at,
            )
        })
        .collect();

    Ok(items)
}
