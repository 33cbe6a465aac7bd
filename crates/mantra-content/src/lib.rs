//! # Mantra Content
//!
//! Keeps the latest posts of a set of subreddits in memory.
//!
//! A [`ContentSource`] yields items for a topic, the [`IngestionScheduler`]
//! polls it in the background with timeouts and exponential backoff, and the
//! [`ContentCache`] holds bounded, deduplicated, newest-first snapshots that
//! command handlers can read without ever waiting on the network.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod backoff;
pub mod cache;
pub mod error;
pub mod item;
pub mod reddit;
pub mod scheduler;
pub mod source;

pub use backoff::Backoff;
pub use cache::{CacheEntry, ContentCache, RefreshError};
pub use error::{RefreshErrorKind, SourceError, SourceResult};
pub use item::{ContentItem, ContentPayload};
pub use reddit::RedditSource;
pub use scheduler::{IngestionHandle, IngestionPhase, IngestionScheduler, IngestionSettings};
pub use source::ContentSource;
