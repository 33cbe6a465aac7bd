//! # Mantra Bot
//!
//! Discord bot serving per-guild command prefixes and cached subreddit posts.
//!
//! This is the main binary crate that orchestrates the entire application lifecycle
//! using the Poise framework for Discord interactions.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod bot;
pub mod error;
pub mod lifecycle;

pub use bot::*;
pub use error::*;
pub use lifecycle::*;
