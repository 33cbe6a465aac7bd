//! # Mantra Store
//!
//! Durable per-guild configuration for the Mantra bot.
//!
//! The [`GuildStore`] trait is the seam to persistence. [`SqliteGuildStore`]
//! is the production implementation, [`MemoryGuildStore`] backs tests and
//! ephemeral deployments. [`PrefixResolver`] sits on top and answers "which
//! prefix does this guild use", creating the guild record on first sight.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod memory;
pub mod model;
pub mod resolver;
pub mod sqlite;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryGuildStore;
pub use model::GuildConfig;
pub use resolver::PrefixResolver;
pub use sqlite::SqliteGuildStore;
pub use store::GuildStore;
