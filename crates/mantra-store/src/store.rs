//! The persistence seam for guild configuration.

use crate::error::StoreResult;
use crate::model::GuildConfig;
use async_trait::async_trait;
use mantra_common::GuildId;

/// Durable storage of one [`GuildConfig`] per guild.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GuildStore: Send + Sync {
    /// Fetches the record for a guild, if one exists.
    async fn get(&self, guild_id: GuildId) -> StoreResult<Option<GuildConfig>>;

    /// Returns the guild's record, creating it with `default_prefix` first if
    /// it does not exist.
    ///
    /// Implementations must make the create atomic: concurrent callers for the
    /// same guild create at most one record and all observe the same prefix.
    async fn create_if_absent(
        &self,
        guild_id: GuildId,
        default_prefix: &str,
    ) -> StoreResult<GuildConfig>;

    /// Stores a new prefix for a guild, creating the record if needed.
    async fn set_prefix(&self, guild_id: GuildId, prefix: &str) -> StoreResult<GuildConfig>;
}
