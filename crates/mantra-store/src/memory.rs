//! In-process guild store.

use crate::error::StoreResult;
use crate::model::GuildConfig;
use crate::store::GuildStore;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use mantra_common::GuildId;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// Guild store kept entirely in memory.
///
/// Creation goes through the map's entry API, which holds the shard lock for
/// the key, so concurrent `create_if_absent` calls insert exactly once.
#[derive(Debug, Default)]
pub struct MemoryGuildStore {
    guilds: DashMap<GuildId, String>,
    creations: AtomicUsize,
}

impl MemoryGuildStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records created by `create_if_absent`.
    pub fn creations(&self) -> usize {
        self.creations.load(Ordering::SeqCst)
    }

    /// Number of stored guilds.
    pub fn len(&self) -> usize {
        self.guilds.len()
    }

    /// Returns true if no guild is stored.
    pub fn is_empty(&self) -> bool {
        self.guilds.is_empty()
    }
}

#[async_trait]
impl GuildStore for MemoryGuildStore {
    async fn get(&self, guild_id: GuildId) -> StoreResult<Option<GuildConfig>> {
        Ok(self
            .guilds
            .get(&guild_id)
            .map(|prefix| GuildConfig::new(guild_id, prefix.value().clone())))
    }

    async fn create_if_absent(
        &self,
        guild_id: GuildId,
        default_prefix: &str,
    ) -> StoreResult<GuildConfig> {
        let prefix = match self.guilds.entry(guild_id) {
            Entry::Occupied(entry) => entry.get().clone(),
            Entry::Vacant(entry) => {
                self.creations.fetch_add(1, Ordering::SeqCst);
                debug!("Created configuration for guild {}", guild_id);
                entry.insert(default_prefix.to_string()).value().clone()
            }
        };

        Ok(GuildConfig::new(guild_id, prefix))
    }

    async fn set_prefix(&self, guild_id: GuildId, prefix: &str) -> StoreResult<GuildConfig> {
        self.guilds.insert(guild_id, prefix.to_string());
        Ok(GuildConfig::new(guild_id, prefix))
    }
}
