//! Read-through prefix resolution.

use crate::error::{StoreError, StoreResult};
use crate::model::GuildConfig;
use crate::store::GuildStore;
use mantra_common::{validate_prefix, GuildId};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Resolves the command prefix of a guild, creating its record on first use.
///
/// The resolver holds no copy of any prefix. Every call reads through to the
/// store, so a prefix changed with [`set_prefix`](Self::set_prefix) is visible
/// to the next resolution without any invalidation step.
pub struct PrefixResolver {
    store: Arc<dyn GuildStore>,
    default_prefix: String,
}

impl PrefixResolver {
    /// Creates a resolver over `store` that hands out `default_prefix` for
    /// direct messages and newly seen guilds.
    pub fn new(store: Arc<dyn GuildStore>, default_prefix: impl Into<String>) -> Self {
        Self {
            store,
            default_prefix: default_prefix.into(),
        }
    }

    /// The process-wide default prefix.
    pub fn default_prefix(&self) -> &str {
        &self.default_prefix
    }

    /// Returns the prefix for `guild_id`.
    ///
    /// `None` means a direct message and yields the default prefix without
    /// touching the store. Store failures are returned as-is; callers decide
    /// whether falling back to the default is acceptable.
    #[instrument(skip(self))]
    pub async fn resolve(&self, guild_id: Option<GuildId>) -> StoreResult<String> {
        let Some(guild_id) = guild_id else {
            return Ok(self.default_prefix.clone());
        };

        if let Some(config) = self.store.get(guild_id).await? {
            return Ok(config.prefix);
        }

        debug!("Guild {} has no configuration yet", guild_id);
        let config = self
            .store
            .create_if_absent(guild_id, &self.default_prefix)
            .await?;
        Ok(config.prefix)
    }

    /// Validates and stores a new prefix for `guild_id`.
    #[instrument(skip(self))]
    pub async fn set_prefix(&self, guild_id: GuildId, prefix: &str) -> StoreResult<GuildConfig> {
        validate_prefix(prefix).map_err(|reason| StoreError::InvalidPrefix {
            prefix: prefix.to_string(),
            reason,
        })?;

        self.store.set_prefix(guild_id, prefix).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MockGuildStore;

    fn resolver(store: MockGuildStore) -> PrefixResolver {
        PrefixResolver::new(Arc::new(store), ".")
    }

    #[tokio::test]
    async fn test_direct_messages_never_touch_the_store() {
        let mut store = MockGuildStore::new();
        store.expect_get().never();
        store.expect_create_if_absent().never();

        let prefix = resolver(store).resolve(None).await.unwrap();
        assert_eq!(prefix, ".");
    }

    #[tokio::test]
    async fn test_hit_returns_stored_prefix() {
        let mut store = MockGuildStore::new();
        store
            .expect_get()
            .times(1)
            .returning(|id| Ok(Some(GuildConfig::new(id, "m!"))));
        store.expect_create_if_absent().never();

        let prefix = resolver(store).resolve(Some(GuildId(7))).await.unwrap();
        assert_eq!(prefix, "m!");
    }

    #[tokio::test]
    async fn test_miss_creates_with_default() {
        let mut store = MockGuildStore::new();
        store.expect_get().times(1).returning(|_| Ok(None));
        store
            .expect_create_if_absent()
            .withf(|id, prefix| *id == GuildId(7) && prefix == ".")
            .times(1)
            .returning(|id, prefix| Ok(GuildConfig::new(id, prefix)));

        let prefix = resolver(store).resolve(Some(GuildId(7))).await.unwrap();
        assert_eq!(prefix, ".");
    }

    #[tokio::test]
    async fn test_unavailable_store_is_not_masked() {
        let mut store = MockGuildStore::new();
        store
            .expect_get()
            .returning(|_| Err(StoreError::unavailable("connection refused")));
        store.expect_create_if_absent().never();

        let err = resolver(store).resolve(Some(GuildId(7))).await.unwrap_err();
        assert!(err.is_unavailable());
    }

    #[tokio::test]
    async fn test_failed_creation_is_not_masked() {
        let mut store = MockGuildStore::new();
        store.expect_get().returning(|_| Ok(None));
        store
            .expect_create_if_absent()
            .returning(|_, _| Err(StoreError::unavailable("disk full")));

        let err = resolver(store).resolve(Some(GuildId(7))).await.unwrap_err();
        assert!(err.is_unavailable());
    }

    #[tokio::test]
    async fn test_invalid_prefix_is_rejected_before_the_store() {
        let mut store = MockGuildStore::new();
        store.expect_set_prefix().never();

        let err = resolver(store)
            .set_prefix(GuildId(7), "no spaces")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidPrefix { .. }));
    }
}
