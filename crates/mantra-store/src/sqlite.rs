//! SQLite-backed guild store.

use crate::error::StoreResult;
use crate::model::GuildConfig;
use crate::store::GuildStore;
use async_trait::async_trait;
use mantra_common::GuildId;
use mantra_config::DatabaseConfig;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Guild store persisted in SQLite through an sqlx connection pool.
#[derive(Debug, Clone)]
pub struct SqliteGuildStore {
    pool: SqlitePool,
}

impl SqliteGuildStore {
    /// Opens the database described by `config` and ensures the schema exists.
    pub async fn connect(config: &DatabaseConfig) -> StoreResult<Self> {
        info!("Opening guild store at {}", config.url);

        let acquire_timeout = Duration::from_secs(config.acquire_timeout_seconds);
        let in_memory = config.url.contains(":memory:") || config.url.contains("mode=memory");

        let mut options = SqliteConnectOptions::from_str(&config.url)?
            .create_if_missing(true)
            .busy_timeout(acquire_timeout);
        if !in_memory {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        // Every connection to an in-memory database sees its own empty
        // database, so those pools are pinned to one long-lived connection.
        let mut pool_options = SqlitePoolOptions::new().acquire_timeout(acquire_timeout);
        pool_options = if in_memory {
            pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            pool_options.max_connections(config.max_connections)
        };

        let pool = pool_options.connect_with(options).await?;
        let store = Self { pool };
        store.initialize_schema().await?;

        info!("Guild store ready");
        Ok(store)
    }

    async fn initialize_schema(&self) -> StoreResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS guilds (
                id INTEGER PRIMARY KEY NOT NULL,
                prefix TEXT NOT NULL,
                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        debug!("Guild schema initialized");
        Ok(())
    }

    /// Number of stored guild records.
    pub async fn count(&self) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM guilds")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Closes every pooled connection. Pending queries finish first.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Guild store closed");
    }

    /// Returns true once [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }
}

// Discord snowflakes use 63 bits, so the bit pattern fits SQLite's signed INTEGER.
#[allow(clippy::cast_possible_wrap)]
const fn row_id(guild_id: GuildId) -> i64 {
    guild_id.get() as i64
}

#[async_trait]
impl GuildStore for SqliteGuildStore {
    #[instrument(skip(self))]
    async fn get(&self, guild_id: GuildId) -> StoreResult<Option<GuildConfig>> {
        let row = sqlx::query("SELECT prefix FROM guilds WHERE id = ?")
            .bind(row_id(guild_id))
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(GuildConfig::new(guild_id, row.try_get::<String, _>("prefix")?))),
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    async fn create_if_absent(
        &self,
        guild_id: GuildId,
        default_prefix: &str,
    ) -> StoreResult<GuildConfig> {
        let inserted = sqlx::query(
            "INSERT INTO guilds (id, prefix) VALUES (?, ?) ON CONFLICT(id) DO NOTHING",
        )
        .bind(row_id(guild_id))
        .bind(default_prefix)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if inserted > 0 {
            info!("Created configuration for guild {}", guild_id);
        }

        let prefix: String = sqlx::query_scalar("SELECT prefix FROM guilds WHERE id = ?")
            .bind(row_id(guild_id))
            .fetch_one(&self.pool)
            .await?;

        Ok(GuildConfig::new(guild_id, prefix))
    }

    #[instrument(skip(self))]
    async fn set_prefix(&self, guild_id: GuildId, prefix: &str) -> StoreResult<GuildConfig> {
        sqlx::query(
            r#"
            INSERT INTO guilds (id, prefix) VALUES (?, ?)
            ON CONFLICT(id) DO UPDATE SET prefix = excluded.prefix, updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(row_id(guild_id))
        .bind(prefix)
        .execute(&self.pool)
        .await?;

        info!("Updated prefix for guild {}", guild_id);
        Ok(GuildConfig::new(guild_id, prefix))
    }
}
