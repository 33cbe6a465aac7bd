//! Poise framework setup and command registration logic.

use chrono::{DateTime, Utc};
use mantra_common::{GuildId, Topic};
use mantra_content::ContentCache;
use mantra_store::PrefixResolver;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::{error, warn};

/// Application data accessible in all commands.
pub struct Data {
    /// Guild prefix lookups.
    pub resolver: Arc<PrefixResolver>,
    /// Ingested subreddit posts.
    pub cache: Arc<ContentCache>,
    /// Topic used when a command does not name one.
    pub default_topic: Topic,
    /// Topics kept in the cache by ingestion.
    pub tracked_topics: Vec<Topic>,
    /// When the bot came up.
    pub started_at: DateTime<Utc>,
}

impl std::fmt::Debug for Data {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Data")
            .field("resolver", &"<PrefixResolver>")
            .field("cache", &self.cache)
            .field("default_topic", &self.default_topic)
            .field("tracked_topics", &self.tracked_topics)
            .field("started_at", &self.started_at)
            .finish()
    }
}

/// Application error type for commands.
pub type Error = Box<dyn std::error::Error + Send + Sync>;

/// Command context type.
pub type Context<'a> = poise::Context<'a, Data, Error>;

/// Converts a Discord guild id into the store key.
pub fn to_guild_id(id: serenity::GuildId) -> GuildId {
    GuildId(id.get())
}

/// All commands the bot exposes.
pub fn commands() -> Vec<poise::Command<Data, Error>> {
    vec![
        crate::help::help(),
        crate::about::about(),
        crate::uptime::uptime(),
        crate::prefix::prefix(),
        crate::reddit::reddit(),
    ]
}

/// Framework options: commands, prefix handling and error reporting.
pub fn framework_options() -> poise::FrameworkOptions<Data, Error> {
    poise::FrameworkOptions {
        commands: commands(),
        on_error: |error| Box::pin(on_error(error)),
        prefix_options: poise::PrefixFrameworkOptions {
            prefix: None,
            dynamic_prefix: Some(dynamic_prefix),
            mention_as_prefix: true,
            ignore_bots: true,
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Creates a new Poise framework. The caller supplies `setup`.
pub fn create_framework() -> poise::FrameworkBuilder<Data, Error> {
    poise::Framework::builder().options(framework_options())
}

/// Prefix for a message in `guild_id`.
///
/// A failing store must not make the bot deaf, so store errors are logged
/// and the default prefix is used for this message only.
pub async fn resolve_prefix(data: &Data, guild_id: Option<GuildId>) -> String {
    match data.resolver.resolve(guild_id).await {
        Ok(prefix) => prefix,
        Err(e) => {
            warn!("Prefix lookup failed, using the default: {}", e);
            data.resolver.default_prefix().to_string()
        }
    }
}

fn dynamic_prefix(
    ctx: poise::PartialContext<'_, Data, Error>,
) -> poise::BoxFuture<'_, Result<Option<String>, Error>> {
    Box::pin(async move {
        let prefix = resolve_prefix(ctx.data, ctx.guild_id.map(to_guild_id)).await;
        Ok(Some(prefix))
    })
}

/// Global error handler for the framework
async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {:?}", error);
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command '{}': {:?}", ctx.command().name, error);
            if let Err(e) = ctx.say("Something went wrong running that command.").await {
                error!("Failed to report command error: {:?}", e);
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {:?}", e);
            }
        }
    }
}
