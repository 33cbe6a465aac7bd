//! Core bot logic using the Poise framework.

use crate::error::BotResult;
use crate::lifecycle::Services;
use mantra_commands::{create_framework, Data, Error};
use mantra_common::GuildId;
use mantra_config::Config;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Main bot structure.
pub struct MantraBot {
    config: Arc<Config>,
}

impl MantraBot {
    /// Creates a new bot instance.
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Gateway intents the bot needs. Message content is required for prefix
    /// commands.
    pub fn intents() -> serenity::GatewayIntents {
        serenity::GatewayIntents::non_privileged() | serenity::GatewayIntents::MESSAGE_CONTENT
    }

    /// Connects to Discord and serves commands until `shutdown` is cancelled
    /// or the gateway connection ends.
    pub async fn run(&self, services: &Services, shutdown: CancellationToken) -> BotResult<()> {
        let data = services.command_data();
        let test_guilds = self.config.discord.test_guilds.clone();

        let framework = create_framework()
            .setup(move |ctx, ready, framework| {
                Box::pin(async move {
                    info!("Bot connected as: {}", ready.user.name);
                    info!("Connected to {} guilds", ready.guilds.len());
                    register_commands(ctx, framework, &test_guilds).await?;
                    Ok(data)
                })
            })
            .build();

        let mut client = serenity::ClientBuilder::new(&self.config.discord.token, Self::intents())
            .framework(framework)
            .await?;

        let shard_manager = client.shard_manager.clone();
        let watcher = shutdown.clone();
        tokio::spawn(async move {
            watcher.cancelled().await;
            info!("Disconnecting from Discord");
            shard_manager.shutdown_all().await;
        });

        info!("Mantra is starting up...");
        let result = client.start().await;
        shutdown.cancel();
        result?;
        Ok(())
    }
}

/// Registers slash commands per test guild when any are configured, so
/// changes show up instantly, and globally otherwise.
async fn register_commands(
    ctx: &serenity::Context,
    framework: &poise::Framework<Data, Error>,
    test_guilds: &[GuildId],
) -> Result<(), Error> {
    let commands = &framework.options().commands;

    if test_guilds.is_empty() {
        poise::builtins::register_globally(ctx, commands).await?;
        info!("Slash commands registered globally");
        return Ok(());
    }

    for guild in test_guilds {
        poise::builtins::register_in_guild(ctx, commands, serenity::GuildId::new(guild.get()))
            .await?;
    }
    info!("Slash commands registered in {} test guild(s)", test_guilds.len());
    Ok(())
}
