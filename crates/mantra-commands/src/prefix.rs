//! Prefix subcommands with Poise's built-in subcommand support.

use crate::framework::{to_guild_id, Context, Error};
use mantra_store::StoreError;
use tracing::{info, warn};

/// Shows or changes this server's command prefix.
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    subcommands("show", "set")
)]
pub async fn prefix(ctx: Context<'_>) -> Result<(), Error> {
    show_prefix(ctx).await
}

/// Shows the current prefix.
#[poise::command(prefix_command, slash_command, guild_only)]
pub async fn show(ctx: Context<'_>) -> Result<(), Error> {
    show_prefix(ctx).await
}

/// Changes the prefix for this server.
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "MANAGE_GUILD"
)]
pub async fn set(
    ctx: Context<'_>,
    #[description = "New prefix, up to 16 characters without spaces"] new_prefix: String,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        return Ok(());
    };

    let reply = match ctx
        .data()
        .resolver
        .set_prefix(to_guild_id(guild_id), &new_prefix)
        .await
    {
        Ok(config) => {
            info!("Guild {} now uses prefix {:?}", config.id, config.prefix);
            format!("Prefix set to `{}`", config.prefix)
        }
        Err(e) => rejection(&e),
    };

    ctx.say(reply).await?;
    Ok(())
}

async fn show_prefix(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().map(to_guild_id);

    let reply = match ctx.data().resolver.resolve(guild_id).await {
        Ok(prefix) => format!("The prefix here is `{prefix}`"),
        Err(e) => {
            warn!("Prefix lookup failed: {}", e);
            format!(
                "Server settings are unavailable right now, `{}` works in the meantime.",
                ctx.data().resolver.default_prefix()
            )
        }
    };

    ctx.say(reply).await?;
    Ok(())
}

fn rejection(error: &StoreError) -> String {
    match error {
        StoreError::InvalidPrefix { reason, .. } => format!("That prefix won't work: {reason}."),
        StoreError::Unavailable { .. } => {
            warn!("Prefix update failed: {}", error);
            "Server settings are unavailable right now, try again later.".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_prefix_reply_carries_reason() {
        let err = StoreError::InvalidPrefix {
            prefix: "a b".into(),
            reason: "prefix cannot contain whitespace",
        };
        assert_eq!(
            rejection(&err),
            "That prefix won't work: prefix cannot contain whitespace."
        );
    }

    #[test]
    fn test_unavailable_reply_hides_details() {
        let reply = rejection(&StoreError::unavailable("database is locked"));
        assert!(!reply.contains("locked"));
    }
}
