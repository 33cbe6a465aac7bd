//! About command implementation using Poise's command macro.

use crate::framework::{resolve_prefix, to_guild_id, Context, Error};

/// Shows information about the bot.
#[poise::command(prefix_command, slash_command)]
pub async fn about(ctx: Context<'_>) -> Result<(), Error> {
    let prefix = resolve_prefix(ctx.data(), ctx.guild_id().map(to_guild_id)).await;
    let response = about_text(&prefix, env!("CARGO_PKG_VERSION"));

    ctx.say(response).await?;
    Ok(())
}

fn about_text(prefix: &str, version: &str) -> String {
    format!(
        "**Mantra** v{version}\n\
         Fresh subreddit posts on demand.\n\
         Prefix here: `{prefix}` (mentioning the bot works too)\n\
         Built with Rust and the Poise framework."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_about_mentions_prefix_and_version() {
        let text = about_text("m!", "1.2.3");
        assert!(text.contains("v1.2.3"));
        assert!(text.contains("`m!`"));
    }
}
