//! Built-in help.

use crate::framework::{Context, Error};

/// Lists commands, or explains one of them.
#[poise::command(prefix_command, slash_command, track_edits)]
pub async fn help(
    ctx: Context<'_>,
    #[description = "Command to explain"]
    #[autocomplete = "poise::builtins::autocomplete_command"]
    command: Option<String>,
) -> Result<(), Error> {
    poise::builtins::help(
        ctx,
        command.as_deref(),
        poise::builtins::HelpConfiguration {
            extra_text_at_bottom: "Mention the bot instead of a prefix if you forget it.",
            ..Default::default()
        },
    )
    .await?;
    Ok(())
}
