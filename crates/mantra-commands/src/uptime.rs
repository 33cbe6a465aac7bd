//! Uptime command accessing framework data through Poise's context.

use crate::framework::{Context, Error};
use chrono::Utc;
use mantra_common::format_duration;

/// Shows bot uptime.
#[poise::command(prefix_command, slash_command)]
pub async fn uptime(ctx: Context<'_>) -> Result<(), Error> {
    let elapsed = Utc::now() - ctx.data().started_at;
    ctx.say(format!("Up for {}", format_duration(elapsed))).await?;
    Ok(())
}
