//! Main entry point for Mantra.

use anyhow::{Context, Result};
use mantra_bot::{Lifecycle, MantraBot};
use mantra_common::init_logging;
use mantra_config::ConfigLoader;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ConfigLoader::load().context("Failed to load configuration")?;

    // Held until exit so buffered file output is flushed.
    let _log_guard = init_logging(&config.logging.to_logging_config())?;

    info!("Starting Mantra v{}", env!("CARGO_PKG_VERSION"));

    let services = Lifecycle::start(&config)
        .await
        .context("Failed to start services")?;

    let shutdown = services.shutdown_token();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {:?}", e);
            return;
        }
        info!("Received shutdown signal, starting graceful shutdown");
        signal.cancel();
    });

    let bot = MantraBot::new(config);
    let result = bot.run(&services, shutdown).await;
    if let Err(e) = &result {
        error!("Bot stopped with an error: {}", e);
    }

    services.stop().await;
    info!("Shutdown complete");

    result.map_err(Into::into)
}
