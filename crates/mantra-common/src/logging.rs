//! Structured logging infrastructure for Mantra

use crate::error::{MantraError, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, writer::BoxMakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Configuration for the logging system
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "mantra_content=debug")
    pub level: String,
    /// Whether to emit JSON lines instead of human readable output
    pub json_format: bool,
    /// Whether to use the multi-line pretty formatter
    pub pretty_format: bool,
    /// Optional file path; the file is rotated daily
    pub file_path: Option<String>,
    /// Whether to include target module information
    pub include_targets: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            pretty_format: false,
            file_path: None,
            include_targets: true,
        }
    }
}

/// Initialize the tracing subscriber with the given configuration.
///
/// When logging to a file the returned guard must be kept alive for the
/// lifetime of the process, otherwise buffered lines are lost.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_new(&config.level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| MantraError::config_with_source("Invalid log filter", e))?;

    let (writer, guard, ansi) = match &config.file_path {
        Some(file_path) => {
            let path = Path::new(file_path);
            let directory = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .ok_or_else(|| MantraError::config(format!("Invalid log file path: {file_path}")))?;

            let appender = tracing_appender::rolling::daily(directory, file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(non_blocking), Some(guard), false)
        }
        None => (BoxMakeWriter::new(std::io::stdout), None, true),
    };

    let layer: BoxedLayer = if config.json_format {
        fmt::layer()
            .json()
            .with_target(config.include_targets)
            .with_writer(writer)
            .boxed()
    } else if config.pretty_format {
        fmt::layer()
            .pretty()
            .with_ansi(ansi)
            .with_target(config.include_targets)
            .with_writer(writer)
            .boxed()
    } else {
        fmt::layer()
            .with_ansi(ansi)
            .with_target(config.include_targets)
            .with_thread_ids(true)
            .with_writer(writer)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(layer.with_filter(env_filter))
        .try_init()
        .map_err(|e| MantraError::with_source("Failed to install tracing subscriber", e))?;

    Ok(guard)
}
