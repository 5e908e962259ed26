//! Structured logging infrastructure: console output plus a daily rolling file.

use crate::error::{HeraldError, Result};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Configuration for the logging system.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "herald_commands=debug"). `RUST_LOG` wins when set.
    pub level: String,
    /// Directory that receives the rolling log files.
    pub directory: PathBuf,
    /// File name prefix; the appender adds a `.YYYY-MM-DD` suffix.
    pub file_prefix: String,
    /// Whether console output uses ANSI colours.
    pub console_ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: PathBuf::from("logs"),
            file_prefix: "herald.log".to_string(),
            console_ansi: true,
        }
    }
}

/// Initializes the global subscriber with a console layer and a daily rolling file layer.
///
/// The returned guard flushes the file writer on drop and must be held for
/// the lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| HeraldError::Logging(format!("invalid log filter '{}': {e}", config.level)))?;

    std::fs::create_dir_all(&config.directory)?;
    let appender = tracing_appender::rolling::daily(&config.directory, &config.file_prefix);
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_ansi(config.console_ansi)
                .with_target(true),
        )
        .with(
            fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .try_init()
        .map_err(|e| HeraldError::Logging(e.to_string()))?;

    Ok(guard)
}

/// Logs an `info` event tagged with `outcome = "success"`.
///
/// ```rust
/// herald_common::success!(count = 3, "Loaded slash commands");
/// ```
#[macro_export]
macro_rules! success {
    ($($arg:tt)+) => {
        $crate::tracing::info!(outcome = "success", $($arg)+)
    };
}
