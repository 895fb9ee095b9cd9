//! Structured logging setup using the `tracing` ecosystem.
//!
//! Console output goes to stderr; a daily-rotated file under the log
//! directory receives either plain or JSON lines.

use std::path::Path;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::ScResult;

/// File name prefix for the rotated log files.
const LOG_FILE_PREFIX: &str = "showcase.log";

/// Initialize the global tracing subscriber from the logging section.
///
/// `level_override` wins over `config.level` when set (the CLI's
/// `--verbose` flag uses it).
pub fn init_logging(
    config: &LoggingConfig,
    log_dir: &Path,
    level_override: Option<&str>,
) -> ScResult<LogGuard> {
    std::fs::create_dir_all(log_dir)?;

    let level = level_override.unwrap_or(&config.level);
    let file_appender = rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact();

    // The two file layers have different types, so each branch finishes
    // building the registry itself.
    if config.json_output {
        let file_layer = fmt::layer()
            .with_writer(non_blocking)
            .json()
            .with_target(true)
            .with_file(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(env_filter(level))
            .with(console_layer)
            .with(file_layer)
            .try_init()
            .map_err(|e| crate::error::ScError::Internal(format!("logging init: {e}")))?;
    } else {
        let file_layer = fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .with_file(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(env_filter(level))
            .with(console_layer)
            .with(file_layer)
            .try_init()
            .map_err(|e| crate::error::ScError::Internal(format!("logging init: {e}")))?;
    }

    tracing::debug!("logging initialized at level={level}, dir={}", log_dir.display());

    Ok(LogGuard { _guard: guard })
}

/// Guard that keeps the non-blocking log writer alive.
/// Drop this to flush and close the log file.
pub struct LogGuard {
    _guard: tracing_appender::non_blocking::WorkerGuard,
}

/// Initialize a minimal console-only logger for testing or simple CLI usage.
pub fn init_console_logging(level: &str) {
    let _ = tracing_subscriber::registry()
        .with(env_filter(level))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true).compact())
        .try_init();
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
}
