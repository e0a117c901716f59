//! Logging initialization.
//!
//! Call once at startup, after the configuration is loaded. The returned
//! guard must be kept alive for the life of the process so buffered log
//! lines are flushed.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// # Panics
/// If the log file cannot be opened or a global subscriber is already set.
pub fn init_logging(config: &LoggingConfig) -> tracing_appender::non_blocking::WorkerGuard {
    let writer: Box<dyn std::io::Write + Send + Sync> = match &config.file {
        Some(path) if !path.is_empty() => Box::new(
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .expect("Failed to open log file"),
        ),
        _ => Box::new(std::io::stdout()),
    };

    let (non_blocking_writer, guard) = tracing_appender::non_blocking(writer);
    let filter = EnvFilter::new(config.level.clone());

    tracing_subscriber::fmt()
        .with_writer(non_blocking_writer)
        .with_env_filter(filter)
        .init();

    guard
}
