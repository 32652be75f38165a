//! # Logging Setup
//!
//! Installs a `tracing` subscriber with a console layer on stderr and an
//! optional JSON file layer written through a daily rolling appender. Stdout
//! is left to the program's own output.

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Options for [`init_logging`].
#[derive(Debug, Clone)]
pub struct LoggingOptions {
    /// Filter used when `RUST_LOG` is not set (e.g. "info", "lib_chunkquery=debug").
    pub level: String,
    /// Directory for JSON log files; `None` logs to the console only.
    pub log_dir: Option<PathBuf>,
    /// File name prefix for the rolling log files.
    pub file_prefix: String,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: None,
            file_prefix: "chunk-query".to_string(),
        }
    }
}

/// Installs the global subscriber.
///
/// Returns the file writer guard when a log directory is configured; it must
/// be held until the program exits or buffered lines are lost.
pub fn init_logging(options: &LoggingOptions) -> io::Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&options.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal());

    let (file_layer, guard) = match &options.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = rolling::daily(dir, &options.file_prefix);
            let (writer, guard) = non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer).json();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(io::Error::other)?;

    info!(level = %options.level, log_dir = ?options.log_dir, "logging initialized");
    Ok(guard)
}
