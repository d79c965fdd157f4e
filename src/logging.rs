//! Logging setup.
//!
//! The library itself only emits `tracing` events and works under whatever
//! subscriber the embedding installs. Embeddings without their own setup
//! can call [`init_logging`] once at startup to get the crate's standard
//! arrangement: a per-session log file (truncated on start) and an
//! optional console echo, filtered via `RUST_LOG` with a configurable
//! fallback.

use std::fs;
use std::io;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Where and how the crate's standard logging writes.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Directory for log files, created if missing (default: "logs")
    pub dir: PathBuf,
    /// Session log filename (default: "metatile.log")
    pub file: String,
    /// Whether to echo events to stdout as well (default: true)
    pub console: bool,
    /// Filter applied when RUST_LOG is not set (default: "info")
    pub fallback_filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("logs"),
            file: "metatile.log".to_string(),
            console: true,
            fallback_filter: "info".to_string(),
        }
    }
}

/// Guard that must be kept alive for the duration of logging.
///
/// Dropping this guard flushes and closes the log file writer.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Install the crate's standard logging subscriber.
///
/// Each session starts with an empty log file; pointer-rate `trace` events
/// stay out of the file unless RUST_LOG asks for them.
///
/// Global: may only be called once per process. Returns the guard that
/// keeps the file writer alive.
///
/// # Errors
///
/// Returns an error if the log directory cannot be created or the session
/// log cannot be truncated.
pub fn init_logging(config: &LoggingConfig) -> Result<LoggingGuard, io::Error> {
    fs::create_dir_all(&config.dir)?;

    // Truncate the previous session's log; also creates a missing file
    let log_path = config.dir.join(&config.file);
    fs::write(&log_path, "")?;

    let file_appender = tracing_appender::rolling::never(&config.dir, &config.file);
    let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .compact();

    let console_layer = config.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(io::stdout)
            .compact()
    });

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.fallback_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}
