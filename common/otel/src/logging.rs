//! `tracing`-based structured logging setup.
//!
//! The engine never calls `println!`/`eprintln!` on its own hot paths;
//! arrow, worker and engine state transitions go through `tracing` events so
//! that an embedding application can choose its own sink (stderr, a file via
//! `tracing-appender`, an OTLP exporter) without the core depending on any
//! of them.

use tracing_subscriber::EnvFilter;

/// Output format for the default logging sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable, one line per event. Default for interactive runs.
    #[default]
    Compact,
    /// One JSON object per line, for log aggregation.
    Json,
}

/// Installs a global `tracing` subscriber reading its filter from
/// `RUST_LOG` (defaulting to `info`). Returns an error if a subscriber was
/// already installed in this process, which `tracing` reports as a plain
/// `std::error::Error`-compatible failure; callers that only ever call this
/// once (the CLI entry point) can safely `.expect()` it, so this returns
/// `Result` rather than panicking itself.
pub fn init_logging(format: LogFormat) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
}
