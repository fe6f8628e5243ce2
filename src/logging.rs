//! `tracing` subscriber setup for the binaries.
//!
//! The level defaults to `info`; `RUST_LOG` overrides it.

use tracing_subscriber::EnvFilter;

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line, no timestamps or colors (CloudWatch adds both).
    Json,
    /// Human-readable lines for a terminal.
    Pretty,
}

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global subscriber. Later calls are no-ops.
pub fn init(format: LogFormat) {
    // Err only when a subscriber is already installed.
    let _ = match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter())
            .with_current_span(false)
            .with_ansi(false)
            .without_time()
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter())
            .with_target(false)
            .try_init(),
    };
}
