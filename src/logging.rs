//! Diagnostic logging
//!
//! Diagnostics go to stderr so that stdout only ever carries the error
//! message of a failed run.

use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogFormat;

/// Filter directive for a `-v` count
pub fn level_directive(verbose: u8) -> String {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    format!("{}={}", env!("CARGO_CRATE_NAME"), level)
}

/// Install the global subscriber
///
/// `RUST_LOG` takes precedence over the verbosity flag. Calling this twice
/// is harmless; the second call leaves the first subscriber in place.
pub fn init(verbose: u8, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_directive(verbose)));

    let builder = fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(false);

    let _ = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().flatten_event(true).try_init(),
    };
}
