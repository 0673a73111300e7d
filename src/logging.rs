//! Tracing subscriber setup.
//!
//! `RUST_LOG` wins when set. Otherwise verbosity flags pick the level:
//! `-q` → error, default → info, `-v` → debug, `-vv` → trace.

use tracing_subscriber::EnvFilter;

use crate::config::LogFormat;
use crate::error::{AppError, Result};

/// Level directive for the given verbosity flags.
#[must_use]
pub const fn level_for(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber, writing to stderr.
///
/// # Errors
///
/// Returns `Logging` if a global subscriber is already installed.
pub fn init_logging(verbose: u8, quiet: bool, format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_for(verbose, quiet)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    let installed = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().with_current_span(false).try_init(),
    };

    installed.map_err(|e| AppError::Logging(e.to_string()))
}
