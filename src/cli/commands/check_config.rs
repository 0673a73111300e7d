//! Check-config command implementation.

use serde::Serialize;

use crate::cli::ServeArgs;
use crate::config::ServerConfig;
use crate::error::Result;
use crate::{config, logging, storage};

#[derive(Serialize)]
struct CheckOutput<'a> {
    #[serde(flatten)]
    config: &'a ServerConfig,
    backend: &'a str,
    issues: usize,
}

/// Resolve configuration as `serve` would, open the store, and print the
/// result as JSON.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the store cannot be opened.
pub fn execute(args: &ServeArgs, verbose: u8, quiet: bool) -> Result<()> {
    let config = config::load(&args.overrides())?;
    logging::init_logging(verbose, quiet, config.log_format)?;
    let store = storage::open_store(&config.database_url)?;

    let output = CheckOutput {
        config: &config,
        backend: store.backend(),
        issues: store.count()?,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
