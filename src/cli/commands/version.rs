//! Version command implementation.

use serde::Serialize;

use crate::cli::VersionArgs;
use crate::error::Result;

#[derive(Serialize)]
struct VersionOutput<'a> {
    version: &'a str,
    build: &'a str,
}

/// Execute the version command.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute(args: &VersionArgs) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");
    let build = if cfg!(debug_assertions) {
        "dev"
    } else {
        "release"
    };

    if args.json {
        let output = VersionOutput { version, build };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!("itrack {version} ({build})");
    Ok(())
}
