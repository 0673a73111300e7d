//! Command-line interface for `itrack`.
//!
//! This module provides the CLI parsing and command routing using clap.

pub mod commands;

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::config::{CliOverrides, LogFormat};

/// `itrack` - project-scoped issue tracking REST API.
#[derive(Parser, Debug)]
#[command(name = "itrack")]
#[command(
    author,
    version,
    about = "Project-scoped issue tracking REST API",
    long_about = None,
    after_help = "Stores: memory: (default), jsonl:<path>, sqlite:<path>, sqlite::memory:"
)]
pub struct Cli {
    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server until Ctrl-C / SIGTERM
    Serve(ServeArgs),

    /// Resolve configuration, open the store and print the result as JSON
    CheckConfig(ServeArgs),

    /// Show version information
    Version(VersionArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// YAML config file
    #[arg(long, env = "ISSUETRACK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Listen address, e.g. 127.0.0.1:3000
    #[arg(long)]
    pub bind: Option<SocketAddr>,

    /// Store connection string
    #[arg(long = "db", value_name = "URL")]
    pub database_url: Option<String>,

    /// Log output format
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,
}

impl ServeArgs {
    #[must_use]
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            config: self.config.clone(),
            bind: self.bind,
            database_url: self.database_url.clone(),
            log_format: self.log_format,
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct VersionArgs {
    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the CLI.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve(args)) => commands::serve::execute(&args, cli.verbose, cli.quiet)?,
        Some(Commands::CheckConfig(args)) => {
            commands::check_config::execute(&args, cli.verbose, cli.quiet)?;
        }
        Some(Commands::Version(args)) => commands::version::execute(&args)?,
        None => println!("itrack - issue tracking REST API. Use --help for usage."),
    }

    Ok(())
}
