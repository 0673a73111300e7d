//! `issuetrack` - project-scoped issue tracking REST API
//!
//! This crate provides the `itrack` binary: an axum server exposing
//! create / list / update / delete on `/api/issues/:project`, backed by a
//! [`issuetrack_lib::DocumentStore`].
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`config`] - Layered configuration (flags, env, YAML, defaults)
//! - [`error`] - Error types and handling
//! - [`http`] - Router, handlers and response mapping
//! - [`logging`] - tracing subscriber setup
//! - [`storage`] - Store selection and the `SQLite` backend

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod storage;

pub use error::{AppError, Result};
pub use http::{AppState, build_router};

/// Run the CLI application.
///
/// This is the main entry point called from `main()`.
///
/// # Errors
///
/// Returns an error if command execution fails.
pub fn run() -> anyhow::Result<()> {
    cli::run()
}
