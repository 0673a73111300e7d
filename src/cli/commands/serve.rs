//! Serve command implementation.

use std::net::SocketAddr;
use std::sync::Arc;

use issuetrack_lib::DocumentStore;
use tokio::net::TcpListener;
use tracing::info;

use crate::cli::ServeArgs;
use crate::error::Result;
use crate::http::{AppState, build_router};
use crate::{config, logging, storage};

/// Execute the serve command.
///
/// # Errors
///
/// Returns an error if configuration, logging, the store or the listener
/// cannot be set up, or if the server stops with an I/O error.
pub fn execute(args: &ServeArgs, verbose: u8, quiet: bool) -> Result<()> {
    let config = config::load(&args.overrides())?;
    logging::init_logging(verbose, quiet, config.log_format)?;
    let store = storage::open_store(&config.database_url)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(serve(config.bind, store))
}

/// Bind `addr` and serve until a shutdown signal arrives.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(addr: SocketAddr, store: Arc<dyn DocumentStore>) -> Result<()> {
    let backend = store.backend();
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, backend, "listening");

    axum::serve(listener, build_router(AppState::new(store)))
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        if let (Ok(mut sigterm), Ok(mut sigint)) = (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            tokio::select! {
                _ = sigterm.recv() => info!("received SIGTERM"),
                _ = sigint.recv() => info!("received SIGINT"),
            }
            return;
        }
    }
    let _ = tokio::signal::ctrl_c().await;
    info!("received Ctrl-C");
}
