//! HTTP surface: one project-scoped resource, `/api/issues/:project`.
//!
//! # Submodules
//!
//! - [`handlers`] - one handler per verb
//! - [`payload`] - JSON / form body extraction
//! - [`response`] - outcome to status + JSON mapping

pub mod handlers;
pub mod payload;
pub mod response;

use std::sync::Arc;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use issuetrack_lib::{DocumentStore, Result as TrackerResult, TrackerError};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared router state: the injected store.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn DocumentStore>,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Run a blocking store call off the async workers.
    ///
    /// # Errors
    ///
    /// Returns the store's error; a panicked task surfaces as `Storage`.
    pub async fn run<T, F>(&self, op: F) -> TrackerResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn DocumentStore) -> TrackerResult<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || op(store.as_ref()))
            .await
            .unwrap_or_else(|e| Err(TrackerError::Storage(format!("store task failed: {e}"))))
    }
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not Found")
}

/// Build the application router.
#[must_use]
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/issues/:project",
            get(handlers::list_issues)
                .post(handlers::create_issue)
                .put(handlers::update_issue)
                .delete(handlers::delete_issue),
        )
        .fallback(not_found)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
