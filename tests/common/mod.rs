//! Shared helpers for router integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use issuetrack::storage::SqliteStore;
use issuetrack::{AppState, build_router};
use issuetrack_lib::{
    DocumentStore, Filter, InMemoryStore, Issue, IssueUpdate, NewIssue, Result, TrackerError,
};
use serde_json::Value;
use tower::ServiceExt;

pub fn memory_app() -> Router {
    build_router(AppState::new(Arc::new(InMemoryStore::new())))
}

pub fn sqlite_app() -> Router {
    let store = SqliteStore::open_memory().expect("open in-memory sqlite");
    build_router(AppState::new(Arc::new(store)))
}

pub fn failing_app() -> Router {
    build_router(AppState::new(Arc::new(FailingStore)))
}

/// Store whose every call fails like a lost connection.
pub struct FailingStore;

fn offline<T>() -> Result<T> {
    Err(TrackerError::Storage("connection refused".to_string()))
}

impl DocumentStore for FailingStore {
    fn backend(&self) -> &'static str {
        "failing"
    }

    fn find(&self, _filter: &Filter) -> Result<Vec<Issue>> {
        offline()
    }

    fn insert(&self, _issue: NewIssue) -> Result<Issue> {
        offline()
    }

    fn update_by_id(&self, _id: &str, _update: &IssueUpdate) -> Result<Issue> {
        offline()
    }

    fn delete_by_id(&self, _id: &str) -> Result<usize> {
        offline()
    }

    fn count(&self) -> Result<usize> {
        offline()
    }
}

pub async fn send_raw(app: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .unwrap_or_else(|err| panic!("router request failed: {err}"));
    let status = response.status();
    let bytes = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap_or_else(|err| panic!("failed to read response body: {err}"));
    let body = String::from_utf8(bytes.to_vec()).expect("response body is UTF-8");
    (status, body)
}

/// Send a request with an optional JSON body and parse the JSON response.
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("build request");

    let (status, body) = send_raw(app, request).await;
    let value = serde_json::from_str(&body)
        .unwrap_or_else(|err| panic!("response body is not JSON: {err}; body={body}"));
    (status, value)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

pub async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn delete(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::DELETE, uri, Some(body)).await
}

/// Create an issue and return its `_id`.
pub async fn create(app: &Router, project: &str, body: Value) -> String {
    let (status, created) = post(app, &format!("/api/issues/{project}"), body).await;
    assert_eq!(status, StatusCode::OK);
    created["_id"]
        .as_str()
        .unwrap_or_else(|| panic!("create returned no _id: {created}"))
        .to_string()
}

pub fn ids(issues: &Value) -> Vec<&str> {
    issues
        .as_array()
        .expect("array response")
        .iter()
        .filter_map(|issue| issue["_id"].as_str())
        .collect()
}
