//! Response shapes for the issues API.
//!
//! Validation and not-found outcomes are HTTP 200 with an `error` payload;
//! store faults are HTTP 500 with the same operation wording.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use issuetrack_lib::Issue;
use serde::Serialize;

pub const MSG_MISSING_REQUIRED: &str = "required field(s) missing";
pub const MSG_MISSING_ID: &str = "missing _id";
pub const MSG_NO_UPDATE_FIELDS: &str = "no update field(s) sent";
pub const MSG_COULD_NOT_CREATE: &str = "could not create issue";
pub const MSG_COULD_NOT_UPDATE: &str = "could not update";
pub const MSG_COULD_NOT_DELETE: &str = "could not delete";
pub const MSG_SERVER_ERROR: &str = "server error";
pub const MSG_INVALID_BODY: &str = "invalid request body";
pub const MSG_UPDATED: &str = "successfully updated";
pub const MSG_DELETED: &str = "successfully deleted";

/// Every outcome a handler can produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiResponse {
    Created(Issue),
    Issues(Vec<Issue>),
    Updated { id: String },
    Deleted { id: String },
    MissingRequired,
    MissingId,
    NoUpdateFields { id: String },
    CouldNotUpdate { id: String },
    CouldNotDelete { id: String },
    CreateFailed,
    ReadFailed,
    UpdateFailed { id: String },
    DeleteFailed { id: String },
    InvalidBody,
}

#[derive(Serialize)]
struct Outcome<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
}

impl<'a> Outcome<'a> {
    const fn result(message: &'a str, id: &'a str) -> Self {
        Self {
            result: Some(message),
            error: None,
            id: Some(id),
        }
    }

    const fn error(message: &'a str, id: Option<&'a str>) -> Self {
        Self {
            result: None,
            error: Some(message),
            id,
        }
    }
}

impl ApiResponse {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::CreateFailed
            | Self::ReadFailed
            | Self::UpdateFailed { .. }
            | Self::DeleteFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidBody => StatusCode::BAD_REQUEST,
            _ => StatusCode::OK,
        }
    }

    fn outcome(&self) -> Option<Outcome<'_>> {
        let outcome = match self {
            Self::Created(_) | Self::Issues(_) => return None,
            Self::Updated { id } => Outcome::result(MSG_UPDATED, id),
            Self::Deleted { id } => Outcome::result(MSG_DELETED, id),
            Self::MissingRequired => Outcome::error(MSG_MISSING_REQUIRED, None),
            Self::MissingId => Outcome::error(MSG_MISSING_ID, None),
            Self::NoUpdateFields { id } => Outcome::error(MSG_NO_UPDATE_FIELDS, Some(id)),
            Self::CouldNotUpdate { id } | Self::UpdateFailed { id } => {
                Outcome::error(MSG_COULD_NOT_UPDATE, Some(id))
            }
            Self::CouldNotDelete { id } | Self::DeleteFailed { id } => {
                Outcome::error(MSG_COULD_NOT_DELETE, Some(id))
            }
            Self::CreateFailed => Outcome::error(MSG_COULD_NOT_CREATE, None),
            Self::ReadFailed => Outcome::error(MSG_SERVER_ERROR, None),
            Self::InvalidBody => Outcome::error(MSG_INVALID_BODY, None),
        };
        Some(outcome)
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let status = self.status();
        if let Some(outcome) = self.outcome() {
            return (status, Json(outcome)).into_response();
        }
        match self {
            Self::Created(issue) => (status, Json(issue)).into_response(),
            Self::Issues(issues) => (status, Json(issues)).into_response(),
            _ => status.into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::{Value, json};

    async fn render(response: ApiResponse) -> (StatusCode, Value) {
        let response = response.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_validation_outcomes_are_ok_status() {
        assert_eq!(
            render(ApiResponse::MissingRequired).await,
            (StatusCode::OK, json!({"error": "required field(s) missing"}))
        );
        assert_eq!(
            render(ApiResponse::MissingId).await,
            (StatusCode::OK, json!({"error": "missing _id"}))
        );
        assert_eq!(
            render(ApiResponse::NoUpdateFields { id: "abc".into() }).await,
            (
                StatusCode::OK,
                json!({"error": "no update field(s) sent", "_id": "abc"})
            )
        );
        assert_eq!(
            render(ApiResponse::CouldNotDelete { id: "abc".into() }).await,
            (StatusCode::OK, json!({"error": "could not delete", "_id": "abc"}))
        );
    }

    #[tokio::test]
    async fn test_success_outcomes() {
        assert_eq!(
            render(ApiResponse::Updated { id: "abc".into() }).await,
            (
                StatusCode::OK,
                json!({"result": "successfully updated", "_id": "abc"})
            )
        );
        assert_eq!(
            render(ApiResponse::Issues(Vec::new())).await,
            (StatusCode::OK, json!([]))
        );
    }

    #[tokio::test]
    async fn test_faults_keep_wording_with_500() {
        assert_eq!(
            render(ApiResponse::ReadFailed).await,
            (StatusCode::INTERNAL_SERVER_ERROR, json!({"error": "server error"}))
        );
        assert_eq!(
            render(ApiResponse::UpdateFailed { id: "abc".into() }).await,
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": "could not update", "_id": "abc"})
            )
        );
        assert_eq!(
            render(ApiResponse::InvalidBody).await,
            (StatusCode::BAD_REQUEST, json!({"error": "invalid request body"}))
        );
    }
}
