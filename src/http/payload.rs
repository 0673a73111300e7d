//! Request body extraction.
//!
//! Bodies arrive as JSON objects or urlencoded forms and are normalized to
//! a [`FieldMap`] before any handler logic runs.

use axum::Form;
use axum::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::http::header::CONTENT_TYPE;
use issuetrack_lib::FieldMap;
use serde_json::Value;
use tracing::debug;

use super::response::ApiResponse;

/// Decoded request body fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestFields(pub FieldMap);

fn is_form(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| {
            value
                .to_ascii_lowercase()
                .starts_with("application/x-www-form-urlencoded")
        })
}

/// Decode a non-form body. Empty bodies are an empty object; anything else
/// must be a JSON object.
#[must_use]
pub fn decode_json_fields(bytes: &[u8]) -> Option<FieldMap> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Some(FieldMap::new());
    }
    match serde_json::from_slice::<Value>(bytes).ok()? {
        Value::Object(fields) => Some(fields),
        _ => None,
    }
}

/// Form pairs as string fields; a repeated key keeps its last value.
#[must_use]
pub fn form_fields(pairs: Vec<(String, String)>) -> FieldMap {
    pairs
        .into_iter()
        .map(|(key, value)| (key, Value::String(value)))
        .collect()
}

#[async_trait]
impl<S> FromRequest<S> for RequestFields
where
    S: Send + Sync,
{
    type Rejection = ApiResponse;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_form(&req) {
            let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
                .await
                .map_err(|rejection| {
                    debug!(%rejection, "rejected form body");
                    ApiResponse::InvalidBody
                })?;
            return Ok(Self(form_fields(pairs)));
        }

        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            debug!(%rejection, "unreadable request body");
            ApiResponse::InvalidBody
        })?;
        decode_json_fields(&bytes).map(Self).ok_or_else(|| {
            debug!(len = bytes.len(), "request body is not a JSON object");
            ApiResponse::InvalidBody
        })
    }
}
