//! Response envelopes
//!
//! Every JSON body the API produces goes through one of these builders:
//!
//! - success: the payload object itself, with a caller-chosen status
//! - list: `{ "<item_name>": [...], "count": n }`
//! - error: `{ "error": { "code", "message", "details"? } }`
//! - no content: empty 204

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Closed vocabulary of error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    BadRequest,
    ValidationError,
    NotFound,
    MethodNotAllowed,
    InternalServerError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::BadRequest => "BAD_REQUEST",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            ErrorCode::InternalServerError => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::BadRequest | ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ErrorCode::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// API error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// JSON payload with the given status
pub fn success<T: Serialize>(status: StatusCode, payload: T) -> Response {
    (status, Json(payload)).into_response()
}

/// Build a list body; `count` defaults to the number of items
pub fn list<T: Serialize>(
    item_name: &str,
    items: &[T],
    count: Option<usize>,
) -> Result<Value, serde_json::Error> {
    let mut body = Map::new();
    body.insert(item_name.to_string(), serde_json::to_value(items)?);
    body.insert(
        "count".to_string(),
        Value::from(count.unwrap_or(items.len())),
    );
    Ok(Value::Object(body))
}

/// Error envelope; empty `details` are omitted
pub fn error(code: ErrorCode, message: impl Into<String>, details: Option<Value>) -> Response {
    let details = details.filter(|d| match d {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        _ => true,
    });

    let body = ErrorResponse {
        error: ErrorDetail {
            code: code.as_str().to_string(),
            message: message.into(),
            details,
        },
    };

    (code.status(), Json(body)).into_response()
}

/// Empty 204, still labelled as JSON for header consistency
pub fn no_content() -> Response {
    (
        StatusCode::NO_CONTENT,
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        )],
    )
        .into_response()
}
