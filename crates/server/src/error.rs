use crate::response::{self, ErrorCode};
use axum::http::{header, HeaderValue, Method};
use axum::response::{IntoResponse, Response};
use notes::{Field, StoreError, ValidationError};
use serde_json::{json, Value};

pub type ServerResult<T> = Result<T, ServerError>;

/// Message returned for every 500; the real cause only goes to the log.
pub const INTERNAL_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Field \"{0}\" is required")]
    MissingField(Field),

    #[error("{source}")]
    Validation {
        source: ValidationError,
        value: Value,
    },

    #[error("Note not found")]
    NoteNotFound(String),

    #[error("Route {method} {path} not found")]
    RouteNotFound { method: Method, path: String },

    #[error("Method {method} not allowed")]
    MethodNotAllowed {
        method: Method,
        allow: &'static str,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Failed to encode response: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl ServerError {
    pub fn validation(source: ValidationError, value: Value) -> Self {
        ServerError::Validation { source, value }
    }

    /// Get error code for this error
    pub fn error_code(&self) -> ErrorCode {
        match self {
            ServerError::BadRequest(_) => ErrorCode::BadRequest,
            ServerError::MissingField(_) | ServerError::Validation { .. } => {
                ErrorCode::ValidationError
            }
            ServerError::NoteNotFound(_) | ServerError::RouteNotFound { .. } => {
                ErrorCode::NotFound
            }
            ServerError::MethodNotAllowed { .. } => ErrorCode::MethodNotAllowed,
            ServerError::Storage(_) | ServerError::Encoding(_) => ErrorCode::InternalServerError,
        }
    }

    fn details(&self) -> Option<Value> {
        match self {
            ServerError::MissingField(field) => Some(json!({
                "field": field.as_str(),
                "value": Value::Null,
            })),
            ServerError::Validation { source, value } => Some(json!({
                "field": source.field.as_str(),
                "value": value,
                "reason": source.reason.code(),
            })),
            ServerError::NoteNotFound(id) => Some(json!({ "id": id })),
            ServerError::MethodNotAllowed { allow, .. } => Some(json!({ "allowed": allow })),
            _ => None,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let code = self.error_code();

        if code == ErrorCode::InternalServerError {
            tracing::error!(error = %self, "request failed");
            return response::error(code, INTERNAL_ERROR_MESSAGE, None);
        }

        let mut response = response::error(code, self.to_string(), self.details());
        if let ServerError::MethodNotAllowed { allow, .. } = &self {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static(*allow));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use notes::ValidationReason;

    #[test]
    fn validation_maps_to_400() {
        let err = ServerError::validation(
            ValidationError::new(Field::Title, ValidationReason::Required),
            json!("   "),
        );
        assert_eq!(err.error_code(), ErrorCode::ValidationError);
        assert_eq!(err.to_string(), "Title is required");
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_field_message_quotes_field() {
        let err = ServerError::MissingField(Field::Content);
        assert_eq!(err.to_string(), "Field \"content\" is required");
    }

    #[test]
    fn storage_errors_are_internal() {
        let err = ServerError::from(StoreError::backend("disk on fire"));
        assert_eq!(err.error_code(), ErrorCode::InternalServerError);
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn encoding_errors_are_internal() {
        let source = serde_json::from_str::<Value>("{").unwrap_err();
        let err = ServerError::from(source);
        assert_eq!(err.error_code(), ErrorCode::InternalServerError);
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn method_not_allowed_sets_allow_header() {
        let err = ServerError::MethodNotAllowed {
            method: Method::PATCH,
            allow: "GET, POST",
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers().get(header::ALLOW).unwrap(), "GET, POST");
    }
}
