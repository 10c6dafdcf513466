use crate::error::INTERNAL_ERROR_MESSAGE;
use crate::response::{self, ErrorCode};
use axum::extract::Request;
use axum::http::header::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use std::any::Any;

/// Headers whose values never reach the log
const REDACTED_HEADERS: &[&str] = &[
    "authorization",
    "proxy-authorization",
    "cookie",
    "set-cookie",
    "x-api-key",
];

/// Request ID injection middleware
pub async fn request_id(mut request: Request, next: Next) -> Response {
    // Generate or extract request ID
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    // Add to request extensions for handlers to access
    request.extensions_mut().insert(RequestId(request_id.clone()));

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert("x-request-id", value);
    }

    response
}

/// Request ID stored in request extensions
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Logging middleware
pub async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = std::time::Instant::now();

    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();

    tracing::debug!(
        method = %method,
        path = %path,
        request_id = %request_id,
        headers = ?redact_headers(request.headers()),
        "Request started"
    );

    let response = next.run(request).await;
    let duration = start.elapsed();
    let status = response.status();

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            duration_ms = duration.as_millis() as u64,
            request_id = %request_id,
            "Request failed"
        );
    } else {
        tracing::info!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            duration_ms = duration.as_millis() as u64,
            request_id = %request_id,
            "Request completed"
        );
    }

    response
}

/// Header name/value pairs with credentials replaced by `[REDACTED]`
pub fn redact_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let name = name.as_str().to_string();
            let value = if REDACTED_HEADERS.contains(&name.as_str()) {
                "[REDACTED]".to_string()
            } else {
                value.to_str().unwrap_or("<binary>").to_string()
            };
            (name, value)
        })
        .collect()
}

/// Panic handler for `CatchPanicLayer`: logs and answers with the 500 envelope
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    tracing::error!(panic = %detail, "Handler panicked");
    response::error(ErrorCode::InternalServerError, INTERNAL_ERROR_MESSAGE, None)
}
