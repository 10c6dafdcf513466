//! API route handlers
//!
//! Routes are organized by functionality:
//!
//! - `health`: liveness and readiness probes
//! - `notes`: note CRUD and search

pub mod health;
pub mod notes;

use crate::error::{ServerError, ServerResult};
use axum::http::{Method, Uri};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use std::future::{ready, Ready};

/// API version and base info
///
/// Returns server information including version and available endpoints.
///
/// # Response
///
/// ```json
/// {
///   "name": "Notes API",
///   "version": "0.1.0",
///   "endpoints": ["..."]
/// }
/// ```
pub async fn api_info() -> ServerResult<impl IntoResponse> {
    Ok(Json(json!({
        "name": "Notes API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "GET /api/notes",
            "POST /api/notes",
            "GET /api/notes/search?q=",
            "GET /api/notes/{id}",
            "PUT /api/notes/{id}",
            "DELETE /api/notes/{id}",
            "GET /health",
            "GET /ready"
        ]
    })))
}

/// 404 handler for undefined routes
pub async fn not_found(method: Method, uri: Uri) -> ServerError {
    ServerError::RouteNotFound {
        method,
        path: uri.path().to_string(),
    }
}

/// Per-route fallback answering unsupported verbs with 405 and `Allow`
pub fn method_not_allowed(
    allow: &'static str,
) -> impl Fn(Method) -> Ready<ServerError> + Clone + Send + Sync + 'static {
    move |method| ready(ServerError::MethodNotAllowed { method, allow })
}
