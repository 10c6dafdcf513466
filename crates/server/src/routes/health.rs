use crate::error::ServerResult;
use crate::state::ServerState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use std::sync::Arc;

const SERVICE_NAME: &str = "notes-api";

/// Health check endpoint (liveness)
/// Returns 200 if server is running
pub async fn health_check(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "timestamp": notes::timestamp::format(&chrono::Utc::now()),
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.config.environment,
        "uptime_seconds": state.uptime_seconds(),
    }))
}

/// Readiness check endpoint
/// Returns 200 once the store answers; a storage failure is a 500
pub async fn readiness_check(
    State(state): State<Arc<ServerState>>,
) -> ServerResult<impl IntoResponse> {
    let notes = state.store.count().await?;

    Ok(Json(json!({
        "status": "ready",
        "service": SERVICE_NAME,
        "timestamp": notes::timestamp::format(&chrono::Utc::now()),
        "notes": notes,
        "components": {
            "api": "ready",
            "storage": "ready",
        }
    })))
}
