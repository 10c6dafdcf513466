//! Server initialization and routing
//!
//! This module handles the Axum server setup including:
//! - Router configuration with all API endpoints
//! - Middleware stack (panic trap, CORS, logging, timeouts, compression)
//! - Graceful shutdown handling

use crate::config::{LogFormat, ServerConfig};
use crate::middleware::{handle_panic, log_requests, request_id};
use crate::routes::{api_info, method_not_allowed, not_found};
use crate::routes::{health, notes};
use crate::state::ServerState;
use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderName, HeaderValue, Method, StatusCode};
use axum::middleware::from_fn;
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Build the CORS layer from configuration
///
/// Development allows any origin, as does a `*` entry in the allow-list;
/// otherwise only the listed origins are allowed. Preflight `OPTIONS` requests are answered by the layer itself.
fn cors_layer(config: &ServerConfig) -> CorsLayer {
    if !config.enable_cors {
        return CorsLayer::new();
    }

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, REQUEST_ID_HEADER])
        .expose_headers([REQUEST_ID_HEADER])
        .max_age(Duration::from_secs(86_400));

    let wildcard = config
        .cors_allowed_origins
        .iter()
        .any(|origin| origin.trim() == "*");

    if config.is_development() || wildcard {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_allowed_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        cors.allow_origin(AllowOrigin::list(origins))
    }
}

/// Build the Axum router with all routes and middleware
///
/// Middleware stack, outermost first:
/// 1. Tracing spans
/// 2. Request ID tracking
/// 3. Request logging
/// 4. CORS
/// 5. Compression
/// 6. Timeout handling
/// 7. Panic trap (500 envelope)
/// 8. Body size limit
pub fn build_router(state: Arc<ServerState>) -> Router {
    let cors = cors_layer(&state.config);

    let note_routes = Router::new()
        .route(
            "/api/notes",
            get(notes::list_notes)
                .post(notes::create_note)
                .fallback(method_not_allowed("GET, POST")),
        )
        .route(
            "/api/notes/search",
            get(notes::search_notes).fallback(method_not_allowed("GET")),
        )
        .route(
            "/api/notes/",
            get(notes::missing_id)
                .put(notes::missing_id)
                .delete(notes::missing_id)
                .fallback(method_not_allowed("GET, PUT, DELETE")),
        )
        .route(
            "/api/notes/{id}",
            get(notes::get_note)
                .put(notes::update_note)
                .delete(notes::delete_note)
                .fallback(method_not_allowed("GET, PUT, DELETE")),
        );

    let public_routes = Router::new()
        .route("/", get(api_info).fallback(method_not_allowed("GET")))
        .route(
            "/health",
            get(health::health_check).fallback(method_not_allowed("GET")),
        )
        .route(
            "/ready",
            get(health::readiness_check).fallback(method_not_allowed("GET")),
        );

    Router::new()
        .merge(public_routes)
        .merge(note_routes)
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(state.config.max_body_size()))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            state.config.timeout(),
        ))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(from_fn(log_requests))
        .layer(from_fn(request_id))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Install the global tracing subscriber
fn init_tracing(config: &ServerConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|err| {
        eprintln!("invalid log_level {:?} ({err}); using \"info\"", config.log_level);
        EnvFilter::new("info")
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let result = match config.log_format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    };
    result.map_err(|err| anyhow::anyhow!("failed to install tracing subscriber: {err}"))
}

/// Start the notes HTTP server
///
/// Initializes logging, builds the storage backend named in `config`,
/// optionally seeds the welcome note, and serves until SIGTERM or Ctrl+C.
///
/// # Example
///
/// ```rust,no_run
/// use server::ServerConfig;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let config = ServerConfig::load()?;
///     server::start_server(config).await?;
///     Ok(())
/// }
/// ```
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    init_tracing(&config)?;

    let state = Arc::new(ServerState::new(config.clone())?);
    if config.seed_welcome_note {
        state.seed_welcome_note().await?;
    }

    let app = build_router(state);
    let addr: SocketAddr = config.socket_addr()?;

    tracing::info!(
        "Starting notes server on {} ({} environment)",
        addr,
        config.environment
    );
    tracing::info!(
        "Timeout: {}s, Max body: {}MB, Storage: {:?}",
        config.timeout_secs,
        config.max_body_size_mb,
        config.storage
    );
    tracing::info!(
        "CORS: {}, allowed origins: {:?}",
        config.enable_cors,
        config.cors_allowed_origins
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Shutdown signal handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
