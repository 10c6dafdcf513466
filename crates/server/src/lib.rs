//! Notes Server - HTTP REST API for notes
//!
//! This crate exposes the `notes` core crate over HTTP: CRUD and keyword
//! search for notes with a uniform JSON envelope for every response.
//!
//! # Features
//!
//! - **Middleware**: panic trap, CORS, request ID tracking, structured logging
//!   with credential redaction, timeouts, compression
//! - **Configuration**: Environment variable and file-based configuration
//! - **Storage**: in-memory or redb-backed, chosen at startup and injected
//! - **Graceful Shutdown**: Proper signal handling for production deployments
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! - `GET /` - API information
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe
//! - `GET /api/notes` - List notes, newest first
//! - `POST /api/notes` - Create a note
//! - `GET /api/notes/search?q=` - Search notes
//! - `GET /api/notes/{id}` - Get a note
//! - `PUT /api/notes/{id}` - Partially update a note
//! - `DELETE /api/notes/{id}` - Delete a note
//!
//! Errors use `{"error": {"code", "message", "details"?}}` with codes
//! `BAD_REQUEST`, `VALIDATION_ERROR`, `NOT_FOUND`, `METHOD_NOT_ALLOWED` and
//! `INTERNAL_SERVER_ERROR`.

pub mod config;
pub mod error;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
