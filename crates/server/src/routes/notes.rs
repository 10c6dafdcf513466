//! Note CRUD and search handlers
//!
//! Request bodies are taken as raw bytes and parsed here so that a missing
//! body, malformed JSON or a non-object payload all produce the standard
//! error envelope rather than the framework's plain-text rejection. Extractor
//! rejections (oversized body, undecodable path or query) are mapped the
//! same way.

use crate::error::{ServerError, ServerResult};
use crate::response;
use crate::state::ServerState;
use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use notes::{validate_content, validate_title, Field, Note, ValidationError, ValidationReason};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Key under which list and search results are returned
const LIST_ITEM_NAME: &str = "items";

/// Query parameters for note search
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: Option<String>,
}

/// List all notes, newest first
pub async fn list_notes(State(state): State<Arc<ServerState>>) -> ServerResult<Response> {
    let notes = state.store.list_all().await?;
    Ok(response::success(
        StatusCode::OK,
        response::list(LIST_ITEM_NAME, &notes, None)?,
    ))
}

/// Search notes by case-insensitive substring of title or content
pub async fn search_notes(
    State(state): State<Arc<ServerState>>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> ServerResult<Response> {
    let Query(query) = query.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected query string");
        ServerError::BadRequest("Invalid query string".to_string())
    })?;
    let term = query
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ServerError::BadRequest("Query parameter \"q\" is required".to_string()))?;

    let notes = state.store.search(term).await?;
    tracing::debug!(query = %term, hits = notes.len(), "Searched notes");

    Ok(response::success(
        StatusCode::OK,
        response::list(LIST_ITEM_NAME, &notes, None)?,
    ))
}

/// Fetch a single note
pub async fn get_note(
    State(state): State<Arc<ServerState>>,
    id: Result<Path<String>, PathRejection>,
) -> ServerResult<Response> {
    let id = path_id(id)?;
    let id = require_id(&id)?;
    let note = state
        .store
        .get(id)
        .await?
        .ok_or_else(|| ServerError::NoteNotFound(id.to_string()))?;

    Ok(response::success(StatusCode::OK, note))
}

/// Create a note from `{"title", "content"}`
pub async fn create_note(
    State(state): State<Arc<ServerState>>,
    body: Result<Bytes, BytesRejection>,
) -> ServerResult<Response> {
    let body = parse_object(&body_bytes(body)?)?;

    let title = required_field(&body, Field::Title)?;
    let content = required_field(&body, Field::Content)?;
    let title = validate_field(Field::Title, title)?;
    let content = validate_field(Field::Content, content)?;

    let note = Note::create(title, content);
    state.store.insert(note.clone()).await?;
    tracing::info!(note_id = %note.id, "Note created");

    Ok(response::success(StatusCode::CREATED, note))
}

/// Partially update a note; absent keys keep their stored values
pub async fn update_note(
    State(state): State<Arc<ServerState>>,
    id: Result<Path<String>, PathRejection>,
    body: Result<Bytes, BytesRejection>,
) -> ServerResult<Response> {
    let id = path_id(id)?;
    let id = require_id(&id)?;
    let body = parse_object(&body_bytes(body)?)?;

    let existing = state
        .store
        .get(id)
        .await?
        .ok_or_else(|| ServerError::NoteNotFound(id.to_string()))?;

    let title = body
        .get(Field::Title.as_str())
        .map(|value| validate_field(Field::Title, value))
        .transpose()?;
    let content = body
        .get(Field::Content.as_str())
        .map(|value| validate_field(Field::Content, value))
        .transpose()?;

    let updated = existing.copy_with(title, content);
    let stored = state
        .store
        .update(id, updated)
        .await?
        .ok_or_else(|| ServerError::NoteNotFound(id.to_string()))?;
    tracing::info!(note_id = %stored.id, "Note updated");

    Ok(response::success(StatusCode::OK, stored))
}

/// Delete a note
pub async fn delete_note(
    State(state): State<Arc<ServerState>>,
    id: Result<Path<String>, PathRejection>,
) -> ServerResult<Response> {
    let id = path_id(id)?;
    let id = require_id(&id)?;
    if !state.store.delete(id).await? {
        return Err(ServerError::NoteNotFound(id.to_string()));
    }
    tracing::info!(note_id = %id, "Note deleted");

    Ok(response::no_content())
}

/// `/api/notes/` with nothing after the slash
pub async fn missing_id() -> ServerError {
    ServerError::BadRequest("Note ID is required".to_string())
}

fn path_id(id: Result<Path<String>, PathRejection>) -> ServerResult<String> {
    match id {
        Ok(Path(id)) => Ok(id),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Rejected note id");
            Err(ServerError::BadRequest("Invalid note ID".to_string()))
        }
    }
}

/// Ids are opaque: blank ones are rejected, others are looked up verbatim.
fn require_id(id: &str) -> ServerResult<&str> {
    if id.trim().is_empty() {
        return Err(ServerError::BadRequest("Note ID is required".to_string()));
    }
    Ok(id)
}

fn body_bytes(body: Result<Bytes, BytesRejection>) -> ServerResult<Bytes> {
    body.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected request body");
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ServerError::BadRequest("Request body is too large".to_string())
        } else {
            ServerError::BadRequest("Request body could not be read".to_string())
        }
    })
}

fn parse_object(body: &[u8]) -> ServerResult<Map<String, Value>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ServerError::BadRequest(
            "Request body is required".to_string(),
        ));
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ServerError::BadRequest(
            "Request body must be a JSON object".to_string(),
        )),
        Err(err) => {
            tracing::debug!(error = %err, "Rejected malformed JSON body");
            Err(ServerError::BadRequest(
                "Invalid JSON in request body".to_string(),
            ))
        }
    }
}

/// A key that must be present and non-null
fn required_field(body: &Map<String, Value>, field: Field) -> ServerResult<&Value> {
    match body.get(field.as_str()) {
        None | Some(Value::Null) => Err(ServerError::MissingField(field)),
        Some(value) => Ok(value),
    }
}

fn validate_field(field: Field, value: &Value) -> ServerResult<String> {
    let candidate = match value {
        Value::String(s) => Some(s.as_str()),
        Value::Null => None,
        _ => {
            return Err(ServerError::validation(
                ValidationError::new(field, ValidationReason::InvalidType),
                value.clone(),
            ))
        }
    };

    let validated = match field {
        Field::Title => validate_title(candidate),
        Field::Content => validate_content(candidate),
    };
    validated.map_err(|err| ServerError::validation(err, value.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn blank_body_is_missing() {
        let err = parse_object(b"  \n").unwrap_err();
        assert_eq!(err.to_string(), "Request body is required");
    }

    #[test]
    fn malformed_body_is_invalid_json() {
        let err = parse_object(b"{\"title\": ").unwrap_err();
        assert_eq!(err.to_string(), "Invalid JSON in request body");
    }

    #[test]
    fn array_body_is_rejected() {
        let err = parse_object(b"[1, 2]").unwrap_err();
        assert_eq!(err.to_string(), "Request body must be a JSON object");
    }

    #[test]
    fn null_counts_as_missing_on_create() {
        let body = json!({"title": null}).as_object().cloned().unwrap();
        let err = required_field(&body, Field::Title).unwrap_err();
        assert!(matches!(err, ServerError::MissingField(Field::Title)));
    }

    #[test]
    fn non_string_is_invalid_type() {
        let err = validate_field(Field::Title, &json!(42)).unwrap_err();
        match err {
            ServerError::Validation { source, value } => {
                assert_eq!(source.reason, ValidationReason::InvalidType);
                assert_eq!(value, json!(42));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn require_id_keeps_the_raw_segment() {
        assert_eq!(require_id(" abc ").unwrap(), " abc ");
        assert!(require_id("   ").is_err());
    }
}
