//! Storage contract for notes.
//!
//! Handlers talk to storage only through [`NoteStore`]. Two implementations
//! ship with the crate:
//!
//! - [`InMemoryNoteStore`]: a `RwLock`ed map, the default and the one tests use.
//! - [`RedbNoteStore`] (feature `redb`): durable storage in a redb database file.
//!
//! Listing and search results are ordered newest `created_at` first. Notes
//! created within the same millisecond are ordered by insertion, most recent
//! first.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::note::Note;

pub mod memory;
#[cfg(feature = "redb")]
pub mod redb;

pub use memory::InMemoryNoteStore;
#[cfg(feature = "redb")]
pub use redb::RedbNoteStore;

/// The single failure kind a storage backend reports.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn backend<E: std::fmt::Display>(err: E) -> Self {
        Self::Backend(err.to_string())
    }
}

/// Keyed storage for notes.
///
/// Absence is never an error: `get` and `update` return `None` and `delete`
/// returns `false` when the id is unknown.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Store `note` under its id. An existing note with the same id is replaced.
    async fn insert(&self, note: Note) -> Result<(), StoreError>;
    /// Fetch a note by id.
    async fn get(&self, id: &str) -> Result<Option<Note>, StoreError>;
    /// Replace the note stored under `id`, returning the stored value.
    async fn update(&self, id: &str, note: Note) -> Result<Option<Note>, StoreError>;
    /// Remove a note, reporting whether anything was removed.
    async fn delete(&self, id: &str) -> Result<bool, StoreError>;
    /// All notes, newest first.
    async fn list_all(&self) -> Result<Vec<Note>, StoreError>;
    /// Notes whose title or content contains `query`, ignoring case, newest first.
    async fn search(&self, query: &str) -> Result<Vec<Note>, StoreError>;
    /// Number of stored notes.
    async fn count(&self) -> Result<usize, StoreError>;
}

/// Selects and builds a storage backend.
///
/// ```
/// use notes::StoreConfig;
///
/// let config = StoreConfig::in_memory();
/// let store = config.build().unwrap();
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StoreConfig {
    /// Process-local map. Contents are lost on restart.
    #[default]
    InMemory,
    /// redb database file at `path`. Requires the `redb` feature.
    Redb { path: String },
}

impl StoreConfig {
    pub fn in_memory() -> Self {
        StoreConfig::InMemory
    }

    pub fn redb<P: Into<String>>(path: P) -> Self {
        StoreConfig::Redb { path: path.into() }
    }

    pub fn build(&self) -> Result<Arc<dyn NoteStore>, StoreError> {
        match self {
            StoreConfig::InMemory => Ok(Arc::new(InMemoryNoteStore::new())),
            StoreConfig::Redb { path } => {
                #[cfg(feature = "redb")]
                {
                    Ok(Arc::new(RedbNoteStore::open(path)?))
                }
                #[cfg(not(feature = "redb"))]
                {
                    let _ = path;
                    Err(StoreError::backend("redb backend disabled at compile time"))
                }
            }
        }
    }
}

/// A note plus the insertion sequence used to break `created_at` ties.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StoredNote {
    pub seq: u64,
    pub note: Note,
}

/// Order stored notes newest first and strip the sequence numbers.
pub(crate) fn newest_first(mut entries: Vec<StoredNote>) -> Vec<Note> {
    entries.sort_by(|a, b| {
        b.note
            .created_at
            .cmp(&a.note.created_at)
            .then_with(|| b.seq.cmp(&a.seq))
    });
    entries.into_iter().map(|entry| entry.note).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn newest_first_orders_by_created_at_then_sequence() {
        let old = Note::create("old", "old");
        let mut tie_a = Note::create("tie a", "x");
        let mut tie_b = Note::create("tie b", "x");
        tie_a.created_at = old.created_at + Duration::seconds(5);
        tie_b.created_at = tie_a.created_at;

        let ordered = newest_first(vec![
            StoredNote { seq: 0, note: old.clone() },
            StoredNote { seq: 1, note: tie_a.clone() },
            StoredNote { seq: 2, note: tie_b.clone() },
        ]);

        let titles: Vec<_> = ordered.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["tie b", "tie a", "old"]);
    }

    #[test]
    fn config_defaults_to_in_memory() {
        assert_eq!(StoreConfig::default(), StoreConfig::InMemory);
        let parsed: StoreConfig =
            serde_json::from_str(r#"{"backend":"redb","path":"/tmp/notes.redb"}"#).unwrap();
        assert_eq!(parsed, StoreConfig::redb("/tmp/notes.redb"));
    }
}
