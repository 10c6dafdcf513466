//! Redb (Rust embedded database) backend for note storage.
//!
//! Each note is stored as JSON under its id, alongside the insertion
//! sequence used for ordering ties. Transactions are blocking, so every
//! operation runs on the tokio blocking pool.
//!
//! # Configuration Example
//! ```toml
//! [storage]
//! backend = "redb"
//! path = "/data/notes.redb"
//! ```

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use redb::{Database, ReadableTable, TableDefinition};

use super::{newest_first, NoteStore, StoreError, StoredNote};
use crate::note::Note;

const NOTES_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("notes");
const META_TABLE: TableDefinition<&str, u64> = TableDefinition::new("notes_meta");
const NEXT_SEQ_KEY: &str = "next_seq";

/// Durable note store backed by a redb database file.
///
/// Redb handles its own locking and MVCC; the `Arc<Database>` is shared
/// with the blocking tasks.
pub struct RedbNoteStore {
    db: Arc<Database>,
}

impl RedbNoteStore {
    /// Open or create a database at `path`.
    ///
    /// ```no_run
    /// use notes::RedbNoteStore;
    ///
    /// let store = RedbNoteStore::open("/tmp/notes.redb").unwrap();
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = Database::create(path).map_err(StoreError::backend)?;

        let write_txn = db.begin_write().map_err(StoreError::backend)?;
        {
            // Opening the tables creates them on first use.
            write_txn
                .open_table(NOTES_TABLE)
                .map_err(StoreError::backend)?;
            write_txn
                .open_table(META_TABLE)
                .map_err(StoreError::backend)?;
        }
        write_txn.commit().map_err(StoreError::backend)?;

        Ok(Self { db: Arc::new(db) })
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Database) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || op(db.as_ref()))
            .await
            .map_err(StoreError::backend)?
    }

    async fn scan<F>(&self, keep: F) -> Result<Vec<Note>, StoreError>
    where
        F: Fn(&Note) -> bool + Send + 'static,
    {
        self.blocking(move |db| {
            let read_txn = db.begin_read().map_err(StoreError::backend)?;
            let table = read_txn
                .open_table(NOTES_TABLE)
                .map_err(StoreError::backend)?;

            let mut entries = Vec::new();
            for item in table.iter().map_err(StoreError::backend)? {
                let (_, value) = item.map_err(StoreError::backend)?;
                let entry = decode(value.value())?;
                if keep(&entry.note) {
                    entries.push(entry);
                }
            }
            Ok(newest_first(entries))
        })
        .await
    }
}

fn decode(bytes: &[u8]) -> Result<StoredNote, StoreError> {
    serde_json::from_slice(bytes).map_err(StoreError::backend)
}

fn encode(entry: &StoredNote) -> Result<Vec<u8>, StoreError> {
    serde_json::to_vec(entry).map_err(StoreError::backend)
}

#[async_trait]
impl NoteStore for RedbNoteStore {
    async fn insert(&self, note: Note) -> Result<(), StoreError> {
        self.blocking(move |db| {
            let write_txn = db.begin_write().map_err(StoreError::backend)?;
            {
                let mut meta = write_txn
                    .open_table(META_TABLE)
                    .map_err(StoreError::backend)?;
                let seq = meta
                    .get(NEXT_SEQ_KEY)
                    .map_err(StoreError::backend)?
                    .map(|guard| guard.value())
                    .unwrap_or(0);
                meta.insert(NEXT_SEQ_KEY, seq + 1)
                    .map_err(StoreError::backend)?;

                let mut table = write_txn
                    .open_table(NOTES_TABLE)
                    .map_err(StoreError::backend)?;
                let bytes = encode(&StoredNote {
                    seq,
                    note: note.clone(),
                })?;
                let replaced = table
                    .insert(note.id.as_str(), bytes.as_slice())
                    .map_err(StoreError::backend)?
                    .is_some();
                if replaced {
                    tracing::warn!(note_id = %note.id, "insert replaced an existing note");
                }
            }
            write_txn.commit().map_err(StoreError::backend)?;
            Ok(())
        })
        .await
    }

    async fn get(&self, id: &str) -> Result<Option<Note>, StoreError> {
        let id = id.to_string();
        self.blocking(move |db| {
            let read_txn = db.begin_read().map_err(StoreError::backend)?;
            let table = read_txn
                .open_table(NOTES_TABLE)
                .map_err(StoreError::backend)?;
            let note = match table.get(id.as_str()).map_err(StoreError::backend)? {
                Some(value) => Some(decode(value.value())?.note),
                None => None,
            };
            Ok(note)
        })
        .await
    }

    async fn update(&self, id: &str, note: Note) -> Result<Option<Note>, StoreError> {
        let id = id.to_string();
        self.blocking(move |db| {
            let write_txn = db.begin_write().map_err(StoreError::backend)?;
            let updated = {
                let mut table = write_txn
                    .open_table(NOTES_TABLE)
                    .map_err(StoreError::backend)?;
                let existing = match table.get(id.as_str()).map_err(StoreError::backend)? {
                    Some(value) => Some(decode(value.value())?),
                    None => None,
                };
                match existing {
                    Some(existing) => {
                        let entry = StoredNote {
                            seq: existing.seq,
                            note,
                        };
                        table
                            .insert(id.as_str(), encode(&entry)?.as_slice())
                            .map_err(StoreError::backend)?;
                        Some(entry.note)
                    }
                    None => None,
                }
            };
            write_txn.commit().map_err(StoreError::backend)?;
            Ok(updated)
        })
        .await
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let id = id.to_string();
        self.blocking(move |db| {
            let write_txn = db.begin_write().map_err(StoreError::backend)?;
            let removed = {
                let mut table = write_txn
                    .open_table(NOTES_TABLE)
                    .map_err(StoreError::backend)?;
                let removed = table
                    .remove(id.as_str())
                    .map_err(StoreError::backend)?
                    .is_some();
                removed
            };
            write_txn.commit().map_err(StoreError::backend)?;
            Ok(removed)
        })
        .await
    }

    async fn list_all(&self) -> Result<Vec<Note>, StoreError> {
        self.scan(|_| true).await
    }

    async fn search(&self, query: &str) -> Result<Vec<Note>, StoreError> {
        let needle = query.to_lowercase();
        self.scan(move |note| note.matches_lowercase(&needle)).await
    }

    async fn count(&self) -> Result<usize, StoreError> {
        self.blocking(|db| {
            let read_txn = db.begin_read().map_err(StoreError::backend)?;
            let table = read_txn
                .open_table(NOTES_TABLE)
                .map_err(StoreError::backend)?;
            let mut count = 0;
            for item in table.iter().map_err(StoreError::backend)? {
                item.map_err(StoreError::backend)?;
                count += 1;
            }
            Ok(count)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_temp() -> (RedbNoteStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = RedbNoteStore::open(dir.path().join("notes.redb")).unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn roundtrip_insert_get() {
        let (store, _dir) = open_temp();
        let note = Note::create("title", "content");
        store.insert(note.clone()).await.unwrap();

        let fetched = store.get(&note.id).await.unwrap().unwrap();
        assert_eq!(fetched.title, "title");
        assert_eq!(fetched.created_at, note.created_at);
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_reports_removal() {
        let (store, _dir) = open_temp();
        let note = Note::create("title", "content");
        store.insert(note.clone()).await.unwrap();

        assert!(store.delete(&note.id).await.unwrap());
        assert!(!store.delete(&note.id).await.unwrap());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.redb");
        let note = Note::create("durable", "content");
        {
            let store = RedbNoteStore::open(&path).unwrap();
            store.insert(note.clone()).await.unwrap();
        }

        let store = RedbNoteStore::open(&path).unwrap();
        let fetched = store.get(&note.id).await.unwrap().unwrap();
        assert_eq!(fetched.title, "durable");
    }
}
