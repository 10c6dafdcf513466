use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use super::{newest_first, NoteStore, StoreError, StoredNote};
use crate::note::Note;

/// An in-memory store using a `RwLock` around a `HashMap`.
///
/// Locks are never held across an await point.
pub struct InMemoryNoteStore {
    notes: RwLock<HashMap<String, StoredNote>>,
    next_seq: AtomicU64,
}

impl InMemoryNoteStore {
    pub fn new() -> Self {
        Self {
            notes: RwLock::new(HashMap::new()),
            next_seq: AtomicU64::new(0),
        }
    }

    fn snapshot<F>(&self, mut keep: F) -> Result<Vec<Note>, StoreError>
    where
        F: FnMut(&Note) -> bool,
    {
        let guard = self
            .notes
            .read()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        let entries = guard
            .values()
            .filter(|entry| keep(&entry.note))
            .cloned()
            .collect();
        Ok(newest_first(entries))
    }
}

impl Default for InMemoryNoteStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NoteStore for InMemoryNoteStore {
    async fn insert(&self, note: Note) -> Result<(), StoreError> {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let mut guard = self
            .notes
            .write()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        let id = note.id.clone();
        if guard.insert(id.clone(), StoredNote { seq, note }).is_some() {
            tracing::warn!(note_id = %id, "insert replaced an existing note");
        }
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Note>, StoreError> {
        let guard = self
            .notes
            .read()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        Ok(guard.get(id).map(|entry| entry.note.clone()))
    }

    async fn update(&self, id: &str, note: Note) -> Result<Option<Note>, StoreError> {
        let mut guard = self
            .notes
            .write()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        match guard.get_mut(id) {
            Some(entry) => {
                entry.note = note;
                Ok(Some(entry.note.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let mut guard = self
            .notes
            .write()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        Ok(guard.remove(id).is_some())
    }

    async fn list_all(&self) -> Result<Vec<Note>, StoreError> {
        self.snapshot(|_| true)
    }

    async fn search(&self, query: &str) -> Result<Vec<Note>, StoreError> {
        let needle = query.to_lowercase();
        self.snapshot(|note| note.matches_lowercase(&needle))
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let guard = self
            .notes
            .read()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        Ok(guard.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_missing_is_none() {
        let store = InMemoryNoteStore::new();
        assert!(store.get("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_missing_is_none_and_stores_nothing() {
        let store = InMemoryNoteStore::new();
        let note = Note::create("t", "c");
        assert!(store.update(&note.id, note.clone()).await.unwrap().is_none());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn insert_with_existing_id_overwrites() {
        let store = InMemoryNoteStore::new();
        let note = Note::create("first", "c");
        store.insert(note.clone()).await.unwrap();
        store
            .insert(note.copy_with(Some("second".into()), None))
            .await
            .unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
        assert_eq!(store.get(&note.id).await.unwrap().unwrap().title, "second");
    }

    #[tokio::test]
    async fn update_keeps_list_position() {
        let store = InMemoryNoteStore::new();
        let a = Note::create("a", "a");
        let b = Note::create("b", "b");
        store.insert(a.clone()).await.unwrap();
        store.insert(b.clone()).await.unwrap();

        store
            .update(&a.id, a.copy_with(Some("a2".into()), None))
            .await
            .unwrap();

        let titles: Vec<_> = store
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.title)
            .collect();
        assert_eq!(titles, vec!["b", "a2"]);
    }
}
