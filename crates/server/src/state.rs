use crate::config::ServerConfig;
use notes::{Note, NoteStore, StoreError};
use std::sync::Arc;
use std::time::Instant;

/// Shared application state
///
/// Built once by the process entry point (or by a test) and handed to the
/// router; there is no global store.
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Note storage (shared across requests)
    pub store: Arc<dyn NoteStore>,

    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl ServerState {
    /// Create new server state with the store selected in `config`
    pub fn new(config: ServerConfig) -> Result<Self, StoreError> {
        let store = config.storage.build()?;
        Ok(Self::with_store(config, store))
    }

    /// Create new server state around an existing store
    pub fn with_store(config: ServerConfig, store: Arc<dyn NoteStore>) -> Self {
        Self {
            config: Arc::new(config),
            store,
            started_at: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    /// Insert the welcome note if the store is empty
    pub async fn seed_welcome_note(&self) -> Result<Option<Note>, StoreError> {
        if self.store.count().await? > 0 {
            return Ok(None);
        }

        let note = Note::create(
            "Welcome to Notes",
            "This is your first note. Create, edit, search and delete notes through the /api/notes endpoints.",
        );
        self.store.insert(note.clone()).await?;
        tracing::info!(note_id = %note.id, "Seeded welcome note");
        Ok(Some(note))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seeds_only_into_empty_store() {
        let state = ServerState::new(ServerConfig::default()).unwrap();
        let seeded = state.seed_welcome_note().await.unwrap();
        assert!(seeded.is_some());
        assert!(state.seed_welcome_note().await.unwrap().is_none());
        assert_eq!(state.store.count().await.unwrap(), 1);

        let hits = state.store.search("welcome").await.unwrap();
        assert_eq!(hits.len(), 1);
    }
}
