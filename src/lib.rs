//! Core crate for the notes REST API.
//!
//! This crate owns everything below the HTTP layer: the [`Note`] entity and
//! its validation rules, and the [`NoteStore`] storage contract together with
//! its backends. The `server` crate in `crates/server` builds the HTTP surface
//! on top of it.
//!
//! ```rust
//! use notes::{validate_content, validate_title, InMemoryNoteStore, Note, NoteStore};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = InMemoryNoteStore::new();
//! let title = validate_title(Some("  Groceries "))?;
//! let content = validate_content(Some("milk, eggs"))?;
//! let note = Note::create(title, content);
//! store.insert(note.clone()).await?;
//!
//! let fetched = store.get(&note.id).await?.expect("note was inserted");
//! assert_eq!(fetched.title, "Groceries");
//! # Ok(())
//! # }
//! ```

pub mod note;
pub mod store;
pub mod timestamp;

pub use note::{
    validate_content, validate_title, Field, Note, ValidationError, ValidationReason,
    CONTENT_MAX_CHARS, TITLE_MAX_CHARS,
};
pub use store::{InMemoryNoteStore, NoteStore, StoreConfig, StoreError};

#[cfg(feature = "redb")]
pub use store::RedbNoteStore;
