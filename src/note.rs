//! The note entity and its validation rules.
//!
//! Notes are only ever built through [`Note::create`] and
//! [`Note::copy_with`]; both expect their text inputs to have passed
//! [`validate_title`] / [`validate_content`] first and do not re-validate.

use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::timestamp;

/// Maximum title length, in Unicode scalar values, after trimming.
pub const TITLE_MAX_CHARS: usize = 200;

/// Maximum content length, in Unicode scalar values, after trimming.
pub const CONTENT_MAX_CHARS: usize = 10_000;

/// A stored note.
///
/// Equality and hashing consider the `id` only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Build a new note with a fresh id and `created_at == updated_at == now`.
    pub fn create(title: impl Into<String>, content: impl Into<String>) -> Self {
        let now = timestamp::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into().trim().to_string(),
            content: content.into().trim().to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Return a copy with the supplied fields replaced.
    ///
    /// `updated_at` always moves forward, even when nothing else changes.
    pub fn copy_with(&self, title: Option<String>, content: Option<String>) -> Self {
        let now = timestamp::now();
        let updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::milliseconds(1)
        };

        Self {
            id: self.id.clone(),
            title: title
                .map(|t| t.trim().to_string())
                .unwrap_or_else(|| self.title.clone()),
            content: content
                .map(|c| c.trim().to_string())
                .unwrap_or_else(|| self.content.clone()),
            created_at: self.created_at,
            updated_at,
        }
    }

    /// Case-insensitive substring match against title or content.
    ///
    /// `needle` must already be lowercased.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle) || self.content.to_lowercase().contains(needle)
    }
}

impl PartialEq for Note {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Note {}

impl Hash for Note {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// The note field a validation rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Title,
    Content,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Content => "content",
        }
    }

    pub fn max_chars(&self) -> usize {
        match self {
            Field::Title => TITLE_MAX_CHARS,
            Field::Content => CONTENT_MAX_CHARS,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Field::Title => "Title",
            Field::Content => "Content",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationReason {
    /// Absent, null, or blank after trimming.
    Required,
    /// Longer than the field's limit after trimming.
    TooLong { max: usize },
    /// Present but not a string.
    InvalidType,
}

impl ValidationReason {
    pub fn code(&self) -> &'static str {
        match self {
            ValidationReason::Required => "required",
            ValidationReason::TooLong { .. } => "too_long",
            ValidationReason::InvalidType => "invalid_type",
        }
    }
}

/// A field that failed one of the note validation rules.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", self.message())]
pub struct ValidationError {
    pub field: Field,
    pub reason: ValidationReason,
}

impl ValidationError {
    pub fn new(field: Field, reason: ValidationReason) -> Self {
        Self { field, reason }
    }

    pub fn message(&self) -> String {
        let label = self.field.label();
        match self.reason {
            ValidationReason::Required => format!("{label} is required"),
            ValidationReason::TooLong { max } => {
                format!("{label} must be {max} characters or less")
            }
            ValidationReason::InvalidType => format!("{label} must be a string"),
        }
    }
}

/// Validate a candidate title, returning it trimmed.
pub fn validate_title(candidate: Option<&str>) -> Result<String, ValidationError> {
    validate_text(Field::Title, candidate)
}

/// Validate a candidate content body, returning it trimmed.
pub fn validate_content(candidate: Option<&str>) -> Result<String, ValidationError> {
    validate_text(Field::Content, candidate)
}

fn validate_text(field: Field, candidate: Option<&str>) -> Result<String, ValidationError> {
    let trimmed = candidate.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Err(ValidationError::new(field, ValidationReason::Required));
    }

    let max = field.max_chars();
    if trimmed.chars().count() > max {
        return Err(ValidationError::new(field, ValidationReason::TooLong { max }));
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_required_when_absent_or_blank() {
        for candidate in [None, Some(""), Some("   "), Some("\t\n")] {
            let err = validate_title(candidate).unwrap_err();
            assert_eq!(err.field, Field::Title);
            assert_eq!(err.reason, ValidationReason::Required);
        }
    }

    #[test]
    fn title_length_boundary() {
        assert!(validate_title(Some(&"a".repeat(200))).is_ok());
        let err = validate_title(Some(&"a".repeat(201))).unwrap_err();
        assert_eq!(err.reason, ValidationReason::TooLong { max: 200 });
        assert_eq!(err.reason.code(), "too_long");
    }

    #[test]
    fn content_length_boundary() {
        assert!(validate_content(Some(&"a".repeat(10_000))).is_ok());
        let err = validate_content(Some(&"a".repeat(10_001))).unwrap_err();
        assert_eq!(err.field, Field::Content);
        assert_eq!(err.reason, ValidationReason::TooLong { max: 10_000 });
    }

    #[test]
    fn length_counts_chars_not_bytes() {
        // 200 two-byte characters.
        assert!(validate_title(Some(&"é".repeat(200))).is_ok());
        assert!(validate_title(Some(&"é".repeat(201))).is_err());
    }

    #[test]
    fn length_is_measured_after_trimming() {
        let padded = format!("  {}  ", "a".repeat(200));
        assert_eq!(validate_title(Some(&padded)).unwrap(), "a".repeat(200));
    }

    #[test]
    fn messages_name_the_field() {
        let err = ValidationError::new(Field::Content, ValidationReason::Required);
        assert_eq!(err.to_string(), "Content is required");
        let err = ValidationError::new(Field::Title, ValidationReason::TooLong { max: 200 });
        assert_eq!(err.to_string(), "Title must be 200 characters or less");
    }

    #[test]
    fn create_trims_and_stamps() {
        let note = Note::create("  Hello ", "\n body \n");
        assert_eq!(note.title, "Hello");
        assert_eq!(note.content, "body");
        assert_eq!(note.created_at, note.updated_at);
        assert!(!note.id.is_empty());
    }

    #[test]
    fn create_assigns_unique_ids() {
        let a = Note::create("a", "a");
        let b = Note::create("a", "a");
        assert_ne!(a.id, b.id);
        assert_ne!(a, b);
    }

    #[test]
    fn copy_with_no_overrides_only_touches_updated_at() {
        let note = Note::create("title", "content");
        let copy = note.copy_with(None, None);
        assert_eq!(copy.id, note.id);
        assert_eq!(copy.created_at, note.created_at);
        assert_eq!(copy.title, note.title);
        assert_eq!(copy.content, note.content);
        assert!(copy.updated_at > note.updated_at);
    }

    #[test]
    fn copy_with_replaces_supplied_fields() {
        let note = Note::create("title", "content");
        let copy = note.copy_with(Some(" new ".into()), None);
        assert_eq!(copy.title, "new");
        assert_eq!(copy.content, "content");
    }

    #[test]
    fn equality_is_by_id() {
        let note = Note::create("title", "content");
        let edited = note.copy_with(Some("other".into()), Some("other".into()));
        assert_eq!(note, edited);
    }

    #[test]
    fn serializes_camel_case_with_millis() {
        let note = Note::create("t", "c");
        let value = serde_json::to_value(&note).unwrap();
        let created = value["createdAt"].as_str().unwrap();
        assert!(created.ends_with('Z'));
        assert_eq!(created, value["updatedAt"].as_str().unwrap());
        assert_eq!(value["title"], "t");

        let back: Note = serde_json::from_value(value).unwrap();
        assert_eq!(back.created_at, note.created_at);
    }
}
