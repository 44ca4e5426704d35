//! Note domain model.
//!
//! # Responsibility
//! - Define the note record and its wire shape.
//! - Enforce content validity on construction and edits.
//!
//! # Invariants
//! - `id` is stable and never reused for another note.
//! - `content` is stored trimmed and is never empty.
//! - `updated_at` tracks content mutations only; reordering a collection
//!   does not touch it.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Stable identifier for every note in a collection.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type NoteId = Uuid;

/// Validation error for note construction and content edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteValidationError {
    /// Content is empty or whitespace-only after trimming.
    EmptyContent,
    /// The nil UUID cannot identify a note.
    NilId,
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyContent => write!(f, "note content is empty after trimming"),
            Self::NilId => write!(f, "nil uuid is not a valid note id"),
        }
    }
}

impl Error for NoteValidationError {}

/// A single user-authored text record.
///
/// The wire shape (`id`, `content`, `updated_at`, `position`) is the unit of
/// the persisted collection blob and must round-trip exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Stable global ID used for edit/delete/reorder addressing.
    pub id: NoteId,
    /// Plain text body, trimmed, never empty.
    pub content: String,
    /// Unix epoch milliseconds of the last content mutation.
    pub updated_at: i64,
    /// Rank among siblings; dense `0..n-1` within a collection.
    pub position: u32,
}

impl Note {
    /// Creates a note with a generated stable ID at the given rank.
    ///
    /// Content is trimmed before storage; empty or whitespace-only input is
    /// rejected.
    pub fn new(content: &str, position: u32) -> Result<Self, NoteValidationError> {
        Self::with_id(Uuid::new_v4(), content, position)
    }

    /// Creates a note with a caller-provided stable ID.
    ///
    /// Used by tests and import paths where identity already exists.
    pub fn with_id(
        id: NoteId,
        content: &str,
        position: u32,
    ) -> Result<Self, NoteValidationError> {
        if id.is_nil() {
            return Err(NoteValidationError::NilId);
        }
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(NoteValidationError::EmptyContent);
        }
        Ok(Self {
            id,
            content: trimmed.to_string(),
            updated_at: now_epoch_ms(),
            position,
        })
    }

    /// Replaces the note body with trimmed `content`.
    ///
    /// Returns `Ok(true)` when the content changed (and `updated_at` was
    /// refreshed), `Ok(false)` when the trimmed input equals the current
    /// body. Empty input is rejected and leaves the note untouched.
    pub fn edit(&mut self, content: &str) -> Result<bool, NoteValidationError> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(NoteValidationError::EmptyContent);
        }
        if trimmed == self.content {
            return Ok(false);
        }
        self.content = trimmed.to_string();
        self.updated_at = now_epoch_ms();
        Ok(true)
    }

    /// Re-checks invariants, e.g. for records decoded from storage.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        if self.id.is_nil() {
            return Err(NoteValidationError::NilId);
        }
        if self.content.trim().is_empty() {
            return Err(NoteValidationError::EmptyContent);
        }
        Ok(())
    }
}

/// Current wall-clock time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis() as i64)
}

#[cfg(test)]
mod tests {
    use super::{Note, NoteValidationError};

    #[test]
    fn edit_trims_and_reports_change() {
        let mut note = Note::new("draft", 0).expect("valid note");
        let changed = note.edit("  final text  ").expect("valid edit");
        assert!(changed);
        assert_eq!(note.content, "final text");
    }

    #[test]
    fn edit_with_identical_content_reports_no_change() {
        let mut note = Note::new("same", 0).expect("valid note");
        let before = note.updated_at;
        let changed = note.edit(" same ").expect("valid edit");
        assert!(!changed);
        assert_eq!(note.updated_at, before);
    }

    #[test]
    fn edit_rejects_whitespace_only_content() {
        let mut note = Note::new("hello", 0).expect("valid note");
        let err = note.edit("   ").unwrap_err();
        assert_eq!(err, NoteValidationError::EmptyContent);
        assert_eq!(note.content, "hello");
    }
}
