//! Note collection state machine.
//!
//! # Responsibility
//! - Own the ordered note collection and all mutation entry points.
//! - Mirror every successful mutation to the persistence adapter as one
//!   serialized blob.
//!
//! # Invariants
//! - `notes[i].position == i` at every public API boundary.
//! - Note ids are unique within the collection.
//! - After a successful mutation the persisted blob equals the in-memory
//!   collection; after a failed write the in-memory mutation is kept and
//!   the failure is surfaced to the caller.

use crate::model::note::{Note, NoteId, NoteValidationError};
use crate::storage::{PersistenceAdapter, StorageError};
use log::{error, warn};
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Fixed versioned key holding the serialized collection blob.
pub const NOTES_BLOB_KEY: &str = "coosenotes.v1";

pub type StoreResult<T> = Result<T, StoreError>;

/// Store error for collection mutations and persistence.
#[derive(Debug)]
pub enum StoreError {
    /// Input content failed note validation; prior state retained.
    Validation(NoteValidationError),
    /// Reorder input was not a permutation of the current id set.
    InvalidReorder(ReorderError),
    /// Collection blob could not be serialized.
    Serialize(serde_json::Error),
    /// Adapter write failed after retry; in-memory state was kept.
    Storage(StorageError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidReorder(err) => write!(f, "invalid reorder request: {err}"),
            Self::Serialize(err) => write!(f, "failed to serialize collection blob: {err}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::InvalidReorder(err) => Some(err),
            Self::Serialize(err) => Some(err),
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<NoteValidationError> for StoreError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<ReorderError> for StoreError {
    fn from(value: ReorderError) -> Self {
        Self::InvalidReorder(value)
    }
}

impl From<StorageError> for StoreError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// Why a reorder request was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderError {
    /// Input does not cover the whole collection.
    LengthMismatch { expected: usize, actual: usize },
    /// The same id appears more than once in the input.
    DuplicateId(NoteId),
    /// An input id does not exist in the collection.
    UnknownId(NoteId),
}

impl Display for ReorderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LengthMismatch { expected, actual } => {
                write!(f, "expected {expected} ids, got {actual}")
            }
            Self::DuplicateId(id) => write!(f, "duplicate id {id}"),
            Self::UnknownId(id) => write!(f, "unknown id {id}"),
        }
    }
}

impl Error for ReorderError {}

/// Ordered note collection over a persistence adapter.
///
/// Every instance is independent; tests and hosts may run any number of
/// stores over separate adapters.
pub struct NoteStore<P: PersistenceAdapter> {
    adapter: P,
    notes: Vec<Note>,
}

impl<P: PersistenceAdapter> NoteStore<P> {
    /// Opens a store over `adapter` and loads the persisted collection.
    ///
    /// An absent blob yields an empty collection. A malformed blob also
    /// yields an empty collection and emits a warning event; the corrupt
    /// value is left in place until the next successful mutation
    /// overwrites it.
    pub fn open(adapter: P) -> StoreResult<Self> {
        let mut store = Self {
            adapter,
            notes: Vec::new(),
        };
        store.load()?;
        Ok(store)
    }

    /// Creates a note from `content`, appended at the tail of the order.
    ///
    /// Content is trimmed; empty input is rejected and nothing is written.
    /// Returns the created note.
    pub fn create(&mut self, content: &str) -> StoreResult<Note> {
        let position = self.notes.len() as u32;
        let note = Note::new(content, position)?;
        self.notes.push(note.clone());
        self.persist()?;
        Ok(note)
    }

    /// Replaces the content of the note identified by `id`.
    ///
    /// Returns `Ok(None)` when no such note exists (stale UI references are
    /// legal, not errors). Empty content is rejected and the prior body is
    /// retained. Identical content succeeds without a persistence write.
    pub fn update(&mut self, id: NoteId, content: &str) -> StoreResult<Option<Note>> {
        let Some(index) = self.index_of(id) else {
            return Ok(None);
        };
        let changed = self.notes[index].edit(content)?;
        if changed {
            self.persist()?;
        }
        Ok(Some(self.notes[index].clone()))
    }

    /// Removes the note identified by `id`, re-ranking the survivors.
    ///
    /// Returns `Ok(false)` without a write when the id is unknown, which
    /// makes repeated deletes idempotent.
    pub fn delete(&mut self, id: NoteId) -> StoreResult<bool> {
        let Some(index) = self.index_of(id) else {
            return Ok(false);
        };
        self.notes.remove(index);
        self.reindex();
        self.persist()?;
        Ok(true)
    }

    /// Re-ranks the collection to follow `ids` exactly.
    ///
    /// The input must be a complete permutation of the current id set;
    /// any violation leaves the collection unchanged and names the
    /// offending id, so a dropped drag event can never corrupt the order.
    pub fn reorder(&mut self, ids: &[NoteId]) -> StoreResult<()> {
        validate_permutation(ids, &self.notes)?;

        let mut by_id: HashMap<NoteId, Note> = self
            .notes
            .drain(..)
            .map(|note| (note.id, note))
            .collect();
        for id in ids {
            if let Some(note) = by_id.remove(id) {
                self.notes.push(note);
            }
        }
        self.reindex();
        self.persist()
    }

    /// Empties the collection and persists the empty state.
    ///
    /// Caller confirmation is a UI concern, not the store's.
    pub fn clear_all(&mut self) -> StoreResult<()> {
        self.notes.clear();
        self.persist()
    }

    /// Read-only view of the collection in position order.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Looks up one note by id.
    pub fn get(&self, id: NoteId) -> Option<&Note> {
        self.index_of(id).map(|index| &self.notes[index])
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    fn load(&mut self) -> StoreResult<()> {
        let Some(blob) = self.adapter.get(NOTES_BLOB_KEY)? else {
            self.notes = Vec::new();
            return Ok(());
        };

        self.notes = match decode_collection(&blob) {
            Ok(notes) => notes,
            Err(reason) => {
                warn!(
                    "event=blob_load module=store status=corrupt action=reset_empty reason={reason}"
                );
                Vec::new()
            }
        };
        Ok(())
    }

    /// Writes the whole collection under [`NOTES_BLOB_KEY`].
    ///
    /// A failed write is retried once; a second failure is surfaced while
    /// the in-memory mutation stays visible to the caller.
    fn persist(&mut self) -> StoreResult<()> {
        let blob = serde_json::to_string(&self.notes).map_err(StoreError::Serialize)?;

        if let Err(first) = self.adapter.set(NOTES_BLOB_KEY, &blob) {
            warn!("event=persist module=store status=retry notes={} error={first}", self.notes.len());
            if let Err(second) = self.adapter.set(NOTES_BLOB_KEY, &blob) {
                error!(
                    "event=persist module=store status=error notes={} error={second}",
                    self.notes.len()
                );
                return Err(StoreError::Storage(second));
            }
        }
        Ok(())
    }

    fn index_of(&self, id: NoteId) -> Option<usize> {
        self.notes.iter().position(|note| note.id == id)
    }

    fn reindex(&mut self) {
        for (index, note) in self.notes.iter_mut().enumerate() {
            note.position = index as u32;
        }
    }
}

/// Checks that `ids` is a complete, duplicate-free cover of `notes`.
fn validate_permutation(ids: &[NoteId], notes: &[Note]) -> Result<(), ReorderError> {
    if ids.len() != notes.len() {
        return Err(ReorderError::LengthMismatch {
            expected: notes.len(),
            actual: ids.len(),
        });
    }

    let known: HashSet<NoteId> = notes.iter().map(|note| note.id).collect();
    let mut seen = HashSet::with_capacity(ids.len());
    for id in ids {
        if !known.contains(id) {
            return Err(ReorderError::UnknownId(*id));
        }
        if !seen.insert(*id) {
            return Err(ReorderError::DuplicateId(*id));
        }
    }
    Ok(())
}

/// Decodes and re-checks a persisted collection blob.
///
/// Rejects blobs whose records fail note validation, repeat an id, or do
/// not form a dense `0..n-1` position ranking.
fn decode_collection(blob: &str) -> Result<Vec<Note>, String> {
    let mut notes: Vec<Note> =
        serde_json::from_str(blob).map_err(|err| format!("parse failure: {err}"))?;

    let mut seen = HashSet::with_capacity(notes.len());
    for note in &notes {
        note.validate()
            .map_err(|err| format!("record {}: {err}", note.id))?;
        if !seen.insert(note.id) {
            return Err(format!("duplicate id {}", note.id));
        }
    }

    notes.sort_by_key(|note| note.position);
    for (index, note) in notes.iter().enumerate() {
        if note.position as usize != index {
            return Err(format!("positions are not dense at rank {index}"));
        }
    }

    Ok(notes)
}

#[cfg(test)]
mod tests {
    use super::{decode_collection, validate_permutation, ReorderError};
    use crate::model::note::Note;
    use uuid::Uuid;

    fn fixed_note(suffix: u32, content: &str, position: u32) -> Note {
        let id = Uuid::parse_str(&format!("00000000-0000-4000-8000-{suffix:012}"))
            .expect("valid uuid literal");
        Note::with_id(id, content, position).expect("valid note")
    }

    #[test]
    fn permutation_check_accepts_exact_cover() {
        let notes = vec![fixed_note(1, "a", 0), fixed_note(2, "b", 1)];
        let ids = vec![notes[1].id, notes[0].id];
        assert!(validate_permutation(&ids, &notes).is_ok());
    }

    #[test]
    fn permutation_check_names_each_violation() {
        let notes = vec![fixed_note(1, "a", 0), fixed_note(2, "b", 1)];

        let short = validate_permutation(&[notes[0].id], &notes).unwrap_err();
        assert_eq!(
            short,
            ReorderError::LengthMismatch {
                expected: 2,
                actual: 1
            }
        );

        let duplicated = validate_permutation(&[notes[0].id, notes[0].id], &notes).unwrap_err();
        assert_eq!(duplicated, ReorderError::DuplicateId(notes[0].id));

        let stranger = fixed_note(9, "x", 0).id;
        let unknown = validate_permutation(&[notes[0].id, stranger], &notes).unwrap_err();
        assert_eq!(unknown, ReorderError::UnknownId(stranger));
    }

    #[test]
    fn decode_rejects_duplicate_ids_and_position_gaps() {
        let twin_a = fixed_note(1, "a", 0);
        let mut twin_b = twin_a.clone();
        twin_b.position = 1;
        let blob = serde_json::to_string(&vec![twin_a, twin_b]).expect("serialize");
        assert!(decode_collection(&blob).unwrap_err().contains("duplicate id"));

        let gapped = vec![fixed_note(1, "a", 0), fixed_note(2, "b", 2)];
        let blob = serde_json::to_string(&gapped).expect("serialize");
        assert!(decode_collection(&blob)
            .unwrap_err()
            .contains("not dense"));
    }

    #[test]
    fn decode_orders_records_by_position_field() {
        let records = vec![fixed_note(2, "second", 1), fixed_note(1, "first", 0)];
        let blob = serde_json::to_string(&records).expect("serialize");
        let decoded = decode_collection(&blob).expect("valid blob");
        assert_eq!(decoded[0].content, "first");
        assert_eq!(decoded[1].content, "second");
    }
}
