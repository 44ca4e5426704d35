//! FFI use-case API for host-UI-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level note operations to the UI via FRB.
//! - Keep error semantics simple: envelopes, never exceptions.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Return values are UTF-8 strings with stable meaning.
//! - The UI re-renders from `notes_list` after each mutating call.

use coosenote_core::db::open_db;
use coosenote_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    Note, NoteId, NoteStore, SqliteAdapter,
};
use std::path::PathBuf;
use std::sync::OnceLock;
use uuid::Uuid;

const NOTES_DB_FILE_NAME: &str = "coosenotes.sqlite3";
static NOTES_DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Sync call; may perform small file-system setup work.
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on
///   failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One note row as rendered by the UI list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteView {
    /// Stable note ID in string form.
    pub id: String,
    /// Plain text body.
    pub content: String,
    /// Unix epoch milliseconds of the last content mutation.
    pub updated_at: i64,
    /// Rank in the ordered collection.
    pub position: u32,
}

/// List response envelope for the notes view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesListResponse {
    /// Notes in position order (empty on failure).
    pub items: Vec<NoteView>,
    /// Human-readable response message for diagnostics.
    pub message: String,
}

/// Generic action response envelope for note mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteActionResponse {
    /// Whether the operation was accepted.
    pub ok: bool,
    /// Affected note ID, when one exists.
    pub note_id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl NoteActionResponse {
    fn success(message: impl Into<String>, note_id: Option<String>) -> Self {
        Self {
            ok: true,
            note_id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            note_id: None,
            message: message.into(),
        }
    }
}

/// Returns the whole collection in position order.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics; failures yield an empty list plus a message.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_list() -> NotesListResponse {
    match with_store(|store| Ok(store.notes().iter().map(to_note_view).collect::<Vec<_>>())) {
        Ok(items) => {
            let message = format!("{} note(s).", items.len());
            NotesListResponse { items, message }
        }
        Err(err) => NotesListResponse {
            items: Vec::new(),
            message: format!("notes_list failed: {err}"),
        },
    }
}

/// Creates a note appended at the tail of the order.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Empty/whitespace content is rejected with `ok=false`.
/// - Never panics; returns the created note ID on success.
#[flutter_rust_bridge::frb(sync)]
pub fn note_create(content: String) -> NoteActionResponse {
    match with_store(|store| store.create(&content).map_err(|err| err.to_string())) {
        Ok(note) => NoteActionResponse::success("Note created.", Some(note.id.to_string())),
        Err(err) => NoteActionResponse::failure(format!("note_create failed: {err}")),
    }
}

/// Replaces the content of one note.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Unknown ids are accepted as a no-op (stale UI references are legal).
/// - Empty/whitespace content is rejected with `ok=false` and the prior
///   content is retained.
#[flutter_rust_bridge::frb(sync)]
pub fn note_update(id: String, content: String) -> NoteActionResponse {
    let note_id = match parse_note_id(&id) {
        Ok(note_id) => note_id,
        Err(err) => return NoteActionResponse::failure(err),
    };

    match with_store(|store| store.update(note_id, &content).map_err(|err| err.to_string())) {
        Ok(Some(note)) => NoteActionResponse::success("Note updated.", Some(note.id.to_string())),
        Ok(None) => NoteActionResponse::success("No matching note.", None),
        Err(err) => NoteActionResponse::failure(format!("note_update failed: {err}")),
    }
}

/// Deletes one note and re-ranks the survivors.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Unknown ids are accepted as a no-op; repeated deletes are safe.
#[flutter_rust_bridge::frb(sync)]
pub fn note_delete(id: String) -> NoteActionResponse {
    let note_id = match parse_note_id(&id) {
        Ok(note_id) => note_id,
        Err(err) => return NoteActionResponse::failure(err),
    };

    match with_store(|store| store.delete(note_id).map_err(|err| err.to_string())) {
        Ok(true) => NoteActionResponse::success("Note deleted.", Some(id)),
        Ok(false) => NoteActionResponse::success("No matching note.", None),
        Err(err) => NoteActionResponse::failure(format!("note_delete failed: {err}")),
    }
}

/// Re-ranks the collection to follow `ids` exactly.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - `ids` must be a complete permutation of the current id set; any
///   violation is rejected with `ok=false` and the stored order is kept, so
///   the UI can re-render from the authoritative order.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_reorder(ids: Vec<String>) -> NoteActionResponse {
    let mut note_ids = Vec::with_capacity(ids.len());
    for id in &ids {
        match parse_note_id(id) {
            Ok(note_id) => note_ids.push(note_id),
            Err(err) => return NoteActionResponse::failure(err),
        }
    }

    match with_store(|store| store.reorder(&note_ids).map_err(|err| err.to_string())) {
        Ok(()) => NoteActionResponse::success("Order saved.", None),
        Err(err) => NoteActionResponse::failure(format!("notes_reorder failed: {err}")),
    }
}

/// Empties the collection.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - The UI owns any confirmation dialog; this call is unconditional.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_clear() -> NoteActionResponse {
    match with_store(|store| store.clear_all().map_err(|err| err.to_string())) {
        Ok(()) => NoteActionResponse::success("All notes cleared.", None),
        Err(err) => NoteActionResponse::failure(format!("notes_clear failed: {err}")),
    }
}

fn parse_note_id(id: &str) -> Result<NoteId, String> {
    Uuid::parse_str(id.trim()).map_err(|_| format!("invalid note id `{id}`"))
}

fn resolve_notes_db_path() -> PathBuf {
    NOTES_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("COOSENOTE_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(NOTES_DB_FILE_NAME)
        })
        .clone()
}

fn with_store<T>(
    f: impl FnOnce(&mut NoteStore<SqliteAdapter<'_>>) -> Result<T, String>,
) -> Result<T, String> {
    let db_path = resolve_notes_db_path();
    let conn = open_db(&db_path).map_err(|err| format!("notes DB open failed: {err}"))?;
    let adapter = SqliteAdapter::try_new(&conn)
        .map_err(|err| format!("notes storage init failed: {err}"))?;
    let mut store =
        NoteStore::open(adapter).map_err(|err| format!("notes load failed: {err}"))?;
    f(&mut store)
}

fn to_note_view(note: &Note) -> NoteView {
    NoteView {
        id: note.id.to_string(),
        content: note.content.clone(),
        updated_at: note.updated_at,
        position: note.position,
    }
}
