//! Domain model for the note collection.
//!
//! # Responsibility
//! - Define the canonical note record used by store, storage and FFI layers.
//!
//! # Invariants
//! - Every note is identified by a stable `NoteId`.
//! - Content validity (trimmed, non-empty) is enforced at construction and
//!   on every content mutation.

pub mod note;
