//! Domain model for the note collection.
//!
//! # Responsibility
//! - Define canonical data structures used by store, codec and search.
//! - Keep the variant payload (text, audio, checklist) exhaustively typed.
//!
//! # Invariants
//! - Every note is identified by a stable `NoteId`.
//! - Colors are always members of the fixed palette.

pub mod note;
pub mod palette;
