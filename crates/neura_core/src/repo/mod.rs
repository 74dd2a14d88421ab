//! Persistence contracts and the stored document format.
//!
//! # Responsibility
//! - Define the key-value storage contract used by the note store.
//! - Isolate SQLite and JSON details from store orchestration.
//!
//! # Invariants
//! - The whole collection is the unit of durability: one key, one document.

pub mod kv_repo;
pub mod snapshot;
