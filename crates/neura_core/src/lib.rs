//! Core domain logic for Neura notes.
//! This crate is the single source of truth for note invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod media;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;
pub mod ui;

pub use config::{ConfigError, StoreConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use media::session::{
    AssetRef, MediaError, MediaProvider, MediaResult, MediaSession, PlaybackCompletion,
    PlaybackHandle, RecordingHandle,
};
pub use model::note::{Note, NoteBody, NoteId, NoteKind, NoteValidationError};
pub use model::palette::{PaletteColor, UnknownColorError};
pub use repo::kv_repo::{
    KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore, StorageError, StorageResult,
};
pub use repo::snapshot::{
    decode_snapshot, encode_snapshot, DecodedSnapshot, SnapshotError, SNAPSHOT_SCHEMA_VERSION,
};
pub use search::filter::{filter_notes, SearchScope};
pub use service::note_store::NoteStore;
pub use ui::mode::{UiMode, UiTransitionError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
