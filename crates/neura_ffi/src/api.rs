//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose note use cases to Dart via FRB over one shared store.
//! - Translate core types into plain, string-keyed response structs.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - All store access goes through one mutex, so UI writes are applied
//!   one at a time in arrival order.
//! - A store that failed to open is retried on the next call.

use log::{error, warn};
use neura_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    Note, NoteBody, NoteId, NoteStore, PaletteColor, SqliteKeyValueStore, StoreConfig,
};
use std::sync::{Mutex, PoisonError};
use uuid::Uuid;

static STORE: Mutex<Option<NoteStore<SqliteKeyValueStore>>> = Mutex::new(None);

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
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// One note as seen by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteItem {
    /// Stable note ID in string form.
    pub id: String,
    /// `text|audio|checklist`.
    pub kind: String,
    /// Body for text notes, empty otherwise.
    pub text: String,
    /// Task labels for checklist notes, empty otherwise.
    pub tasks: Vec<String>,
    /// Asset reference for audio notes.
    pub uri: Option<String>,
    /// Background color as `#RRGGBB`.
    pub color: String,
    /// Creation day as `YYYY-MM-DD`.
    pub created_at: String,
}

/// List response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesResponse {
    pub ok: bool,
    /// Notes, newest first.
    pub items: Vec<NoteItem>,
    /// Human-readable response message for diagnostics.
    pub message: String,
}

/// Generic action response envelope for note commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    /// Whether the change was applied in memory.
    pub ok: bool,
    /// Affected note ID.
    pub note_id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
    /// Set when the change was applied but could not be written to storage.
    pub persist_error: Option<String>,
}

impl ActionResponse {
    fn applied(message: &str, note_id: NoteId, persist_error: Option<String>) -> Self {
        let message = match &persist_error {
            Some(err) => format!("{message} Saving failed: {err}"),
            None => message.to_string(),
        };
        Self {
            ok: true,
            note_id: Some(note_id.to_string()),
            message,
            persist_error,
        }
    }

    fn rejected(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            note_id: None,
            message: message.into(),
            persist_error: None,
        }
    }
}

/// Palette entry exposed to the color picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteItem {
    pub name: String,
    pub hex: String,
}

/// Returns all notes, newest first.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_list() -> NotesResponse {
    match with_store(|store| store.notes().iter().map(to_note_item).collect::<Vec<_>>()) {
        Ok(items) => NotesResponse {
            ok: true,
            message: format!("{} note(s).", items.len()),
            items,
        },
        Err(err) => list_failure("notes_list", err),
    }
}

/// Returns the notes matching `query` under the configured search scope.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_filter(query: String) -> NotesResponse {
    match with_store(|store| {
        store
            .filter(&query)
            .iter()
            .map(to_note_item)
            .collect::<Vec<_>>()
    }) {
        Ok(items) => NotesResponse {
            ok: true,
            message: if items.is_empty() {
                "No results.".to_string()
            } else {
                format!("Found {} result(s).", items.len())
            },
            items,
        },
        Err(err) => list_failure("notes_filter", err),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn note_create_text(text: String) -> ActionResponse {
    create_with("note_create_text", NoteBody::text(text))
}

#[flutter_rust_bridge::frb(sync)]
pub fn note_create_checklist(tasks: Vec<String>) -> ActionResponse {
    create_with("note_create_checklist", NoteBody::Checklist(tasks))
}

/// Stores a finished voice memo referenced by `uri`.
#[flutter_rust_bridge::frb(sync)]
pub fn note_create_audio(uri: String) -> ActionResponse {
    create_with("note_create_audio", NoteBody::audio(uri))
}

#[flutter_rust_bridge::frb(sync)]
pub fn note_update_text(note_id: String, text: String) -> ActionResponse {
    mutate_with("note_update_text", &note_id, "Note updated.", |store, id| {
        store.update_text(id, text)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn note_update_checklist(note_id: String, tasks: Vec<String>) -> ActionResponse {
    mutate_with(
        "note_update_checklist",
        &note_id,
        "Checklist updated.",
        |store, id| store.update_checklist(id, tasks),
    )
}

/// Sets a palette color given as `#RRGGBB`; off-palette values are rejected.
#[flutter_rust_bridge::frb(sync)]
pub fn note_recolor(note_id: String, color_hex: String) -> ActionResponse {
    mutate_with("note_recolor", &note_id, "Color changed.", |store, id| {
        store.recolor_hex(id, &color_hex)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn note_delete(note_id: String) -> ActionResponse {
    mutate_with("note_delete", &note_id, "Note deleted.", |store, id| {
        store.delete(id)
    })
}

/// Returns the fixed palette in picker order.
#[flutter_rust_bridge::frb(sync)]
pub fn palette_colors() -> Vec<PaletteItem> {
    PaletteColor::ALL
        .iter()
        .map(|color| PaletteItem {
            name: color.name().to_string(),
            hex: color.hex().to_string(),
        })
        .collect()
}

fn create_with(op: &str, body: NoteBody) -> ActionResponse {
    match with_store(|store| {
        store
            .create(body)
            .map(|note| (note.id, persist_error_message(store)))
    }) {
        Ok(Some((id, persist_error))) => ActionResponse::applied("Note created.", id, persist_error),
        Ok(None) => ActionResponse::rejected(format!("{op} rejected: note content is empty")),
        Err(err) => ActionResponse::rejected(format!("{op} failed: {err}")),
    }
}

fn mutate_with(
    op: &str,
    raw_id: &str,
    success_message: &str,
    f: impl FnOnce(&mut NoteStore<SqliteKeyValueStore>, NoteId) -> bool,
) -> ActionResponse {
    let id = match parse_note_id(raw_id) {
        Ok(id) => id,
        Err(message) => return ActionResponse::rejected(format!("{op} failed: {message}")),
    };
    match with_store(|store| f(store, id).then(|| persist_error_message(store))) {
        Ok(Some(persist_error)) => ActionResponse::applied(success_message, id, persist_error),
        Ok(None) => ActionResponse::rejected(format!("{op} rejected: note {id} was not changed")),
        Err(err) => ActionResponse::rejected(format!("{op} failed: {err}")),
    }
}

fn with_store<T>(f: impl FnOnce(&mut NoteStore<SqliteKeyValueStore>) -> T) -> Result<T, String> {
    let mut guard = STORE.lock().unwrap_or_else(PoisonError::into_inner);
    if guard.is_none() {
        *guard = Some(open_store()?);
    }
    match guard.as_mut() {
        Some(store) => Ok(f(store)),
        None => Err("note store unavailable".to_string()),
    }
}

fn open_store() -> Result<NoteStore<SqliteKeyValueStore>, String> {
    let config = StoreConfig::from_env().map_err(|err| {
        error!("event=store_open module=ffi status=error stage=config error={err}");
        format!("store config invalid: {err}")
    })?;
    NoteStore::open(&config).map_err(|err| {
        error!("event=store_open module=ffi status=error stage=storage error={err}");
        format!("store open failed: {err}")
    })
}

fn persist_error_message(store: &NoteStore<SqliteKeyValueStore>) -> Option<String> {
    store.last_persist_error().map(ToString::to_string)
}

fn parse_note_id(raw: &str) -> Result<NoteId, String> {
    Uuid::parse_str(raw.trim()).map_err(|err| {
        warn!("event=ffi_parse_id module=ffi status=error error={err}");
        format!("invalid note id `{}`", raw.trim())
    })
}

fn list_failure(op: &str, err: String) -> NotesResponse {
    NotesResponse {
        ok: false,
        items: Vec::new(),
        message: format!("{op} failed: {err}"),
    }
}

fn to_note_item(note: &Note) -> NoteItem {
    let (text, tasks, uri) = match &note.body {
        NoteBody::Text(text) => (text.clone(), Vec::new(), None),
        NoteBody::Checklist(tasks) => (String::new(), tasks.clone(), None),
        NoteBody::Audio { uri } => (String::new(), Vec::new(), Some(uri.clone())),
    };
    NoteItem {
        id: note.id.to_string(),
        kind: note.kind().as_str().to_string(),
        text,
        tasks,
        uri,
        color: note.color.hex().to_string(),
        created_at: note.created_at.format("%Y-%m-%d").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, init_logging, note_create_audio, note_create_checklist, note_create_text,
        note_delete, note_recolor, note_update_checklist, note_update_text, notes_filter,
        notes_list, palette_colors, ping,
    };
    use neura_core::config::ENV_DB_PATH;
    use std::sync::OnceLock;
    use std::time::{SystemTime, UNIX_EPOCH};

    static TEST_DB_DIR: OnceLock<tempfile::TempDir> = OnceLock::new();

    /// Points the shared store at a per-run database before its first open.
    fn use_test_db() {
        TEST_DB_DIR.get_or_init(|| {
            let dir = tempfile::tempdir().expect("temp dir");
            std::env::set_var(ENV_DB_PATH, dir.path().join("ffi_notes.sqlite3"));
            dir
        });
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn palette_starts_with_default_white() {
        let palette = palette_colors();
        assert_eq!(palette.len(), 7);
        assert_eq!(palette[0].hex, "#FFFFFF");
    }

    #[test]
    fn created_text_note_is_listed_and_filterable() {
        use_test_db();
        let token = unique_token("ffi-text");
        let created = note_create_text(format!("  note {token}  "));
        assert!(created.ok, "{}", created.message);
        let id = created.note_id.expect("created note should return note_id");

        let listed = notes_list();
        assert!(listed.ok, "{}", listed.message);
        let item = listed
            .items
            .iter()
            .find(|item| item.id == id)
            .expect("created note should be listed");
        assert_eq!(item.kind, "text");
        assert_eq!(item.text, format!("  note {token}  "));

        let found = notes_filter(token.to_uppercase());
        assert_eq!(found.items.len(), 1);
        assert_eq!(found.items[0].id, id);
    }

    #[test]
    fn blank_text_is_rejected_without_id() {
        use_test_db();
        let response = note_create_text("   ".to_string());
        assert!(!response.ok);
        assert!(response.note_id.is_none());
    }

    #[test]
    fn checklist_and_audio_notes_round_trip_through_items() {
        use_test_db();
        let label = unique_token("ffi-task");
        let checklist = note_create_checklist(vec![label.clone(), " ".to_string()]);
        assert!(checklist.ok, "{}", checklist.message);
        let checklist_id = checklist.note_id.expect("checklist id");

        let updated = note_update_checklist(checklist_id.clone(), vec![format!("{label}-2")]);
        assert!(updated.ok, "{}", updated.message);
        assert!(!note_update_text(checklist_id.clone(), "text".to_string()).ok);

        let audio = note_create_audio("file:///ffi-memo.m4a".to_string());
        let audio_id = audio.note_id.expect("audio id");

        let items = notes_list().items;
        let checklist_item = items.iter().find(|item| item.id == checklist_id).unwrap();
        assert_eq!(checklist_item.tasks, vec![format!("{label}-2")]);
        let audio_item = items.iter().find(|item| item.id == audio_id).unwrap();
        assert_eq!(audio_item.uri.as_deref(), Some("file:///ffi-memo.m4a"));
    }

    #[test]
    fn recolor_accepts_palette_and_rejects_other_colors() {
        use_test_db();
        let created = note_create_text(unique_token("ffi-color"));
        let id = created.note_id.expect("note id");

        assert!(note_recolor(id.clone(), "#c8e6c9".to_string()).ok);
        assert!(!note_recolor(id.clone(), "#000000".to_string()).ok);

        let item = notes_list()
            .items
            .into_iter()
            .find(|item| item.id == id)
            .unwrap();
        assert_eq!(item.color, "#C8E6C9");
    }

    #[test]
    fn delete_removes_note_once() {
        use_test_db();
        let created = note_create_text(unique_token("ffi-delete"));
        let id = created.note_id.expect("note id");

        assert!(note_delete(id.clone()).ok);
        assert!(!note_delete(id.clone()).ok);
        assert!(notes_list().items.iter().all(|item| item.id != id));
    }

    #[test]
    fn malformed_ids_are_rejected() {
        use_test_db();
        let response = note_delete("not-a-uuid".to_string());
        assert!(!response.ok);
        assert!(response.message.contains("invalid note id"));
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
