//! Note store: the authoritative in-memory collection and its persistence.
//!
//! # Responsibility
//! - Own the note collection for the session and mediate all storage I/O.
//! - Expose create/update/recolor/delete/filter to the presentation layer.
//! - Persist the whole collection after every successful mutation.
//!
//! # Invariants
//! - Ids are unique across the collection at all times.
//! - New notes are prepended (newest first); other mutations keep order.
//! - Rejected input is a silent no-op: nothing changes, nothing is written.
//! - Storage failures never propagate out of mutations; the in-memory
//!   collection stays authoritative and the last failure is retained.
//! - After a load that could not read the stored document, or found one
//!   from a newer schema, mutations are not written until a load succeeds.
//! - Mutations take `&mut self`, so read-modify-write cycles never interleave.

use crate::config::{StoreConfig, DEFAULT_STORAGE_KEY};
use crate::model::note::{Note, NoteBody, NoteId, NoteKind};
use crate::model::palette::PaletteColor;
use crate::repo::kv_repo::{KeyValueStore, SqliteKeyValueStore, StorageError, StorageResult};
use crate::repo::snapshot::{decode_snapshot, encode_snapshot, SnapshotError};
use crate::search::filter::{filter_notes, SearchScope};
use chrono::{Local, NaiveDate};
use log::{debug, error, info, warn};
use std::time::Instant;

type TodayFn = Box<dyn Fn() -> NaiveDate + Send>;

/// Note collection bound to one key of a [`KeyValueStore`].
pub struct NoteStore<S: KeyValueStore> {
    storage: S,
    storage_key: String,
    search_scope: SearchScope,
    notes: Vec<Note>,
    today: TodayFn,
    last_persist_error: Option<StorageError>,
    write_block: Option<String>,
}

impl NoteStore<SqliteKeyValueStore> {
    /// Opens the configured SQLite file and loads the persisted collection.
    ///
    /// Only failing to open the database is an error; an unreadable or
    /// corrupt document still yields a usable, empty store.
    pub fn open(config: &StoreConfig) -> StorageResult<Self> {
        let storage = SqliteKeyValueStore::open(&config.db_path)?;
        let mut store = Self::new(storage)
            .with_storage_key(config.storage_key.clone())
            .with_search_scope(config.search_scope);
        store.load();
        Ok(store)
    }
}

impl<S: KeyValueStore> NoteStore<S> {
    /// Creates an empty store over `storage`. Call [`NoteStore::load`] to
    /// read the persisted collection.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            search_scope: SearchScope::default(),
            notes: Vec::new(),
            today: Box::new(|| Local::now().date_naive()),
            last_persist_error: None,
            write_block: None,
        }
    }

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    pub fn with_search_scope(mut self, scope: SearchScope) -> Self {
        self.search_scope = scope;
        self
    }

    /// Overrides the date source used for `created_at`.
    pub fn with_today(mut self, today: impl Fn() -> NaiveDate + Send + 'static) -> Self {
        self.today = Box::new(today);
        self
    }

    /// Reads the persisted collection and makes it the in-memory state.
    ///
    /// Fails soft: read errors, a missing entry or an undecodable document
    /// all yield an empty collection. Legacy documents are rewritten in the
    /// current schema after a successful migration.
    pub fn load(&mut self) -> &[Note] {
        let started_at = Instant::now();
        self.write_block = None;
        let raw = match self.storage.get(&self.storage_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                info!(
                    "event=notes_load module=store status=ok source=empty count=0 duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                self.notes.clear();
                return &self.notes;
            }
            Err(err) => {
                error!(
                    "event=notes_load module=store status=error error_code=storage_read_failed error={}",
                    err
                );
                self.write_block = Some(format!("stored document could not be read: {err}"));
                self.notes.clear();
                return &self.notes;
            }
        };

        match decode_snapshot(&raw, (self.today)()) {
            Ok(decoded) => {
                info!(
                    "event=notes_load module=store status=ok source_version={} count={} skipped={} duration_ms={}",
                    decoded.source_version,
                    decoded.notes.len(),
                    decoded.skipped,
                    started_at.elapsed().as_millis()
                );
                let needs_upgrade = decoded.needs_upgrade();
                self.notes = decoded.notes;
                if needs_upgrade {
                    info!(
                        "event=notes_migrate module=store status=start from_version={}",
                        decoded.source_version
                    );
                    self.persist("notes_migrate");
                }
            }
            Err(err) => {
                error!(
                    "event=notes_load module=store status=error error_code=snapshot_decode_failed error={}",
                    err
                );
                if matches!(err, SnapshotError::UnsupportedSchemaVersion { .. }) {
                    self.write_block = Some(err.to_string());
                }
                self.notes.clear();
            }
        }

        &self.notes
    }

    /// Serializes `notes` and replaces the stored document in one write.
    ///
    /// An explicit save always writes, even while mutations are blocked.
    pub fn save(&mut self, notes: &[Note]) -> Result<(), StorageError> {
        write_snapshot(&mut self.storage, &self.storage_key, notes)
    }

    /// Creates a note from `body` and prepends it.
    ///
    /// Returns `None` (and changes nothing) for blank text, a checklist
    /// without tasks or an audio note without a uri.
    pub fn create(&mut self, body: NoteBody) -> Option<Note> {
        let kind = body.kind();
        let note = match Note::new(body, (self.today)()) {
            Ok(note) => note,
            Err(err) => {
                debug!(
                    "event=note_create module=store status=rejected kind={} reason={}",
                    kind.as_str(),
                    err
                );
                return None;
            }
        };

        self.notes.insert(0, note.clone());
        info!(
            "event=note_create module=store status=ok note_id={} kind={} count={}",
            note.id,
            kind.as_str(),
            self.notes.len()
        );
        self.persist("note_create");
        Some(note)
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> Option<Note> {
        self.create(NoteBody::text(text))
    }

    pub fn create_checklist<I, T>(&mut self, tasks: I) -> Option<Note>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.create(NoteBody::checklist(tasks))
    }

    /// Creates a voice memo note from a finished recording's asset reference.
    pub fn create_audio(&mut self, uri: impl Into<String>) -> Option<Note> {
        self.create(NoteBody::audio(uri))
    }

    /// Replaces the body of note `id`, keeping id, color and date.
    ///
    /// Returns `true` only when the note exists and the body was replaced.
    /// A blank body or a body of a different kind is ignored.
    pub fn update(&mut self, id: NoteId, new_body: NoteBody) -> bool {
        let Some(index) = self.position(id) else {
            debug!("event=note_update module=store status=not_found note_id={id}");
            return false;
        };

        let current_kind = self.notes[index].kind();
        if new_body.kind() != current_kind {
            warn!(
                "event=note_update module=store status=rejected note_id={} reason=kind_mismatch kind={} new_kind={}",
                id,
                current_kind.as_str(),
                new_body.kind().as_str()
            );
            return false;
        }

        let body = match new_body.normalized() {
            Ok(body) => body,
            Err(err) => {
                debug!(
                    "event=note_update module=store status=rejected note_id={} reason={}",
                    id, err
                );
                return false;
            }
        };

        self.notes[index].body = body;
        info!(
            "event=note_update module=store status=ok note_id={} kind={}",
            id,
            current_kind.as_str()
        );
        self.persist("note_update");
        true
    }

    pub fn update_text(&mut self, id: NoteId, text: impl Into<String>) -> bool {
        self.update(id, NoteBody::text(text))
    }

    pub fn update_checklist<I, T>(&mut self, id: NoteId, tasks: I) -> bool
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.update(id, NoteBody::checklist(tasks))
    }

    /// Sets the palette color of note `id`.
    pub fn recolor(&mut self, id: NoteId, color: PaletteColor) -> bool {
        let Some(index) = self.position(id) else {
            debug!("event=note_recolor module=store status=not_found note_id={id}");
            return false;
        };

        self.notes[index].color = color;
        info!(
            "event=note_recolor module=store status=ok note_id={} color={}",
            id,
            color.name()
        );
        self.persist("note_recolor");
        true
    }

    /// Like [`NoteStore::recolor`] for a raw hex string; non-palette values
    /// are rejected silently.
    pub fn recolor_hex(&mut self, id: NoteId, hex: &str) -> bool {
        match PaletteColor::from_hex(hex) {
            Some(color) => self.recolor(id, color),
            None => {
                warn!(
                    "event=note_recolor module=store status=rejected note_id={id} reason=not_in_palette"
                );
                false
            }
        }
    }

    /// Removes note `id`. Confirmation is the caller's job.
    pub fn delete(&mut self, id: NoteId) -> bool {
        let Some(index) = self.position(id) else {
            debug!("event=note_delete module=store status=not_found note_id={id}");
            return false;
        };

        self.notes.remove(index);
        info!(
            "event=note_delete module=store status=ok note_id={} count={}",
            id,
            self.notes.len()
        );
        self.persist("note_delete");
        true
    }

    /// Case-insensitive substring view over the collection.
    pub fn filter(&self, query: &str) -> Vec<Note> {
        filter_notes(&self.notes, query, self.search_scope)
    }

    /// Current collection, newest first.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn get(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Number of notes per kind, for diagnostics.
    pub fn count_by_kind(&self, kind: NoteKind) -> usize {
        self.notes.iter().filter(|note| note.kind() == kind).count()
    }

    pub fn search_scope(&self) -> SearchScope {
        self.search_scope
    }

    pub fn set_search_scope(&mut self, scope: SearchScope) {
        self.search_scope = scope;
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Most recent write failure; cleared by the next successful write.
    pub fn last_persist_error(&self) -> Option<&StorageError> {
        self.last_persist_error.as_ref()
    }

    /// Why mutations are currently kept in memory only, if they are.
    pub fn write_blocked_reason(&self) -> Option<&str> {
        self.write_block.as_deref()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Releases the underlying storage, e.g. to simulate a restart.
    pub fn into_storage(self) -> S {
        self.storage
    }

    fn position(&self, id: NoteId) -> Option<usize> {
        self.notes.iter().position(|note| note.id == id)
    }

    fn persist(&mut self, event: &str) {
        if let Some(reason) = &self.write_block {
            warn!(
                "event={} module=store status=skipped error_code=write_blocked count={}",
                event,
                self.notes.len()
            );
            self.last_persist_error = Some(StorageError::WriteBlocked {
                key: self.storage_key.clone(),
                reason: reason.clone(),
            });
            return;
        }
        let started_at = Instant::now();
        match write_snapshot(&mut self.storage, &self.storage_key, &self.notes) {
            Ok(()) => {
                debug!(
                    "event={} module=store status=persisted count={} duration_ms={}",
                    event,
                    self.notes.len(),
                    started_at.elapsed().as_millis()
                );
                self.last_persist_error = None;
            }
            Err(err) => {
                error!(
                    "event={} module=store status=error error_code=storage_write_failed count={} error={}",
                    event,
                    self.notes.len(),
                    err
                );
                self.last_persist_error = Some(err);
            }
        }
    }
}

fn write_snapshot<S: KeyValueStore>(
    storage: &mut S,
    key: &str,
    notes: &[Note],
) -> Result<(), StorageError> {
    let document = encode_snapshot(notes).map_err(|err| StorageError::Write {
        key: key.to_string(),
        message: err.to_string(),
    })?;
    storage.set(key, &document)
}
