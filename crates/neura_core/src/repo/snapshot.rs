//! Versioned snapshot document for the whole note collection.
//!
//! # Responsibility
//! - Encode the collection as one JSON document carrying `schema_version`.
//! - Decode current documents and migrate older shapes at load time.
//!
//! # Invariants
//! - Encoding always writes the latest schema version.
//! - Decoded collections never contain duplicate ids.
//! - A document from a newer schema is rejected, never partially read.
//!
//! Legacy shapes (no version field, bare JSON array):
//! - v0: `[{ "id", "value" }]`, text only.
//! - v1: `[{ "id", "texto", "color", "fecha", "tipo", "lista", "uri" }]`.

use crate::model::note::{Note, NoteBody, NoteId};
use crate::model::palette::PaletteColor;
use chrono::NaiveDate;
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Schema version written by [`encode_snapshot`].
pub const SNAPSHOT_SCHEMA_VERSION: u32 = 2;

const LEGACY_ID_NAMESPACE: Uuid = Uuid::from_u128(0x8f0c_62d4_5a1e_4b7a_9c3d_2e6f_1a0b_7c55);

static ISO_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})").expect("valid iso date regex"));
static DMY_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2})[/.-](\d{1,2})[/.-](\d{4})").expect("valid d/m/y date regex")
});

/// Codec error for snapshot documents.
#[derive(Debug)]
pub enum SnapshotError {
    /// Input is not JSON or has an unrecognized top-level shape.
    Malformed(String),
    /// Document was written by a newer schema.
    UnsupportedSchemaVersion { found: u32, latest_supported: u32 },
    /// Encoding failed.
    Encode(serde_json::Error),
}

impl Display for SnapshotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(message) => write!(f, "malformed notes snapshot: {message}"),
            Self::UnsupportedSchemaVersion {
                found,
                latest_supported,
            } => write!(
                f,
                "notes snapshot schema version {found} is newer than supported {latest_supported}"
            ),
            Self::Encode(err) => write!(f, "failed to encode notes snapshot: {err}"),
        }
    }
}

impl Error for SnapshotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Encode(err) => Some(err),
            _ => None,
        }
    }
}

/// Result of decoding one stored document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedSnapshot {
    /// Schema version the document was written with (0 and 1 are legacy).
    pub source_version: u32,
    /// Notes in stored order.
    pub notes: Vec<Note>,
    /// Entries dropped because they were invalid or duplicated.
    pub skipped: usize,
}

impl DecodedSnapshot {
    /// Whether the document must be rewritten in the current schema.
    pub fn needs_upgrade(&self) -> bool {
        self.source_version < SNAPSHOT_SCHEMA_VERSION
    }
}

#[derive(Serialize)]
struct SnapshotDocument<'a> {
    schema_version: u32,
    notes: &'a [Note],
}

/// Serializes the full collection in the current schema.
pub fn encode_snapshot(notes: &[Note]) -> Result<String, SnapshotError> {
    serde_json::to_string(&SnapshotDocument {
        schema_version: SNAPSHOT_SCHEMA_VERSION,
        notes,
    })
    .map_err(SnapshotError::Encode)
}

/// Parses a stored document, migrating legacy shapes.
///
/// `today` fills creation dates that legacy entries lack or that cannot be
/// parsed. Invalid entries are skipped with a warning instead of failing the
/// whole document.
pub fn decode_snapshot(raw: &str, today: NaiveDate) -> Result<DecodedSnapshot, SnapshotError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|err| SnapshotError::Malformed(err.to_string()))?;

    match value {
        Value::Object(mut object) => {
            let version = object
                .get("schema_version")
                .and_then(Value::as_u64)
                .ok_or_else(|| {
                    SnapshotError::Malformed("missing numeric `schema_version`".to_string())
                })?;
            let version = u32::try_from(version).unwrap_or(u32::MAX);
            if version > SNAPSHOT_SCHEMA_VERSION {
                return Err(SnapshotError::UnsupportedSchemaVersion {
                    found: version,
                    latest_supported: SNAPSHOT_SCHEMA_VERSION,
                });
            }
            if version < SNAPSHOT_SCHEMA_VERSION {
                return Err(SnapshotError::Malformed(format!(
                    "schema_version {version} was never written as a versioned document"
                )));
            }
            let entries = match object.remove("notes") {
                Some(Value::Array(entries)) => entries,
                _ => return Err(SnapshotError::Malformed("missing `notes` array".to_string())),
            };
            Ok(collect_unique(version, entries, |entry| {
                serde_json::from_value::<Note>(entry).map_err(|err| err.to_string())
            }))
        }
        Value::Array(entries) => {
            if entries.iter().any(is_v1_entry) {
                Ok(collect_unique(1, entries, |entry| {
                    decode_legacy_v1(entry, today)
                }))
            } else {
                Ok(collect_unique(0, entries, |entry| {
                    decode_legacy_v0(entry, today)
                }))
            }
        }
        other => Err(SnapshotError::Malformed(format!(
            "unexpected top-level JSON {}",
            json_type_name(&other)
        ))),
    }
}

fn collect_unique(
    source_version: u32,
    entries: Vec<Value>,
    mut decode: impl FnMut(Value) -> Result<Note, String>,
) -> DecodedSnapshot {
    let mut seen = HashSet::new();
    let mut notes = Vec::with_capacity(entries.len());
    let mut skipped = 0;

    for (index, entry) in entries.into_iter().enumerate() {
        match decode(entry) {
            Ok(note) => {
                if seen.insert(note.id) {
                    notes.push(note);
                } else {
                    skipped += 1;
                    warn!(
                        "event=snapshot_decode module=snapshot status=skip reason=duplicate_id index={} note_id={}",
                        index, note.id
                    );
                }
            }
            Err(reason) => {
                skipped += 1;
                warn!(
                    "event=snapshot_decode module=snapshot status=skip reason=invalid_entry index={} version={} error={}",
                    index, source_version, reason
                );
            }
        }
    }

    DecodedSnapshot {
        source_version,
        notes,
        skipped,
    }
}

#[derive(Debug, Deserialize)]
struct LegacyNoteV0 {
    id: Value,
    value: String,
}

#[derive(Debug, Deserialize)]
struct LegacyNoteV1 {
    id: Value,
    #[serde(default)]
    texto: Option<String>,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    fecha: Option<String>,
    #[serde(default)]
    tipo: Option<String>,
    #[serde(default)]
    lista: Option<Vec<LegacyTask>>,
    #[serde(default)]
    uri: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LegacyTask {
    Label(String),
    Item {
        #[serde(alias = "texto", alias = "text", alias = "value")]
        label: String,
    },
}

impl LegacyTask {
    fn into_label(self) -> String {
        match self {
            Self::Label(label) | Self::Item { label } => label,
        }
    }
}

fn is_v1_entry(entry: &Value) -> bool {
    entry.as_object().is_some_and(|object| {
        ["texto", "tipo", "lista", "fecha", "uri"]
            .iter()
            .any(|field| object.contains_key(*field))
    })
}

fn decode_legacy_v0(entry: Value, today: NaiveDate) -> Result<Note, String> {
    let legacy: LegacyNoteV0 = serde_json::from_value(entry).map_err(|err| err.to_string())?;
    let id = legacy_note_id(&legacy.id)?;
    Note::with_id(
        id,
        NoteBody::Text(legacy.value),
        PaletteColor::default(),
        today,
    )
    .map_err(|err| err.to_string())
}

fn decode_legacy_v1(entry: Value, today: NaiveDate) -> Result<Note, String> {
    let legacy: LegacyNoteV1 = serde_json::from_value(entry).map_err(|err| err.to_string())?;
    let id = legacy_note_id(&legacy.id)?;

    let color = match legacy.color.as_deref() {
        Some(raw) => PaletteColor::from_hex(raw).unwrap_or_else(|| {
            warn!(
                "event=snapshot_migrate module=snapshot status=fallback field=color note_id={}",
                id
            );
            PaletteColor::default()
        }),
        None => PaletteColor::default(),
    };

    let created_at = match legacy.fecha.as_deref() {
        Some(raw) => parse_legacy_date(raw).unwrap_or_else(|| {
            warn!(
                "event=snapshot_migrate module=snapshot status=fallback field=fecha note_id={}",
                id
            );
            today
        }),
        None => today,
    };

    let body = legacy_body(legacy.tipo.as_deref(), legacy.texto, legacy.lista, legacy.uri)?;
    Note::with_id(id, body, color, created_at).map_err(|err| err.to_string())
}

fn legacy_body(
    tipo: Option<&str>,
    texto: Option<String>,
    lista: Option<Vec<LegacyTask>>,
    uri: Option<String>,
) -> Result<NoteBody, String> {
    let tipo = tipo.map(|value| value.trim().to_lowercase());
    let kind = match tipo.as_deref() {
        Some("texto" | "text" | "nota" | "note") => "text",
        Some("audio" | "voz" | "voice") => "audio",
        Some("checklist" | "lista" | "tareas" | "tasks") => "checklist",
        Some(other) => return Err(format!("unknown legacy tipo `{other}`")),
        None if lista.is_some() => "checklist",
        None if uri.is_some() => "audio",
        None => "text",
    };

    match kind {
        "audio" => Ok(NoteBody::Audio {
            uri: uri.unwrap_or_default(),
        }),
        "checklist" => Ok(NoteBody::Checklist(
            lista
                .unwrap_or_default()
                .into_iter()
                .map(LegacyTask::into_label)
                .collect(),
        )),
        _ => Ok(NoteBody::Text(texto.unwrap_or_default())),
    }
}

/// Maps a legacy identifier onto a stable UUID.
///
/// UUID strings are kept; anything else (random floats, timestamps) maps to
/// a name-based UUID so the same legacy id always yields the same note id.
fn legacy_note_id(raw: &Value) -> Result<NoteId, String> {
    let text = match raw {
        Value::String(value) => value.trim().to_string(),
        Value::Number(value) => value.to_string(),
        other => return Err(format!("unsupported legacy id type {}", json_type_name(other))),
    };
    if text.is_empty() {
        return Err("legacy id is empty".to_string());
    }

    match Uuid::parse_str(&text) {
        Ok(id) if !id.is_nil() => Ok(id),
        _ => Ok(Uuid::new_v5(&LEGACY_ID_NAMESPACE, text.as_bytes())),
    }
}

/// Parses the day part of legacy `fecha` strings.
///
/// Accepts `YYYY-MM-DD` (optionally followed by a time) and day-first
/// `D/M/YYYY` as produced by Spanish locale formatting.
pub(crate) fn parse_legacy_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if let Some(caps) = ISO_DATE_RE.captures(trimmed) {
        return ymd(&caps[1], &caps[2], &caps[3]);
    }
    if let Some(caps) = DMY_DATE_RE.captures(trimmed) {
        return ymd(&caps[3], &caps[2], &caps[1]);
    }
    None
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::{legacy_note_id, parse_legacy_date};
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn parse_legacy_date_accepts_iso_and_day_first_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 7).expect("valid date");
        assert_eq!(parse_legacy_date("2024-03-07"), Some(expected));
        assert_eq!(parse_legacy_date("2024-03-07T18:22:11.000Z"), Some(expected));
        assert_eq!(parse_legacy_date("7/3/2024"), Some(expected));
        assert_eq!(parse_legacy_date("07.03.2024"), Some(expected));
    }

    #[test]
    fn parse_legacy_date_rejects_garbage_and_impossible_days() {
        assert_eq!(parse_legacy_date("yesterday"), None);
        assert_eq!(parse_legacy_date("31/2/2024"), None);
    }

    #[test]
    fn legacy_ids_map_deterministically() {
        let first = legacy_note_id(&json!("0.7321889")).expect("string id");
        let second = legacy_note_id(&json!("0.7321889")).expect("string id");
        let other = legacy_note_id(&json!(1_700_000_000_000_i64)).expect("numeric id");
        assert_eq!(first, second);
        assert_ne!(first, other);
        assert!(legacy_note_id(&json!(null)).is_err());
    }
}
