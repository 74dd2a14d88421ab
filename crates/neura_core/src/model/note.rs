//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical note record held by the store.
//! - Model the variant payload (text, audio, checklist) as a tagged union.
//! - Validate creation-time invariants before a note exists.
//!
//! # Invariants
//! - `id` is stable and never reused for another note.
//! - Text bodies are never blank; checklists carry at least one task;
//!   audio notes always reference a non-blank asset uri.
//! - `created_at` is a calendar day and never changes after creation.

use crate::model::palette::PaletteColor;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for every note in the collection.
pub type NoteId = Uuid;

/// Projection kind of a note, derived from its body variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteKind {
    Text,
    Audio,
    Checklist,
}

impl NoteKind {
    /// Stable lowercase label used in the persisted document and FFI.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Audio => "audio",
            Self::Checklist => "checklist",
        }
    }
}

/// Semantic payload of a note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteBody {
    /// Free text.
    Text(String),
    /// Reference (uri or path) to a recorded audio asset.
    Audio { uri: String },
    /// Ordered task labels.
    Checklist(Vec<String>),
}

impl NoteBody {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn audio(uri: impl Into<String>) -> Self {
        Self::Audio { uri: uri.into() }
    }

    pub fn checklist<I, S>(tasks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Checklist(tasks.into_iter().map(Into::into).collect())
    }

    pub fn kind(&self) -> NoteKind {
        match self {
            Self::Text(_) => NoteKind::Text,
            Self::Audio { .. } => NoteKind::Audio,
            Self::Checklist(_) => NoteKind::Checklist,
        }
    }

    /// Returns the canonical form of this body or why it cannot become one.
    ///
    /// Text is kept as entered and only rejected when blank. The audio uri is
    /// trimmed. Checklist labels are trimmed and blank labels are dropped;
    /// order is preserved.
    pub fn normalized(self) -> Result<Self, NoteValidationError> {
        match self {
            Self::Text(value) => {
                if value.trim().is_empty() {
                    return Err(NoteValidationError::EmptyText);
                }
                Ok(Self::Text(value))
            }
            Self::Audio { uri } => {
                let trimmed = uri.trim();
                if trimmed.is_empty() {
                    return Err(NoteValidationError::EmptyAudioUri);
                }
                Ok(Self::Audio {
                    uri: trimmed.to_string(),
                })
            }
            Self::Checklist(tasks) => {
                let tasks = tasks
                    .iter()
                    .map(|task| task.trim())
                    .filter(|task| !task.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>();
                if tasks.is_empty() {
                    return Err(NoteValidationError::EmptyChecklist);
                }
                Ok(Self::Checklist(tasks))
            }
        }
    }

    fn validate(&self) -> Result<(), NoteValidationError> {
        match self {
            Self::Text(value) if value.trim().is_empty() => Err(NoteValidationError::EmptyText),
            Self::Audio { uri } if uri.trim().is_empty() => {
                Err(NoteValidationError::EmptyAudioUri)
            }
            Self::Checklist(tasks) if tasks.iter().all(|task| task.trim().is_empty()) => {
                Err(NoteValidationError::EmptyChecklist)
            }
            _ => Ok(()),
        }
    }
}

/// Canonical note record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "NoteWire", into = "NoteWire")]
pub struct Note {
    /// Stable lookup key.
    pub id: NoteId,
    /// Variant payload.
    pub body: NoteBody,
    /// Palette tag, `White` for new notes.
    pub color: PaletteColor,
    /// Creation day; no time-of-day is retained.
    pub created_at: NaiveDate,
}

impl Note {
    /// Creates a note with a generated id and the default color.
    ///
    /// The body is normalized first; blank input never yields a note.
    pub fn new(body: NoteBody, created_at: NaiveDate) -> Result<Self, NoteValidationError> {
        Self::with_id(Uuid::new_v4(), body, PaletteColor::default(), created_at)
    }

    /// Creates a note with a caller-provided id.
    ///
    /// Used by load/migration paths where identity already exists.
    pub fn with_id(
        id: NoteId,
        body: NoteBody,
        color: PaletteColor,
        created_at: NaiveDate,
    ) -> Result<Self, NoteValidationError> {
        if id.is_nil() {
            return Err(NoteValidationError::NilId);
        }
        Ok(Self {
            id,
            body: body.normalized()?,
            color,
            created_at,
        })
    }

    pub fn kind(&self) -> NoteKind {
        self.body.kind()
    }

    /// Text content for `Text` notes.
    pub fn text(&self) -> Option<&str> {
        match &self.body {
            NoteBody::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Validates record invariants without rewriting the body.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        if self.id.is_nil() {
            return Err(NoteValidationError::NilId);
        }
        self.body.validate()
    }
}

/// Invariant violations for note construction and mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteValidationError {
    NilId,
    EmptyText,
    EmptyChecklist,
    EmptyAudioUri,
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "note id must not be nil"),
            Self::EmptyText => write!(f, "text note body must not be blank"),
            Self::EmptyChecklist => write!(f, "checklist note requires at least one task"),
            Self::EmptyAudioUri => write!(f, "audio note requires an asset uri"),
        }
    }
}

impl Error for NoteValidationError {}

/// Persisted field layout of one note inside the snapshot document.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct NoteWire {
    id: NoteId,
    #[serde(flatten)]
    body: NoteWireBody,
    #[serde(default)]
    color: PaletteColor,
    created_at: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum NoteWireBody {
    Text { body: String },
    Audio { uri: String },
    Checklist { tasks: Vec<String> },
}

impl From<Note> for NoteWire {
    fn from(value: Note) -> Self {
        let body = match value.body {
            NoteBody::Text(body) => NoteWireBody::Text { body },
            NoteBody::Audio { uri } => NoteWireBody::Audio { uri },
            NoteBody::Checklist(tasks) => NoteWireBody::Checklist { tasks },
        };
        Self {
            id: value.id,
            body,
            color: value.color,
            created_at: value.created_at,
        }
    }
}

impl TryFrom<NoteWire> for Note {
    type Error = NoteValidationError;

    fn try_from(value: NoteWire) -> Result<Self, Self::Error> {
        let body = match value.body {
            NoteWireBody::Text { body } => NoteBody::Text(body),
            NoteWireBody::Audio { uri } => NoteBody::Audio { uri },
            NoteWireBody::Checklist { tasks } => NoteBody::Checklist(tasks),
        };
        let note = Note {
            id: value.id,
            body,
            color: value.color,
            created_at: value.created_at,
        };
        note.validate()?;
        Ok(note)
    }
}
