//! Mutually exclusive UI modes of the notes screen.
//!
//! # Responsibility
//! - Replace independent "is X open" flags with one enumeration.
//! - Validate transitions so invalid combinations cannot be represented.
//!
//! # Invariants
//! - Exactly one mode is active at a time.
//! - Per-note modes always carry the id of the note they act on.
//! - Every mode can return to `Idle` through `cancel`.

use crate::model::note::NoteId;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UiMode {
    /// List shown, nothing open.
    #[default]
    Idle,
    /// Search bar open with the current query.
    Searching { query: String },
    ComposingText,
    ComposingChecklist,
    /// Voice memo capture in progress.
    Recording,
    EditingNote(NoteId),
    PickingColor(NoteId),
    /// Delete confirmation prompt for one note.
    ConfirmingDelete(NoteId),
}

/// Rejected transition: `action` is not allowed while in `from`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiTransitionError {
    pub from: &'static str,
    pub action: &'static str,
}

impl Display for UiTransitionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ui action `{}` is not allowed in mode `{}`",
            self.action, self.from
        )
    }
}

impl Error for UiTransitionError {}

type TransitionResult<T = ()> = Result<T, UiTransitionError>;

impl UiMode {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Searching { .. } => "searching",
            Self::ComposingText => "composing_text",
            Self::ComposingChecklist => "composing_checklist",
            Self::Recording => "recording",
            Self::EditingNote(_) => "editing_note",
            Self::PickingColor(_) => "picking_color",
            Self::ConfirmingDelete(_) => "confirming_delete",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Active query while searching.
    pub fn search_query(&self) -> Option<&str> {
        match self {
            Self::Searching { query } => Some(query.as_str()),
            _ => None,
        }
    }

    /// Note targeted by the current per-note mode.
    pub fn note_under_action(&self) -> Option<NoteId> {
        match self {
            Self::EditingNote(id) | Self::PickingColor(id) | Self::ConfirmingDelete(id) => {
                Some(*id)
            }
            _ => None,
        }
    }

    /// Opens search. Re-opening while searching keeps the query.
    pub fn begin_search(&mut self) -> TransitionResult {
        match self {
            Self::Idle => {
                *self = Self::Searching {
                    query: String::new(),
                };
                Ok(())
            }
            Self::Searching { .. } => Ok(()),
            _ => Err(self.reject("begin_search")),
        }
    }

    pub fn update_query(&mut self, text: impl Into<String>) -> TransitionResult {
        match self {
            Self::Searching { query } => {
                *query = text.into();
                Ok(())
            }
            _ => Err(self.reject("update_query")),
        }
    }

    pub fn compose_text(&mut self) -> TransitionResult {
        self.from_idle(Self::ComposingText, "compose_text")
    }

    pub fn compose_checklist(&mut self) -> TransitionResult {
        self.from_idle(Self::ComposingChecklist, "compose_checklist")
    }

    pub fn start_recording(&mut self) -> TransitionResult {
        self.from_idle(Self::Recording, "start_recording")
    }

    pub fn finish_recording(&mut self) -> TransitionResult {
        match self {
            Self::Recording => {
                *self = Self::Idle;
                Ok(())
            }
            _ => Err(self.reject("finish_recording")),
        }
    }

    pub fn edit_note(&mut self, id: NoteId) -> TransitionResult {
        self.from_list(Self::EditingNote(id), "edit_note")
    }

    pub fn pick_color(&mut self, id: NoteId) -> TransitionResult {
        self.from_list(Self::PickingColor(id), "pick_color")
    }

    pub fn request_delete(&mut self, id: NoteId) -> TransitionResult {
        self.from_list(Self::ConfirmingDelete(id), "request_delete")
    }

    /// Leaves the edit mode and returns the edited note id.
    pub fn submit_edit(&mut self) -> TransitionResult<NoteId> {
        match *self {
            Self::EditingNote(id) => {
                *self = Self::Idle;
                Ok(id)
            }
            _ => Err(self.reject("submit_edit")),
        }
    }

    /// Leaves the color picker and returns the recolored note id.
    pub fn choose_color(&mut self) -> TransitionResult<NoteId> {
        match *self {
            Self::PickingColor(id) => {
                *self = Self::Idle;
                Ok(id)
            }
            _ => Err(self.reject("choose_color")),
        }
    }

    /// Accepts the delete prompt and returns the id to delete.
    pub fn confirm_delete(&mut self) -> TransitionResult<NoteId> {
        match *self {
            Self::ConfirmingDelete(id) => {
                *self = Self::Idle;
                Ok(id)
            }
            _ => Err(self.reject("confirm_delete")),
        }
    }

    /// Closes whatever is open.
    pub fn cancel(&mut self) {
        *self = Self::Idle;
    }

    fn from_idle(&mut self, next: Self, action: &'static str) -> TransitionResult {
        if !self.is_idle() {
            return Err(self.reject(action));
        }
        *self = next;
        Ok(())
    }

    // Per-note actions are reachable from the plain list and from results.
    fn from_list(&mut self, next: Self, action: &'static str) -> TransitionResult {
        match self {
            Self::Idle | Self::Searching { .. } => {
                *self = next;
                Ok(())
            }
            _ => Err(self.reject(action)),
        }
    }

    fn reject(&self, action: &'static str) -> UiTransitionError {
        UiTransitionError {
            from: self.label(),
            action,
        }
    }
}
