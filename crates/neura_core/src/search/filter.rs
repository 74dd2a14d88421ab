//! Substring filter over the note collection.
//!
//! # Invariants
//! - Filtering never reorders or mutates the source collection.
//! - A blank query matches every note regardless of scope.

use crate::model::note::{Note, NoteBody};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// How non-text notes take part in search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchScope {
    /// Only text notes can match; audio and checklist notes are hidden.
    TextOnly,
    /// Text notes are matched; audio and checklist notes always stay visible.
    IncludeNonText,
    /// Text bodies and checklist task labels are matched; audio is hidden.
    #[default]
    MatchContent,
}

impl SearchScope {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TextOnly => "text_only",
            Self::IncludeNonText => "include_non_text",
            Self::MatchContent => "match_content",
        }
    }
}

impl Display for SearchScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSearchScope(pub String);

impl Display for UnknownSearchScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unsupported search scope `{}`; expected text_only|include_non_text|match_content",
            self.0
        )
    }
}

impl Error for UnknownSearchScope {}

impl FromStr for SearchScope {
    type Err = UnknownSearchScope;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "text_only" | "text" => Ok(Self::TextOnly),
            "include_non_text" => Ok(Self::IncludeNonText),
            "match_content" | "content" => Ok(Self::MatchContent),
            other => Err(UnknownSearchScope(other.to_string())),
        }
    }
}

/// Returns the notes matching `query`, in collection order.
pub fn filter_notes(notes: &[Note], query: &str, scope: SearchScope) -> Vec<Note> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return notes.to_vec();
    }

    notes
        .iter()
        .filter(|note| note_matches(note, &needle, scope))
        .cloned()
        .collect()
}

/// Matches one note against an already lowercased, non-empty needle.
pub fn note_matches(note: &Note, needle: &str, scope: SearchScope) -> bool {
    match (&note.body, scope) {
        (NoteBody::Text(text), _) => contains_folded(text, needle),
        (_, SearchScope::IncludeNonText) => true,
        (NoteBody::Checklist(tasks), SearchScope::MatchContent) => {
            tasks.iter().any(|task| contains_folded(task, needle))
        }
        (NoteBody::Checklist(_), SearchScope::TextOnly) => false,
        (NoteBody::Audio { .. }, _) => false,
    }
}

fn contains_folded(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::SearchScope;

    #[test]
    fn scope_parses_known_values() {
        assert_eq!("TEXT_ONLY".parse(), Ok(SearchScope::TextOnly));
        assert_eq!(
            " include-non-text ".parse(),
            Ok(SearchScope::IncludeNonText)
        );
        assert_eq!("match_content".parse(), Ok(SearchScope::MatchContent));
        assert!("everything".parse::<SearchScope>().is_err());
    }

    #[test]
    fn scope_round_trips_through_label() {
        for scope in [
            SearchScope::TextOnly,
            SearchScope::IncludeNonText,
            SearchScope::MatchContent,
        ] {
            assert_eq!(scope.as_str().parse(), Ok(scope));
        }
    }
}
