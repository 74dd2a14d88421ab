use chrono::NaiveDate;
use neura_core::{filter_notes, Note, NoteBody, NoteKind, SearchScope};

fn notes() -> Vec<Note> {
    let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    vec![
        Note::new(NoteBody::text("Buy milk"), day).unwrap(),
        Note::new(NoteBody::checklist(["eggs", "Milk powder"]), day).unwrap(),
        Note::new(NoteBody::audio("file:///milk-memo.m4a"), day).unwrap(),
        Note::new(NoteBody::text("Call mom"), day).unwrap(),
    ]
}

fn kinds(hits: &[Note]) -> Vec<NoteKind> {
    hits.iter().map(Note::kind).collect()
}

#[test]
fn text_only_scope_hides_non_text_notes() {
    let hits = filter_notes(&notes(), "MILK", SearchScope::TextOnly);
    assert_eq!(kinds(&hits), vec![NoteKind::Text]);
}

#[test]
fn include_non_text_scope_always_keeps_audio_and_checklists() {
    let hits = filter_notes(&notes(), "mom", SearchScope::IncludeNonText);
    assert_eq!(
        kinds(&hits),
        vec![NoteKind::Checklist, NoteKind::Audio, NoteKind::Text]
    );
    assert_eq!(hits[2].text(), Some("Call mom"));
}

#[test]
fn match_content_scope_searches_task_labels_but_not_audio_uris() {
    let hits = filter_notes(&notes(), "milk", SearchScope::MatchContent);
    assert_eq!(kinds(&hits), vec![NoteKind::Text, NoteKind::Checklist]);
}

#[test]
fn blank_query_returns_everything_in_order() {
    let all = notes();
    let hits = filter_notes(&all, "   ", SearchScope::TextOnly);
    assert_eq!(hits, all);
}

#[test]
fn no_match_returns_empty() {
    assert!(filter_notes(&notes(), "zzz", SearchScope::MatchContent).is_empty());
}
