use neura_core::{UiMode, UiTransitionError};
use uuid::Uuid;

#[test]
fn starts_idle_with_nothing_open() {
    let mode = UiMode::default();
    assert!(mode.is_idle());
    assert_eq!(mode.search_query(), None);
    assert_eq!(mode.note_under_action(), None);
}

#[test]
fn search_keeps_query_until_cancelled() {
    let mut mode = UiMode::default();
    mode.begin_search().unwrap();
    mode.update_query("milk").unwrap();
    mode.begin_search().unwrap();
    assert_eq!(mode.search_query(), Some("milk"));

    mode.cancel();
    assert!(mode.is_idle());
    assert!(mode.update_query("eggs").is_err());
}

#[test]
fn composing_modes_exclude_each_other() {
    let mut mode = UiMode::default();
    mode.compose_text().unwrap();

    let err = mode.compose_checklist().unwrap_err();
    assert_eq!(
        err,
        UiTransitionError {
            from: "composing_text",
            action: "compose_checklist",
        }
    );
    assert!(mode.start_recording().is_err());
    assert!(mode.begin_search().is_err());
    assert_eq!(mode, UiMode::ComposingText);
}

#[test]
fn recording_finishes_back_to_idle() {
    let mut mode = UiMode::default();
    assert!(mode.finish_recording().is_err());

    mode.start_recording().unwrap();
    assert_eq!(mode.label(), "recording");
    mode.finish_recording().unwrap();
    assert!(mode.is_idle());
}

#[test]
fn per_note_modes_carry_their_note_from_search_results() {
    let id = Uuid::new_v4();
    let mut mode = UiMode::default();
    mode.begin_search().unwrap();
    mode.update_query("call").unwrap();

    mode.pick_color(id).unwrap();
    assert_eq!(mode.note_under_action(), Some(id));
    assert!(mode.edit_note(Uuid::new_v4()).is_err());
    assert_eq!(mode.choose_color().unwrap(), id);
    assert!(mode.is_idle());
}

#[test]
fn delete_and_edit_confirm_return_the_target_id() {
    let id = Uuid::new_v4();
    let mut mode = UiMode::default();

    mode.request_delete(id).unwrap();
    assert!(mode.submit_edit().is_err());
    assert_eq!(mode.confirm_delete().unwrap(), id);

    mode.edit_note(id).unwrap();
    assert_eq!(mode, UiMode::EditingNote(id));
    assert_eq!(mode.submit_edit().unwrap(), id);
    assert!(mode.confirm_delete().is_err());
}

#[test]
fn transition_error_names_mode_and_action() {
    let mut mode = UiMode::Recording;
    let err = mode.request_delete(Uuid::new_v4()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "ui action `request_delete` is not allowed in mode `recording`"
    );
}
