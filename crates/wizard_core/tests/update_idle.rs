use pretty_assertions::assert_eq;
use wizard_core::{update, AppState, Msg, Step};

#[test]
fn tick_does_not_touch_state() {
    let state = AppState::new();
    let (next, effects) = update(state.clone(), Msg::Tick);

    assert_eq!(state, next);
    assert!(effects.is_empty());
}

#[test]
fn tick_during_processing_leaves_the_job_waiting() {
    let (state, _) = update(AppState::new(), Msg::NextClicked);
    let (next, effects) = update(state.clone(), Msg::Tick);

    assert_eq!(next.step(), Step::Processing);
    assert!(next.is_job_running());
    assert_eq!(state, next);
    assert!(effects.is_empty());
}
