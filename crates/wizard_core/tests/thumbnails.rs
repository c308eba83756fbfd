use pretty_assertions::assert_eq;
use wizard_core::{
    update, AppState, Effect, Intent, Item, Msg, NavError, Step, Thumbnail, ThumbnailUpdate,
    WizardConfig,
};

fn init_logging() {
    wizard_logging::initialize_for_tests();
}

fn at_results_with(config: &WizardConfig) -> AppState {
    let (state, _) = update(AppState::with_config(config), Msg::NextClicked);
    let (state, _) = update(
        state,
        Msg::JobFinished {
            items: vec![Item::new(1, "Project Alpha"), Item::new(2, "Project Beta")],
        },
    );
    state
}

fn at_results() -> AppState {
    at_results_with(&WizardConfig::default())
}

#[test]
fn showing_a_card_submits_its_thumbnail_once() {
    init_logging();
    let (state, effects) = update(at_results(), Msg::ThumbnailRequested { item_id: 2 });
    assert_eq!(
        effects,
        vec![Effect::SubmitDownload {
            item_id: 2,
            url: "https://placehold.co/128x96/222/FFF.png?text=Item+2".to_string(),
        }]
    );
    assert_eq!(state.thumbnail(2), Some(&Thumbnail::Loading));

    // Already outstanding: showing again does not submit a second request.
    let (_state, effects) = update(state, Msg::ThumbnailRequested { item_id: 2 });
    assert!(effects.is_empty());
}

#[test]
fn completed_thumbnail_is_stored_and_not_refetched() {
    init_logging();
    let (state, _) = update(at_results(), Msg::ThumbnailRequested { item_id: 1 });
    let (state, _) = update(
        state,
        Msg::ThumbnailChanged {
            item_id: 1,
            update: ThumbnailUpdate::Loaded(vec![0x89, b'P', b'N', b'G']),
        },
    );
    assert_eq!(
        state.thumbnail(1),
        Some(&Thumbnail::Loaded(vec![0x89, b'P', b'N', b'G']))
    );

    let (_state, effects) = update(state, Msg::ThumbnailRequested { item_id: 1 });
    assert!(effects.is_empty());
}

#[test]
fn failed_thumbnail_is_retried_when_shown_again() {
    init_logging();
    let (state, _) = update(at_results(), Msg::ThumbnailRequested { item_id: 1 });
    let (state, effects) = update(
        state,
        Msg::ThumbnailChanged {
            item_id: 1,
            update: ThumbnailUpdate::Failed("http status 404".into()),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.step(), Step::Results, "download errors never move the wizard");
    assert_eq!(
        state.thumbnail(1),
        Some(&Thumbnail::Failed("http status 404".into()))
    );

    let (_state, effects) = update(state, Msg::ThumbnailRequested { item_id: 1 });
    assert_eq!(effects.len(), 1);
}

#[test]
fn dismissing_an_outstanding_card_aborts_its_download() {
    init_logging();
    let (state, _) = update(at_results(), Msg::ThumbnailRequested { item_id: 1 });
    let (state, effects) = update(state, Msg::ThumbnailDismissed { item_id: 1 });
    assert_eq!(effects, vec![Effect::AbortDownload { item_id: 1 }]);
    assert_eq!(state.thumbnail(1), Some(&Thumbnail::Idle));

    // Nothing outstanding any more: dismissing again is a no-op.
    let (_state, effects) = update(state, Msg::ThumbnailDismissed { item_id: 1 });
    assert!(effects.is_empty());
}

#[test]
fn late_results_after_leaving_results_are_dropped() {
    init_logging();
    let (state, _) = update(at_results(), Msg::ThumbnailRequested { item_id: 1 });
    let (state, _) = update(state, Msg::BackClicked);
    let (state, _) = update(
        state,
        Msg::ThumbnailChanged {
            item_id: 1,
            update: ThumbnailUpdate::Loaded(vec![1, 2, 3]),
        },
    );
    assert_eq!(state.thumbnail(1), Some(&Thumbnail::Idle));
}

#[test]
fn aborted_download_returns_card_to_idle() {
    init_logging();
    let (state, _) = update(at_results(), Msg::ThumbnailRequested { item_id: 2 });
    let (state, _) = update(
        state,
        Msg::ThumbnailChanged {
            item_id: 2,
            update: ThumbnailUpdate::Aborted,
        },
    );
    assert_eq!(state.thumbnail(2), Some(&Thumbnail::Idle));
}

#[test]
fn thumbnail_requests_outside_results_are_rejected() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::ThumbnailRequested { item_id: 1 });
    assert!(effects.is_empty());
    assert_eq!(
        state.last_error(),
        Some(&NavError::NotAvailable {
            step: Step::Welcome,
            intent: Intent::SubmitDownload,
        })
    );

    let (state, effects) = update(at_results(), Msg::ThumbnailRequested { item_id: 42 });
    assert!(effects.is_empty());
    assert_eq!(state.last_error(), Some(&NavError::UnknownItem(42)));
}

#[test]
fn invalid_template_marks_thumbnail_failed_without_submitting() {
    init_logging();
    let config = WizardConfig {
        thumbnail_url_template: "not a url {id}".to_string(),
        ..WizardConfig::default()
    };
    let (state, effects) = update(at_results_with(&config), Msg::ThumbnailRequested { item_id: 1 });
    assert!(effects.is_empty());
    assert!(matches!(state.thumbnail(1), Some(Thumbnail::Failed(_))));
}
