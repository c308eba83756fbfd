use crate::{
    AppState, Direction, Effect, Intent, Item, ItemId, Msg, NavError, Step, Thumbnail,
    ThumbnailUpdate,
};

/// Pure update function: applies a message to state and returns any effects.
///
/// The step changes as soon as a transition is accepted; the matching
/// [`Effect::AnimateTransition`] is a visual overlay only.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    if state.is_closing() {
        return (state, Vec::new());
    }

    let effects = match msg {
        Msg::NextClicked => next(&mut state),
        Msg::BackClicked => back(&mut state),
        Msg::CardSelected { item_id } => {
            if let Err(err) = select(&mut state, item_id, Intent::Select) {
                state.reject(err);
            }
            Vec::new()
        }
        Msg::CardChosen { item_id } => match select(&mut state, item_id, Intent::Choose) {
            Ok(()) => next(&mut state),
            Err(err) => {
                state.reject(err);
                Vec::new()
            }
        },
        Msg::JobFinished { items } => job_finished(&mut state, items),
        Msg::ThumbnailRequested { item_id } => request_thumbnail(&mut state, item_id),
        Msg::ThumbnailDismissed { item_id } => {
            if state.thumbnail(item_id).is_some_and(Thumbnail::is_outstanding) {
                state.set_thumbnail(item_id, Thumbnail::Idle);
                vec![Effect::AbortDownload { item_id }]
            } else {
                Vec::new()
            }
        }
        Msg::ThumbnailChanged { item_id, update } => {
            apply_thumbnail_update(&mut state, item_id, update);
            Vec::new()
        }
        Msg::CloseRequested => {
            state.begin_close();
            vec![Effect::Shutdown]
        }
        Msg::Tick => Vec::new(),
    };

    (state, effects)
}

fn next(state: &mut AppState) -> Vec<Effect> {
    match state.step() {
        Step::Welcome => {
            if state.is_job_running() {
                state.reject(NavError::JobAlreadyRunning);
                return Vec::new();
            }
            state.begin_job();
            vec![Effect::StartJob, transition(state, Step::Processing)]
        }
        Step::Results => {
            let Some(item) = state.selection().cloned() else {
                state.reject(NavError::NoSelection);
                return Vec::new();
            };
            state.record_choice(item);
            vec![transition(state, Step::Final)]
        }
        step @ (Step::Processing | Step::Final) => {
            state.reject(NavError::NotAvailable {
                step,
                intent: Intent::Next,
            });
            Vec::new()
        }
    }
}

fn back(state: &mut AppState) -> Vec<Effect> {
    match state.step() {
        // Processing is not revisitable, so Results returns straight to Welcome.
        Step::Results => {
            state.clear_selection();
            state.reset_thumbnails();
            vec![Effect::AbortAllDownloads, transition(state, Step::Welcome)]
        }
        Step::Final => {
            state.clear_choice();
            vec![transition(state, Step::Results)]
        }
        step @ (Step::Welcome | Step::Processing) => {
            state.reject(NavError::NotAvailable {
                step,
                intent: Intent::Back,
            });
            Vec::new()
        }
    }
}

fn transition(state: &mut AppState, to: Step) -> Effect {
    let from = state.step();
    state.move_to(to);
    Effect::AnimateTransition {
        from,
        to,
        direction: Direction::between(from, to),
    }
}

fn select(state: &mut AppState, item_id: ItemId, intent: Intent) -> Result<(), NavError> {
    if state.step() != Step::Results {
        return Err(NavError::NotAvailable {
            step: state.step(),
            intent,
        });
    }
    state.select(item_id)
}

fn job_finished(state: &mut AppState, items: Vec<Item>) -> Vec<Effect> {
    // A completion nobody is waiting for is stale and dropped.
    if !state.is_job_running() || state.step() != Step::Processing {
        return Vec::new();
    }
    state.store_results(items);
    vec![transition(state, Step::Results)]
}

fn request_thumbnail(state: &mut AppState, item_id: ItemId) -> Vec<Effect> {
    if state.step() != Step::Results {
        state.reject(NavError::NotAvailable {
            step: state.step(),
            intent: Intent::SubmitDownload,
        });
        return Vec::new();
    }
    match state.thumbnail(item_id) {
        None => {
            state.reject(NavError::UnknownItem(item_id));
            Vec::new()
        }
        Some(Thumbnail::Loading | Thumbnail::Loaded(_)) => Vec::new(),
        Some(Thumbnail::Idle | Thumbnail::Failed(_)) => match state.thumbnail_url(item_id) {
            Some(url) => {
                state.set_thumbnail(item_id, Thumbnail::Loading);
                vec![Effect::SubmitDownload { item_id, url }]
            }
            None => {
                state.set_thumbnail(item_id, Thumbnail::Failed("invalid thumbnail url".into()));
                Vec::new()
            }
        },
    }
}

fn apply_thumbnail_update(state: &mut AppState, item_id: ItemId, update: ThumbnailUpdate) {
    // Only a card that is waiting for a download accepts its outcome.
    if !state.thumbnail(item_id).is_some_and(Thumbnail::is_outstanding) {
        return;
    }
    let thumbnail = match update {
        ThumbnailUpdate::Loading => Thumbnail::Loading,
        ThumbnailUpdate::Loaded(bytes) => Thumbnail::Loaded(bytes),
        ThumbnailUpdate::Failed(reason) => Thumbnail::Failed(reason),
        ThumbnailUpdate::Aborted => Thumbnail::Idle,
    };
    state.set_thumbnail(item_id, thumbnail);
}
