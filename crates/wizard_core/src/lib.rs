//! Wizard core: pure navigation state machine, transition animator and
//! view-model helpers. Nothing in here spawns threads or performs I/O.
mod config;
mod effect;
mod error;
mod msg;
mod observer;
mod state;
mod transition;
mod update;
mod view_model;

pub use config::{thumbnail_url, WizardConfig, DEFAULT_THUMBNAIL_URL_TEMPLATE};
pub use effect::Effect;
pub use error::{Intent, NavError};
pub use msg::Msg;
pub use observer::{notify_changes, WizardObserver};
pub use state::{AppState, Item, ItemId, Step, Thumbnail, ThumbnailUpdate};
pub use transition::{
    ease_in_out, slide_offsets, Direction, PagePlacement, TransitionAnimator, TransitionFrame,
    TransitionHandle, TransitionSettings, TransitionState,
};
pub use update::update;
pub use view_model::{ButtonState, CardView, WizardView, FINAL_TEXT_DEFAULT};
