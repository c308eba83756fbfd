use crate::{Item, NavError, Step, Thumbnail};

pub const FINAL_TEXT_DEFAULT: &str = "Process Complete!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonState {
    #[default]
    Hidden,
    Disabled,
    Enabled,
}

impl ButtonState {
    pub fn is_enabled(self) -> bool {
        self == ButtonState::Enabled
    }

    pub fn is_visible(self) -> bool {
        self != ButtonState::Hidden
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WizardView {
    pub step: Step,
    pub back: ButtonState,
    pub next: ButtonState,
    pub cards: Vec<CardView>,
    pub selection: Option<Item>,
    pub final_text: String,
    pub busy: bool,
    pub last_error: Option<NavError>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    pub item: Item,
    pub selected: bool,
    pub thumbnail: Thumbnail,
}

pub(crate) fn final_text(chosen: Option<&Item>) -> String {
    match chosen {
        Some(item) => format!("You chose:\n{}", item.name),
        None => FINAL_TEXT_DEFAULT.to_string(),
    }
}
