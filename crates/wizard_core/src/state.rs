use std::collections::BTreeMap;

use crate::config::thumbnail_url;
use crate::view_model::{final_text, ButtonState, CardView, WizardView};
use crate::{NavError, WizardConfig};

pub type ItemId = u32;

/// Wizard pages in navigation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Step {
    #[default]
    Welcome,
    Processing,
    Results,
    Final,
}

impl Step {
    pub const COUNT: usize = 4;
    pub const ALL: [Step; Step::COUNT] =
        [Step::Welcome, Step::Processing, Step::Results, Step::Final];

    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
}

impl Item {
    pub fn new(id: ItemId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// What a card currently shows in its thumbnail slot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Thumbnail {
    #[default]
    Idle,
    Loading,
    Loaded(Vec<u8>),
    Failed(String),
}

impl Thumbnail {
    pub fn is_outstanding(&self) -> bool {
        matches!(self, Thumbnail::Loading)
    }
}

/// Download outcome as reported back from the worker domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThumbnailUpdate {
    Loading,
    Loaded(Vec<u8>),
    Failed(String),
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    thumbnail_url_template: String,
    step: Step,
    results: Vec<Item>,
    selection: Option<ItemId>,
    chosen: Option<Item>,
    thumbnails: BTreeMap<ItemId, Thumbnail>,
    job_running: bool,
    closing: bool,
    last_error: Option<NavError>,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_config(&WizardConfig::default())
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &WizardConfig) -> Self {
        Self {
            thumbnail_url_template: config.thumbnail_url_template.clone(),
            step: Step::Welcome,
            results: Vec::new(),
            selection: None,
            chosen: None,
            thumbnails: BTreeMap::new(),
            job_running: false,
            closing: false,
            last_error: None,
            dirty: false,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn results(&self) -> &[Item] {
        &self.results
    }

    pub fn selection(&self) -> Option<&Item> {
        self.selection.and_then(|id| self.item(id))
    }

    pub fn chosen(&self) -> Option<&Item> {
        self.chosen.as_ref()
    }

    pub fn thumbnail(&self, item_id: ItemId) -> Option<&Thumbnail> {
        self.thumbnails.get(&item_id)
    }

    pub fn is_job_running(&self) -> bool {
        self.job_running
    }

    pub fn is_closing(&self) -> bool {
        self.closing
    }

    pub fn last_error(&self) -> Option<&NavError> {
        self.last_error.as_ref()
    }

    /// Returns whether anything changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn view(&self) -> WizardView {
        let (back, next) = self.buttons();
        WizardView {
            step: self.step,
            back,
            next,
            cards: self
                .results
                .iter()
                .map(|item| CardView {
                    item: item.clone(),
                    selected: self.selection == Some(item.id),
                    thumbnail: self.thumbnails.get(&item.id).cloned().unwrap_or_default(),
                })
                .collect(),
            selection: self.selection().cloned(),
            final_text: final_text(self.chosen.as_ref()),
            busy: self.job_running,
            last_error: self.last_error.clone(),
            dirty: self.dirty,
        }
    }

    fn buttons(&self) -> (ButtonState, ButtonState) {
        match self.step {
            Step::Welcome => (ButtonState::Hidden, ButtonState::Enabled),
            Step::Processing => (ButtonState::Hidden, ButtonState::Hidden),
            Step::Results => {
                let next = if self.selection.is_some() {
                    ButtonState::Enabled
                } else {
                    ButtonState::Disabled
                };
                (ButtonState::Enabled, next)
            }
            Step::Final => (ButtonState::Enabled, ButtonState::Hidden),
        }
    }

    pub(crate) fn item(&self, item_id: ItemId) -> Option<&Item> {
        self.results.iter().find(|item| item.id == item_id)
    }

    pub(crate) fn thumbnail_url(&self, item_id: ItemId) -> Option<String> {
        thumbnail_url(&self.thumbnail_url_template, item_id)
    }

    /// Moves the cursor. The selection never survives leaving Results.
    pub(crate) fn move_to(&mut self, step: Step) {
        self.step = step;
        if step != Step::Results {
            self.selection = None;
        }
        self.last_error = None;
        self.dirty = true;
    }

    pub(crate) fn begin_job(&mut self) {
        self.job_running = true;
        self.dirty = true;
    }

    /// Replaces the result set; every card starts without a thumbnail.
    pub(crate) fn store_results(&mut self, items: Vec<Item>) {
        self.job_running = false;
        self.selection = None;
        self.thumbnails = items.iter().map(|item| (item.id, Thumbnail::Idle)).collect();
        self.results = items;
        self.dirty = true;
    }

    pub(crate) fn select(&mut self, item_id: ItemId) -> Result<(), NavError> {
        if self.item(item_id).is_none() {
            return Err(NavError::UnknownItem(item_id));
        }
        if self.selection != Some(item_id) {
            self.selection = Some(item_id);
            self.dirty = true;
        }
        self.last_error = None;
        Ok(())
    }

    pub(crate) fn clear_selection(&mut self) {
        if self.selection.take().is_some() {
            self.dirty = true;
        }
    }

    pub(crate) fn record_choice(&mut self, item: Item) {
        self.chosen = Some(item);
        self.dirty = true;
    }

    pub(crate) fn clear_choice(&mut self) {
        if self.chosen.take().is_some() {
            self.dirty = true;
        }
    }

    /// Forgets every thumbnail download; cards fall back to Idle.
    pub(crate) fn reset_thumbnails(&mut self) {
        for thumb in self.thumbnails.values_mut() {
            *thumb = Thumbnail::Idle;
        }
        self.dirty = true;
    }

    pub(crate) fn set_thumbnail(&mut self, item_id: ItemId, thumbnail: Thumbnail) {
        if let Some(slot) = self.thumbnails.get_mut(&item_id) {
            if *slot != thumbnail {
                *slot = thumbnail;
                self.dirty = true;
            }
        }
    }

    pub(crate) fn begin_close(&mut self) {
        self.closing = true;
        self.dirty = true;
    }

    pub(crate) fn reject(&mut self, error: NavError) {
        self.last_error = Some(error);
        self.dirty = true;
    }
}
