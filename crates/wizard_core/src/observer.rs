use crate::{Item, ItemId, Step, Thumbnail, WizardView};

/// Callbacks into the rendering layer. The core drives these; the renderer
/// talks back only through [`crate::Msg`] intents.
pub trait WizardObserver {
    fn on_step_changed(&mut self, step: Step);
    fn on_selection_changed(&mut self, selection: Option<&Item>);
    fn on_transition_frame(&mut self, progress: f32, from_offset: f32, to_offset: f32);
    fn on_download_state_changed(&mut self, item_id: ItemId, thumbnail: &Thumbnail);
}

/// Reports every observable difference between two views, in a fixed order:
/// step, selection, then thumbnails in card order.
pub fn notify_changes(prev: &WizardView, next: &WizardView, observer: &mut dyn WizardObserver) {
    if prev.step != next.step {
        observer.on_step_changed(next.step);
    }
    if prev.selection != next.selection {
        observer.on_selection_changed(next.selection.as_ref());
    }
    for card in &next.cards {
        let changed = match prev.cards.iter().find(|c| c.item.id == card.item.id) {
            Some(before) => before.thumbnail != card.thumbnail,
            None => card.thumbnail != Thumbnail::Idle,
        };
        if changed {
            observer.on_download_state_changed(card.item.id, &card.thumbnail);
        }
    }
}
