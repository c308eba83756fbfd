use crate::{Item, ItemId, ThumbnailUpdate};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User clicked Next.
    NextClicked,
    /// User clicked Back.
    BackClicked,
    /// User clicked a card on the results page.
    CardSelected { item_id: ItemId },
    /// User double-clicked a card: select it and move on.
    CardChosen { item_id: ItemId },
    /// Background job delivered its result set.
    JobFinished { items: Vec<Item> },
    /// A card became visible and wants its thumbnail.
    ThumbnailRequested { item_id: ItemId },
    /// A card went away before its thumbnail arrived.
    ThumbnailDismissed { item_id: ItemId },
    /// Download progress for a card's thumbnail.
    ThumbnailChanged {
        item_id: ItemId,
        update: ThumbnailUpdate,
    },
    /// The window is closing.
    CloseRequested,
    /// Frame tick from the host loop.
    Tick,
}
