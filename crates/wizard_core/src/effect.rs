use crate::{Direction, ItemId, Step};

/// Side effects requested by [`crate::update`]; the host executes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Launch the background job on the worker domain.
    StartJob,
    /// Play the slide between two pages. The step has already changed.
    AnimateTransition {
        from: Step,
        to: Step,
        direction: Direction,
    },
    SubmitDownload { item_id: ItemId, url: String },
    AbortDownload { item_id: ItemId },
    /// Drop every thumbnail download, keeping the transport open.
    AbortAllDownloads,
    /// Ordered teardown of the worker domain.
    Shutdown,
}
