use std::fmt;

use crate::{ItemId, Step};

/// Navigation intents, used to describe rejected requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Next,
    Back,
    Select,
    Choose,
    SubmitDownload,
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intent::Next => write!(f, "next"),
            Intent::Back => write!(f, "back"),
            Intent::Select => write!(f, "select"),
            Intent::Choose => write!(f, "choose"),
            Intent::SubmitDownload => write!(f, "submit download"),
        }
    }
}

/// A navigation rule was violated. The request is dropped and the state
/// machine is left as it was; the error is kept for display only.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavError {
    #[error("invalid operation: no selection")]
    NoSelection,
    #[error("invalid operation: {intent} is not available on the {step:?} page")]
    NotAvailable { step: Step, intent: Intent },
    #[error("invalid operation: unknown item {0}")]
    UnknownItem(ItemId),
    /// Unreachable through the enabled affordances; seeing it is a defect.
    #[error("invalid operation: job already running")]
    JobAlreadyRunning,
}
