use std::fmt;
use std::io;

use bytes::Bytes;

pub type DownloadId = u64;

/// One record produced by the background job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobItem {
    pub id: u32,
    pub name: String,
}

/// Lifecycle of one download. Moves forward only:
/// Pending -> Running -> {Succeeded | Failed | Aborted}, where Pending may
/// also end directly in Failed or Aborted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadState {
    Pending,
    Running,
    Succeeded(Bytes),
    Failed(FetchError),
    Aborted,
}

impl DownloadState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DownloadState::Succeeded(_) | DownloadState::Failed(_) | DownloadState::Aborted
        )
    }

    pub(crate) fn can_advance_to(&self, next: &DownloadState) -> bool {
        use DownloadState::*;
        matches!(
            (self, next),
            (Pending, Running)
                | (Pending | Running, Failed(_) | Aborted)
                | (Running, Succeeded(_))
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// A download handle changed state.
    DownloadChanged { id: DownloadId, state: DownloadState },
    /// The background job produced its result set.
    JobFinished { items: Vec<JobItem> },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    /// The shared transport was closed while the request was in flight.
    TransportClosed,
    /// The caller aborted; reported as `Aborted`, never as `Failed`.
    Cancelled,
    Io,
    /// A panic or other surprise inside the task.
    Unexpected,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::TransportClosed => write!(f, "transport closed"),
            FailureKind::Cancelled => write!(f, "cancelled"),
            FailureKind::Io => write!(f, "io error"),
            FailureKind::Unexpected => write!(f, "unexpected error"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("job already running")]
    AlreadyRunning,
    #[error("failed to spawn job thread: {0}")]
    Spawn(#[from] io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("download coordinator is shut down")]
    ShutDown,
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to start download runtime: {0}")]
    Runtime(#[from] io::Error),
    #[error("failed to build http client: {0}")]
    Client(#[from] FetchError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_only_moves_forward() {
        let ok = Bytes::from_static(b"png");
        let failed = DownloadState::Failed(FetchError::new(FailureKind::Timeout, "slow"));

        assert!(DownloadState::Pending.can_advance_to(&DownloadState::Running));
        assert!(DownloadState::Pending.can_advance_to(&DownloadState::Aborted));
        assert!(DownloadState::Running.can_advance_to(&DownloadState::Succeeded(ok.clone())));
        assert!(DownloadState::Running.can_advance_to(&failed));

        assert!(!DownloadState::Pending.can_advance_to(&DownloadState::Succeeded(ok.clone())));
        assert!(!DownloadState::Aborted.can_advance_to(&DownloadState::Running));
        assert!(!failed.can_advance_to(&DownloadState::Running));
        assert!(!DownloadState::Succeeded(ok).can_advance_to(&DownloadState::Aborted));
        assert!(!DownloadState::Running.can_advance_to(&DownloadState::Running));
    }

    #[test]
    fn fetch_error_display_includes_kind() {
        let err = FetchError::new(FailureKind::HttpStatus(404), "404 Not Found");
        assert_eq!(err.to_string(), "http status 404: 404 Not Found");
    }
}
