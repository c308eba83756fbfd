//! Wizard engine: the worker domain. Runs the background job and the
//! thumbnail downloads off the interactive thread and reports back through a
//! single event channel.
mod config;
mod coordinator;
mod download;
mod engine;
mod fetch;
mod job;
mod types;

pub use config::{DownloadSettings, EngineConfig, FetchSettings, JobSettings};
pub use coordinator::{DownloadCoordinator, DownloadHandle};
pub use engine::{EngineEvents, EngineHandle};
pub use fetch::{ChunkSink, Fetcher, ReqwestFetcher};
pub use job::{simulated_results, BackgroundJob};
pub use types::{
    DownloadId, DownloadState, EngineError, EngineEvent, FailureKind, FetchError, JobError,
    JobItem, SubmitError,
};
