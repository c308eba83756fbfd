use std::sync::{mpsc, Arc};
use std::time::Duration;

use wizard_logging::wizard_info;

use crate::{
    BackgroundJob, DownloadCoordinator, DownloadHandle, EngineConfig, EngineError, EngineEvent,
    Fetcher, JobError, ReqwestFetcher, SubmitError,
};

/// Front door to the worker domain. Owned by the interactive thread; every
/// result flows back through the paired [`EngineEvents`].
pub struct EngineHandle {
    config: EngineConfig,
    event_tx: mpsc::Sender<EngineEvent>,
    job: BackgroundJob,
    downloads: DownloadCoordinator,
}

/// Receiving end of the engine's event channel.
pub struct EngineEvents {
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Result<(Self, EngineEvents), EngineError> {
        let fetcher = Arc::new(ReqwestFetcher::new(&config.fetch)?);
        Self::with_fetcher(config, fetcher)
    }

    pub fn with_fetcher(
        config: EngineConfig,
        fetcher: Arc<dyn Fetcher>,
    ) -> Result<(Self, EngineEvents), EngineError> {
        let (event_tx, event_rx) = mpsc::channel();
        let downloads =
            DownloadCoordinator::new(config.downloads.clone(), fetcher, event_tx.clone())?;
        let job = BackgroundJob::new(config.job.clone());
        Ok((
            Self {
                config,
                event_tx,
                job,
                downloads,
            },
            EngineEvents { event_rx },
        ))
    }

    pub fn start_job(&mut self) -> Result<(), JobError> {
        self.job.start(self.event_tx.clone())
    }

    pub fn is_job_running(&self) -> bool {
        self.job.is_running()
    }

    pub fn submit(&self, url: impl Into<String>) -> Result<DownloadHandle, SubmitError> {
        self.downloads.submit(url)
    }

    pub fn abort(&self, handle: &DownloadHandle) {
        self.downloads.abort(handle);
    }

    pub fn abort_all(&self) -> usize {
        self.downloads.abort_all()
    }

    pub fn downloads_in_flight(&self) -> usize {
        self.downloads.in_flight()
    }

    /// Ordered teardown: downloads first (stop accepting, abort, close the
    /// transport, drain), then the job thread. Both waits are bounded.
    pub fn shutdown(&mut self) {
        wizard_info!("engine shutdown: draining downloads");
        self.downloads.shutdown_all();
        wizard_info!("engine shutdown: stopping background job");
        if self.job.stop_and_join(self.config.job.join_timeout) {
            wizard_info!("engine shutdown complete");
        }
    }
}

impl EngineEvents {
    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}
