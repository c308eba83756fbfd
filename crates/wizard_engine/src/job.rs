use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use wizard_logging::{wizard_debug, wizard_info, wizard_warn};

use crate::{EngineEvent, JobError, JobItem, JobSettings};

/// The fixed result set the simulated job produces, in order.
pub fn simulated_results() -> Vec<JobItem> {
    ["Project Alpha", "Project Beta", "Project Gamma", "Project Delta"]
        .into_iter()
        .zip(1..)
        .map(|(name, id)| JobItem {
            id,
            name: name.to_string(),
        })
        .collect()
}

struct JobWorker {
    thread: JoinHandle<()>,
    stop_tx: mpsc::Sender<()>,
    /// Disconnects when the thread exits, panics included.
    done_rx: mpsc::Receiver<()>,
}

/// Simulated long-running work on its own thread. Completion is posted as
/// [`EngineEvent::JobFinished`]; a stopped job posts nothing.
pub struct BackgroundJob {
    settings: JobSettings,
    worker: Option<JobWorker>,
}

impl BackgroundJob {
    pub fn new(settings: JobSettings) -> Self {
        Self {
            settings,
            worker: None,
        }
    }

    pub fn start(&mut self, events: mpsc::Sender<EngineEvent>) -> Result<(), JobError> {
        if self.is_running() {
            return Err(JobError::AlreadyRunning);
        }
        if let Some(finished) = self.worker.take() {
            let _ = finished.thread.join();
        }

        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let (done_tx, done_rx) = mpsc::channel::<()>();
        let work = self.settings.work_duration;
        let thread = thread::Builder::new()
            .name("background-job".to_string())
            .spawn(move || {
                let _done = done_tx;
                run(work, stop_rx, events);
            })?;
        wizard_info!("background job started ({:?})", work);

        self.worker = Some(JobWorker {
            thread,
            stop_tx,
            done_rx,
        });
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| !worker.thread.is_finished())
    }

    /// Asks the job to stop and waits up to `timeout` for its thread. Returns
    /// false when the thread had to be left behind.
    pub fn stop_and_join(&mut self, timeout: Duration) -> bool {
        let Some(worker) = self.worker.take() else {
            return true;
        };
        let _ = worker.stop_tx.send(());

        match worker.done_rx.recv_timeout(timeout) {
            Err(RecvTimeoutError::Timeout) => {
                wizard_warn!("background job did not stop within {:?}; detaching", timeout);
                false
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                let _ = worker.thread.join();
                true
            }
        }
    }
}

impl Drop for BackgroundJob {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.stop_tx.send(());
        }
    }
}

fn run(work: Duration, stop_rx: mpsc::Receiver<()>, events: mpsc::Sender<EngineEvent>) {
    match stop_rx.recv_timeout(work) {
        Err(RecvTimeoutError::Timeout) => {
            let items = simulated_results();
            wizard_info!("background job finished with {} items", items.len());
            let _ = events.send(EngineEvent::JobFinished { items });
        }
        Ok(()) | Err(RecvTimeoutError::Disconnected) => {
            wizard_debug!("background job stopped before completion");
        }
    }
}
