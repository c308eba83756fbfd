use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex, MutexGuard, PoisonError};

use futures_util::FutureExt;
use tokio::runtime::Runtime;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use wizard_logging::{wizard_debug, wizard_error, wizard_info, wizard_warn};

use crate::download::{self, TaskOutcome};
use crate::{
    DownloadId, DownloadSettings, DownloadState, EngineError, EngineEvent, FailureKind,
    FetchError, Fetcher, SubmitError,
};

/// Shared view of one submitted download. Cloning is cheap; every clone
/// observes the same state.
#[derive(Debug, Clone)]
pub struct DownloadHandle {
    inner: Arc<HandleInner>,
}

#[derive(Debug)]
struct HandleInner {
    id: DownloadId,
    url: String,
    state: Mutex<DownloadState>,
    cancel: CancellationToken,
}

impl DownloadHandle {
    fn new(id: DownloadId, url: String) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                id,
                url,
                state: Mutex::new(DownloadState::Pending),
                cancel: CancellationToken::new(),
            }),
        }
    }

    pub fn id(&self) -> DownloadId {
        self.inner.id
    }

    pub fn url(&self) -> &str {
        &self.inner.url
    }

    pub fn state(&self) -> DownloadState {
        self.lock_state().clone()
    }

    pub fn is_terminal(&self) -> bool {
        self.lock_state().is_terminal()
    }

    fn lock_state(&self) -> MutexGuard<'_, DownloadState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Raises the abort flag under the state lock, so a success racing with
    /// the abort cannot land after it.
    fn request_abort(&self) {
        let _state = self.lock_state();
        self.inner.cancel.cancel();
    }

    /// Applies `next` if the lifecycle allows it and returns what was stored.
    fn advance(&self, next: DownloadState) -> Option<DownloadState> {
        let mut state = self.lock_state();
        let next = match next {
            DownloadState::Succeeded(_) if self.inner.cancel.is_cancelled() => {
                DownloadState::Aborted
            }
            other => other,
        };
        if !state.can_advance_to(&next) {
            return None;
        }
        *state = next.clone();
        Some(next)
    }
}

struct Tracked {
    handle: DownloadHandle,
    task: JoinHandle<()>,
}

struct Shared {
    fetcher: Arc<dyn Fetcher>,
    limiter: Arc<Semaphore>,
    settings: DownloadSettings,
    tracked: Mutex<HashMap<DownloadId, Tracked>>,
    accepting: AtomicBool,
    events: mpsc::Sender<EngineEvent>,
}

impl Shared {
    fn lock_tracked(&self) -> MutexGuard<'_, HashMap<DownloadId, Tracked>> {
        self.tracked.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn transition(&self, handle: &DownloadHandle, next: DownloadState) -> bool {
        match handle.advance(next) {
            Some(state) => {
                let _ = self.events.send(EngineEvent::DownloadChanged {
                    id: handle.id(),
                    state,
                });
                true
            }
            None => false,
        }
    }

    fn finish(&self, handle: &DownloadHandle, next: DownloadState) {
        if self.transition(handle, next) {
            match handle.state() {
                DownloadState::Succeeded(bytes) => {
                    wizard_info!("download {} finished ({} bytes)", handle.id(), bytes.len());
                }
                DownloadState::Failed(err) => {
                    wizard_warn!("download {} failed: {} ({})", handle.id(), err, handle.url());
                }
                DownloadState::Aborted => wizard_debug!("download {} aborted", handle.id()),
                DownloadState::Pending | DownloadState::Running => {}
            }
        }
        self.lock_tracked().remove(&handle.id());
    }
}

/// Owns the download worker pool and every download in flight.
///
/// At most `max_concurrency` downloads are Running at once; the rest wait in
/// Pending. State changes are reported as [`EngineEvent::DownloadChanged`] on
/// the channel given at construction, in no particular order across handles.
pub struct DownloadCoordinator {
    runtime: Option<Runtime>,
    shared: Arc<Shared>,
    next_id: AtomicU64,
}

impl DownloadCoordinator {
    pub fn new(
        settings: DownloadSettings,
        fetcher: Arc<dyn Fetcher>,
        events: mpsc::Sender<EngineEvent>,
    ) -> Result<Self, EngineError> {
        let slots = settings.max_concurrency.max(1);
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(slots)
            .thread_name("download-pool")
            .enable_all()
            .build()?;

        Ok(Self {
            runtime: Some(runtime),
            shared: Arc::new(Shared {
                fetcher,
                limiter: Arc::new(Semaphore::new(slots)),
                settings,
                tracked: Mutex::new(HashMap::new()),
                accepting: AtomicBool::new(true),
                events,
            }),
            next_id: AtomicU64::new(1),
        })
    }

    /// Queues a download. It starts Running as soon as a pool slot is free.
    pub fn submit(&self, url: impl Into<String>) -> Result<DownloadHandle, SubmitError> {
        if !self.shared.accepting.load(Ordering::SeqCst) {
            return Err(SubmitError::ShutDown);
        }
        let runtime = self.runtime.as_ref().ok_or(SubmitError::ShutDown)?;

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let handle = DownloadHandle::new(id, url.into());
        wizard_debug!("download {} submitted: {}", id, handle.url());
        let _ = self.shared.events.send(EngineEvent::DownloadChanged {
            id,
            state: DownloadState::Pending,
        });

        // Hold the lock across spawn so the task cannot untrack itself first.
        let mut tracked = self.shared.lock_tracked();
        let task = runtime.spawn(run_task(self.shared.clone(), handle.clone()));
        tracked.insert(
            id,
            Tracked {
                handle: handle.clone(),
                task,
            },
        );
        Ok(handle)
    }

    /// Asks one download to stop. A handle that already left tracking is
    /// ignored, so aborting twice is harmless.
    pub fn abort(&self, handle: &DownloadHandle) {
        let tracked = self.shared.lock_tracked().contains_key(&handle.id());
        if tracked {
            handle.request_abort();
        } else {
            wizard_debug!("abort ignored for untracked download {}", handle.id());
        }
    }

    /// Aborts every tracked download and returns how many were asked to stop.
    /// The transport stays open.
    pub fn abort_all(&self) -> usize {
        let tracked = self.shared.lock_tracked();
        for entry in tracked.values() {
            entry.handle.request_abort();
        }
        tracked.len()
    }

    /// Number of downloads that have not finished yet.
    pub fn in_flight(&self) -> usize {
        self.shared.lock_tracked().len()
    }

    pub fn is_accepting(&self) -> bool {
        self.shared.accepting.load(Ordering::SeqCst)
    }

    /// Stops accepting work, aborts everything outstanding, closes the
    /// transport and waits (bounded by `drain_timeout`) for the pool to drain.
    /// Every handle is terminal when this returns.
    ///
    /// Call from the interactive thread, never from inside an async context.
    pub fn shutdown_all(&self) {
        if self.shared.accepting.swap(false, Ordering::SeqCst) {
            wizard_info!("download coordinator shutting down");
        }

        let drained: Vec<Tracked> = self
            .shared
            .lock_tracked()
            .drain()
            .map(|(_, entry)| entry)
            .collect();
        for entry in &drained {
            entry.handle.request_abort();
        }
        self.shared.fetcher.close();

        let (handles, tasks): (Vec<_>, Vec<_>) = drained
            .into_iter()
            .map(|entry| (entry.handle, entry.task))
            .unzip();
        if tasks.is_empty() {
            return;
        }

        let timeout = self.shared.settings.drain_timeout;
        let drained_in_time = match (&self.runtime, tokio::runtime::Handle::try_current()) {
            // The timer must be created inside the runtime; it needs its reactor.
            (Some(runtime), Err(_)) => runtime
                .block_on(async {
                    tokio::time::timeout(timeout, futures_util::future::join_all(tasks)).await
                })
                .is_ok(),
            _ => false,
        };
        if drained_in_time {
            wizard_info!("download pool drained ({} tasks)", handles.len());
        } else {
            wizard_warn!("download pool did not drain within {:?}", timeout);
        }

        for handle in &handles {
            self.shared.transition(handle, DownloadState::Aborted);
        }
    }
}

impl Drop for DownloadCoordinator {
    fn drop(&mut self) {
        if self.is_accepting() {
            self.shutdown_all();
        }
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

async fn run_task(shared: Arc<Shared>, handle: DownloadHandle) {
    let cancel = handle.inner.cancel.clone();

    let permit = tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        permit = shared.limiter.clone().acquire_owned() => permit.ok(),
    };
    let Some(permit) = permit else {
        shared.finish(&handle, DownloadState::Aborted);
        return;
    };
    if !shared.transition(&handle, DownloadState::Running) {
        shared.finish(&handle, DownloadState::Aborted);
        return;
    }

    let fetcher = shared.fetcher.clone();
    let task = download::execute(fetcher.as_ref(), handle.url(), &cancel, &shared.settings);
    let outcome = AssertUnwindSafe(task)
        .catch_unwind()
        .await
        .unwrap_or_else(|panic| {
            let message = panic_message(panic.as_ref());
            wizard_error!("download {} panicked: {}", handle.id(), message);
            TaskOutcome::Failed(FetchError::new(FailureKind::Unexpected, message))
        });
    drop(permit);

    let next = match outcome {
        TaskOutcome::Completed(bytes) => DownloadState::Succeeded(bytes),
        TaskOutcome::Failed(_) if cancel.is_cancelled() => DownloadState::Aborted,
        TaskOutcome::Failed(err) => DownloadState::Failed(err),
        TaskOutcome::Aborted => DownloadState::Aborted,
    };
    shared.finish(&handle, next);
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "task panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn success_after_abort_lands_as_aborted() {
        let handle = DownloadHandle::new(1, "https://thumbs.test/1".to_string());
        assert_eq!(handle.advance(DownloadState::Running), Some(DownloadState::Running));

        handle.request_abort();
        let stored = handle.advance(DownloadState::Succeeded(Bytes::from_static(b"late")));

        assert_eq!(stored, Some(DownloadState::Aborted));
        assert_eq!(handle.state(), DownloadState::Aborted);
    }

    #[test]
    fn terminal_state_is_final() {
        let handle = DownloadHandle::new(2, "https://thumbs.test/2".to_string());
        assert_eq!(handle.advance(DownloadState::Aborted), Some(DownloadState::Aborted));
        assert_eq!(handle.advance(DownloadState::Running), None);
        assert!(handle.is_terminal());
    }

    #[test]
    fn panic_payloads_are_readable() {
        let text: Box<dyn Any + Send> = Box::new("static text");
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned text"));
        let other: Box<dyn Any + Send> = Box::new(7_u8);

        assert_eq!(panic_message(text.as_ref()), "static text");
        assert_eq!(panic_message(owned.as_ref()), "owned text");
        assert_eq!(panic_message(other.as_ref()), "task panicked");
    }
}
