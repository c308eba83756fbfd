use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use wizard_core::{Item, ItemId, Msg, ThumbnailUpdate};
use wizard_engine::{
    DownloadHandle, DownloadId, DownloadState, EngineConfig, EngineError, EngineEvent,
    EngineEvents, EngineHandle, JobItem,
};
use wizard_logging::{wizard_debug, wizard_info, wizard_warn};

/// Which download currently backs which card.
#[derive(Default)]
struct DownloadMap {
    by_item: HashMap<ItemId, DownloadHandle>,
    by_id: HashMap<DownloadId, ItemId>,
}

impl DownloadMap {
    fn insert(&mut self, item_id: ItemId, handle: DownloadHandle) {
        self.by_id.insert(handle.id(), item_id);
        self.by_item.insert(item_id, handle);
    }

    /// Resolves a download to its card. Terminal states release the mapping.
    /// Only the card's current download resolves; outcomes of a download the
    /// card has since replaced are dropped.
    fn resolve(&mut self, id: DownloadId, state: &DownloadState) -> Option<ItemId> {
        let item_id = *self.by_id.get(&id)?;
        if state.is_terminal() {
            self.by_id.remove(&id);
        }
        let current = self
            .by_item
            .get(&item_id)
            .is_some_and(|handle| handle.id() == id);
        if !current {
            wizard_debug!("dropping outcome of replaced download {} (item {})", id, item_id);
            return None;
        }
        if state.is_terminal() {
            self.by_item.remove(&item_id);
        }
        Some(item_id)
    }
}

type SharedDownloads = Arc<Mutex<DownloadMap>>;

fn lock(downloads: &SharedDownloads) -> MutexGuard<'_, DownloadMap> {
    downloads.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Executes engine-bound effects on the interactive thread and forwards
/// engine events back as core messages.
pub struct EffectRunner {
    engine: EngineHandle,
    downloads: SharedDownloads,
    msg_tx: mpsc::Sender<Msg>,
    stop: Arc<AtomicBool>,
    forwarder: Option<JoinHandle<()>>,
}

impl EffectRunner {
    pub fn new(config: EngineConfig, msg_tx: mpsc::Sender<Msg>) -> Result<Self, EngineError> {
        let (engine, events) = EngineHandle::new(config)?;
        let downloads = SharedDownloads::default();
        let stop = Arc::new(AtomicBool::new(false));
        let forwarder = spawn_event_loop(events, downloads.clone(), msg_tx.clone(), stop.clone());
        Ok(Self {
            engine,
            downloads,
            msg_tx,
            stop,
            forwarder: Some(forwarder),
        })
    }

    pub fn start_job(&mut self) {
        if let Err(err) = self.engine.start_job() {
            wizard_warn!("StartJob ignored: {}", err);
        }
    }

    pub fn submit_download(&self, item_id: ItemId, url: String) {
        wizard_debug!("SubmitDownload item={} url={}", item_id, url);
        // Map before the first event can be forwarded.
        let mut downloads = lock(&self.downloads);
        match self.engine.submit(url) {
            Ok(handle) => downloads.insert(item_id, handle),
            Err(err) => {
                drop(downloads);
                let _ = self.msg_tx.send(Msg::ThumbnailChanged {
                    item_id,
                    update: ThumbnailUpdate::Failed(err.to_string()),
                });
            }
        }
    }

    pub fn abort_download(&self, item_id: ItemId) {
        let handle = lock(&self.downloads).by_item.get(&item_id).cloned();
        match handle {
            Some(handle) => self.engine.abort(&handle),
            None => wizard_debug!("AbortDownload item={} has no download", item_id),
        }
    }

    pub fn abort_all_downloads(&self) {
        let count = self.engine.abort_all();
        wizard_info!("AbortAllDownloads: {} in flight", count);
    }

    /// Ordered teardown of the worker domain, then the forwarding thread.
    pub fn shutdown(&mut self) {
        self.engine.shutdown();
        self.stop.store(true, Ordering::SeqCst);
        if let Some(forwarder) = self.forwarder.take() {
            let _ = forwarder.join();
        }
    }
}

impl Drop for EffectRunner {
    fn drop(&mut self) {
        if self.forwarder.is_some() {
            self.shutdown();
        }
    }
}

fn spawn_event_loop(
    events: EngineEvents,
    downloads: SharedDownloads,
    msg_tx: mpsc::Sender<Msg>,
    stop: Arc<AtomicBool>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        while !stop.load(Ordering::SeqCst) {
            let Some(event) = events.recv_timeout(Duration::from_millis(50)) else {
                continue;
            };
            let msg = match event {
                EngineEvent::JobFinished { items } => Some(Msg::JobFinished {
                    items: items.into_iter().map(map_item).collect(),
                }),
                EngineEvent::DownloadChanged { id, state } => {
                    let item_id = lock(&downloads).resolve(id, &state);
                    item_id.map(|item_id| Msg::ThumbnailChanged {
                        item_id,
                        update: map_download_state(state),
                    })
                }
            };
            if let Some(msg) = msg {
                if msg_tx.send(msg).is_err() {
                    break;
                }
            }
        }
    })
}

fn map_item(item: JobItem) -> Item {
    Item::new(item.id, item.name)
}

fn map_download_state(state: DownloadState) -> ThumbnailUpdate {
    match state {
        DownloadState::Pending | DownloadState::Running => ThumbnailUpdate::Loading,
        DownloadState::Succeeded(bytes) => ThumbnailUpdate::Loaded(bytes.to_vec()),
        DownloadState::Failed(err) => ThumbnailUpdate::Failed(err.to_string()),
        DownloadState::Aborted => ThumbnailUpdate::Aborted,
    }
}
