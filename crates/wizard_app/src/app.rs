use std::io::{self, BufRead, Write};
use std::ops::ControlFlow;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use wizard_core::{
    notify_changes, update, AppState, Effect, ItemId, Msg, Step, Thumbnail, TransitionAnimator,
    WizardConfig, WizardObserver, WizardView,
};
use wizard_engine::EngineConfig;
use wizard_logging::{wizard_info, wizard_warn};

use crate::console::{parse_command, ConsoleObserver, HELP};
use crate::effects::EffectRunner;
use crate::logging::LogDestination;

pub struct AppConfig {
    pub wizard: WizardConfig,
    pub engine: EngineConfig,
    pub tick_interval: Duration,
    pub log_destination: LogDestination,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            wizard: WizardConfig::default(),
            engine: EngineConfig::default(),
            tick_interval: Duration::from_millis(16),
            log_destination: LogDestination::File,
        }
    }
}

/// Where engine-bound effects go.
pub trait EffectSink {
    fn start_job(&mut self);
    fn submit_download(&mut self, item_id: ItemId, url: String);
    fn abort_download(&mut self, item_id: ItemId);
    fn abort_all_downloads(&mut self);
    fn shutdown(&mut self);
}

impl EffectSink for EffectRunner {
    fn start_job(&mut self) {
        EffectRunner::start_job(self);
    }

    fn submit_download(&mut self, item_id: ItemId, url: String) {
        EffectRunner::submit_download(self, item_id, url);
    }

    fn abort_download(&mut self, item_id: ItemId) {
        EffectRunner::abort_download(self, item_id);
    }

    fn abort_all_downloads(&mut self) {
        EffectRunner::abort_all_downloads(self);
    }

    fn shutdown(&mut self) {
        EffectRunner::shutdown(self);
    }
}

pub fn run_app(config: AppConfig) -> anyhow::Result<()> {
    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();

    let mut runner =
        EffectRunner::new(config.engine, msg_tx.clone()).context("failed to start the engine")?;
    let mut wizard = Wizard::new(
        &config.wizard,
        ConsoleObserver::new(io::stdout()),
        msg_tx.clone(),
    );
    wizard.observer.message(HELP);
    wizard.render();

    spawn_ticker(config.tick_interval, msg_tx.clone()).context("failed to start frame ticker")?;
    spawn_input(msg_tx).context("failed to start console input")?;

    while let Ok(msg) = msg_rx.recv() {
        if wizard.dispatch(msg, &mut runner).is_break() {
            break;
        }
    }
    if !wizard.state.is_closing() {
        runner.shutdown();
    }
    wizard_info!("wizard closed");
    Ok(())
}

/// The interactive side: owns the state, the animator and the renderer, and
/// handles one message at a time in arrival order.
pub struct Wizard<W: Write> {
    state: AppState,
    view: WizardView,
    animator: TransitionAnimator,
    observer: ConsoleObserver<W>,
    msg_tx: mpsc::Sender<Msg>,
    last_tick: Instant,
}

impl<W: Write> Wizard<W> {
    pub fn new(
        config: &WizardConfig,
        observer: ConsoleObserver<W>,
        msg_tx: mpsc::Sender<Msg>,
    ) -> Self {
        let state = AppState::with_config(config);
        Self {
            view: state.view(),
            animator: TransitionAnimator::new(config.transition, state.step()),
            state,
            observer,
            msg_tx,
            last_tick: Instant::now(),
        }
    }

    pub fn render(&mut self) {
        self.observer.render(&self.view);
    }

    pub fn dispatch(&mut self, msg: Msg, sink: &mut dyn EffectSink) -> ControlFlow<()> {
        if msg == Msg::Tick {
            self.tick();
        }

        let (mut state, effects) = update(std::mem::take(&mut self.state), msg);
        if state.consume_dirty() {
            let view = state.view();
            notify_changes(&self.view, &view, &mut self.observer);
            for follow_up in card_visibility(&self.view, &view) {
                let _ = self.msg_tx.send(follow_up);
            }
            self.view = view;
            self.render();
        }
        self.state = state;

        let mut flow = ControlFlow::Continue(());
        for effect in effects {
            if self.execute(effect, sink).is_break() {
                flow = ControlFlow::Break(());
            }
        }
        flow
    }

    fn execute(&mut self, effect: Effect, sink: &mut dyn EffectSink) -> ControlFlow<()> {
        match effect {
            Effect::StartJob => sink.start_job(),
            Effect::AnimateTransition {
                from,
                to,
                direction,
            } => {
                self.animator.run(from, to, direction);
                self.last_tick = Instant::now();
            }
            Effect::SubmitDownload { item_id, url } => sink.submit_download(item_id, url),
            Effect::AbortDownload { item_id } => sink.abort_download(item_id),
            Effect::AbortAllDownloads => sink.abort_all_downloads(),
            Effect::Shutdown => {
                wizard_info!("close requested; shutting down");
                sink.shutdown();
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    fn tick(&mut self) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_tick);
        self.last_tick = now;
        if let Some(frame) = self.animator.advance(dt) {
            self.observer
                .on_transition_frame(frame.progress, frame.from_offset, frame.to_offset);
        }
    }
}

/// Cards are shown while the Results page is current. Showing a card asks for
/// its thumbnail; hiding one drops a download still in flight.
fn card_visibility(prev: &WizardView, next: &WizardView) -> Vec<Msg> {
    let was_shown = prev.step == Step::Results;
    let is_shown = next.step == Step::Results;
    if !was_shown && is_shown {
        return next
            .cards
            .iter()
            .map(|card| Msg::ThumbnailRequested {
                item_id: card.item.id,
            })
            .collect();
    }
    if was_shown && !is_shown {
        return next
            .cards
            .iter()
            .filter(|card| card.thumbnail == Thumbnail::Loading)
            .map(|card| Msg::ThumbnailDismissed {
                item_id: card.item.id,
            })
            .collect();
    }
    Vec::new()
}

fn spawn_ticker(interval: Duration, msg_tx: mpsc::Sender<Msg>) -> io::Result<()> {
    thread::Builder::new()
        .name("frame-tick".to_string())
        .spawn(move || {
            while msg_tx.send(Msg::Tick).is_ok() {
                thread::sleep(interval);
            }
        })
        .map(drop)
}

fn spawn_input(msg_tx: mpsc::Sender<Msg>) -> io::Result<()> {
    thread::Builder::new()
        .name("console-input".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else {
                    break;
                };
                match parse_command(&line) {
                    Ok(Some(msg)) => {
                        if msg_tx.send(msg).is_err() {
                            return;
                        }
                    }
                    Ok(None) => {}
                    Err(err) => {
                        wizard_warn!("ignored input: {}", err);
                        eprintln!("{err}\n{HELP}");
                    }
                }
            }
            let _ = msg_tx.send(Msg::CloseRequested);
        })
        .map(drop)
}
