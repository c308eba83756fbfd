//! Slide transition between two wizard pages.
//!
//! The animator only computes placements; the renderer samples it once per
//! frame tick through [`TransitionAnimator::advance`] and draws whatever
//! [`TransitionAnimator::placement`] reports. Nothing here gates the logical
//! step, which has already changed by the time a run starts.

use std::time::Duration;

use crate::Step;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub fn between(from: Step, to: Step) -> Self {
        if to >= from {
            Direction::Forward
        } else {
            Direction::Backward
        }
    }

    fn sign(self) -> f32 {
        match self {
            Direction::Forward => 1.0,
            Direction::Backward => -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionSettings {
    pub duration: Duration,
    pub viewport_width: f32,
}

impl Default for TransitionSettings {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(300),
            viewport_width: 500.0,
        }
    }
}

/// Where a page sits relative to the viewport, on the horizontal axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PagePlacement {
    pub visible: bool,
    pub offset: f32,
}

impl PagePlacement {
    pub const HIDDEN: Self = Self {
        visible: false,
        offset: 0.0,
    };
    pub const SHOWN: Self = Self {
        visible: true,
        offset: 0.0,
    };

    pub fn is_mid_offset(&self) -> bool {
        self.offset != 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransitionHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionState {
    pub from: Step,
    pub to: Step,
    pub direction: Direction,
    pub progress: f32,
}

/// One sampled frame: linear progress plus the eased page offsets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionFrame {
    pub progress: f32,
    pub from_offset: f32,
    pub to_offset: f32,
}

#[derive(Debug)]
struct ActiveRun {
    handle: TransitionHandle,
    state: TransitionState,
    elapsed: Duration,
}

#[derive(Debug)]
pub struct TransitionAnimator {
    settings: TransitionSettings,
    pages: [PagePlacement; Step::COUNT],
    active: Option<ActiveRun>,
    next_handle: u64,
}

impl TransitionAnimator {
    pub fn new(settings: TransitionSettings, current: Step) -> Self {
        let mut pages = [PagePlacement::HIDDEN; Step::COUNT];
        pages[current.index()] = PagePlacement::SHOWN;
        Self {
            settings,
            pages,
            active: None,
            next_handle: 1,
        }
    }

    /// Starts a slide from `from` to `to`. A run still in progress is stopped
    /// where it is: its outgoing page is hidden and reset before the new run
    /// positions its own pages.
    pub fn run(&mut self, from: Step, to: Step, direction: Direction) -> TransitionHandle {
        if let Some(previous) = self.active.take() {
            let old = previous.state;
            self.pages[old.from.index()] = PagePlacement::HIDDEN;
            if old.to != from && old.to != to {
                self.pages[old.to.index()] = PagePlacement::HIDDEN;
            }
        }

        let handle = TransitionHandle(self.next_handle);
        self.next_handle += 1;

        if from == to {
            self.pages[to.index()] = PagePlacement::SHOWN;
            return handle;
        }

        let (from_offset, to_offset) = slide_offsets(direction, self.settings.viewport_width, 0.0);
        self.pages[from.index()] = PagePlacement {
            visible: true,
            offset: from_offset,
        };
        self.pages[to.index()] = PagePlacement {
            visible: true,
            offset: to_offset,
        };
        self.active = Some(ActiveRun {
            handle,
            state: TransitionState {
                from,
                to,
                direction,
                progress: 0.0,
            },
            elapsed: Duration::ZERO,
        });

        if self.settings.duration.is_zero() {
            self.advance(Duration::ZERO);
        }
        handle
    }

    /// Moves the active run forward by `dt` and returns the sampled frame.
    /// The final frame of a run also settles it.
    pub fn advance(&mut self, dt: Duration) -> Option<TransitionFrame> {
        let width = self.settings.viewport_width;
        let duration = self.settings.duration;
        let run = self.active.as_mut()?;

        run.elapsed += dt;
        let progress = if duration.is_zero() {
            1.0
        } else {
            (run.elapsed.as_secs_f32() / duration.as_secs_f32()).min(1.0)
        };
        run.state.progress = progress;

        let eased = ease_in_out(progress);
        let (from_offset, to_offset) = slide_offsets(run.state.direction, width, eased);
        let (from, to) = (run.state.from, run.state.to);
        self.pages[from.index()].offset = from_offset;
        self.pages[to.index()].offset = to_offset;

        if progress >= 1.0 {
            self.active = None;
            self.pages[from.index()] = PagePlacement::HIDDEN;
            self.pages[to.index()] = PagePlacement::SHOWN;
        }

        Some(TransitionFrame {
            progress,
            from_offset,
            to_offset,
        })
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn is_running(&self, handle: TransitionHandle) -> bool {
        self.active.as_ref().is_some_and(|run| run.handle == handle)
    }

    pub fn current(&self) -> Option<TransitionState> {
        self.active.as_ref().map(|run| run.state)
    }

    pub fn placement(&self, step: Step) -> PagePlacement {
        self.pages[step.index()]
    }
}

/// Ease-in-ease-out (quadratic) over `t` in `[0, 1]`.
pub fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

/// Offsets of the outgoing and incoming pages at eased progress `eased`.
/// Forward slides the outgoing page from 0 to +width while the incoming page
/// comes in from -width; Backward mirrors both.
pub fn slide_offsets(direction: Direction, width: f32, eased: f32) -> (f32, f32) {
    let sign = direction.sign();
    let outgoing = sign * width * eased;
    let incoming = -sign * width * (1.0 - eased);
    (outgoing, incoming)
}
