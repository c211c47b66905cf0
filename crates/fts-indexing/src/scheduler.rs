//! Idle-tick schedulers.
//!
//! The controller never runs its own loop. It hands a [`Tick`] to a
//! [`Scheduler`], which calls it repeatedly while the host is idle until the
//! tick returns `false`.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use tracing::trace;

/// Callback invoked once per idle slot. Returns `true` to be called again.
pub type Tick = Box<dyn FnMut() -> bool>;

/// Host-side cooperative scheduler.
pub trait Scheduler {
    /// Register a tick. It stays registered until it returns `false`.
    fn schedule(&self, tick: Tick);
}

/// Scheduler driven explicitly by the caller, one tick at a time.
///
/// Used by tests and by hosts that have their own notion of "idle".
#[derive(Default)]
pub struct ManualScheduler {
    ticks: RefCell<VecDeque<Tick>>,
    scheduled: Cell<usize>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the oldest registered tick once.
    ///
    /// Returns `false` when nothing was registered.
    pub fn run_tick(&self) -> bool {
        // Release the borrow before calling: the tick may schedule again.
        let Some(mut tick) = self.ticks.borrow_mut().pop_front() else {
            return false;
        };
        if tick() {
            self.ticks.borrow_mut().push_back(tick);
        }
        true
    }

    /// Run ticks until none remain registered. Returns how many ran.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        while self.run_tick() {
            ran += 1;
        }
        trace!(ticks = ran, "Manual scheduler idle");
        ran
    }

    /// Number of ticks currently registered.
    pub fn pending_ticks(&self) -> usize {
        self.ticks.borrow().len()
    }

    /// Total number of [`Scheduler::schedule`] calls so far.
    pub fn scheduled_count(&self) -> usize {
        self.scheduled.get()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, tick: Tick) {
        self.scheduled.set(self.scheduled.get() + 1);
        self.ticks.borrow_mut().push_back(tick);
    }
}

/// Scheduler backed by the tokio current-thread runtime.
///
/// Each tick becomes a local task that yields back to the runtime between
/// calls, so other work on the thread interleaves with indexing. Must be
/// used from inside a [`tokio::task::LocalSet`].
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalScheduler;

impl LocalScheduler {
    pub fn new() -> Self {
        Self
    }
}

impl Scheduler for LocalScheduler {
    fn schedule(&self, mut tick: Tick) {
        tokio::task::spawn_local(async move {
            while tick() {
                tokio::task::yield_now().await;
            }
        });
    }
}
