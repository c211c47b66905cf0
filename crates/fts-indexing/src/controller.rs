//! Incremental indexing controller.
//!
//! Owns the task queue and the scheduler state for one index. Work is pushed
//! by [`Controller::run`], [`Controller::index_events`] and
//! [`Controller::delete_events`]; the scheduler applies one task per tick and
//! commits once when the queue drains.
//!
//! Everything runs on the host's thread. Shared state lives in `RefCell` and
//! `Cell`, and borrows never span a call back into the scheduler.

use std::cell::{Cell, Ref, RefCell};
use std::collections::BTreeSet;
use std::rc::{Rc, Weak};

use tracing::{debug, error, info, warn};

use fts_search::{INDEX_VERSION, INDEX_VERSION_KEY};
use fts_types::{Event, EventId, FindEventsQuery};

use crate::engine::IndexEngine;
use crate::error::IndexingError;
use crate::queue::TaskQueue;
use crate::reader::EventReader;
use crate::scheduler::Scheduler;
use crate::stats::ControllerStats;
use crate::task::{IndexChunk, Task, TaskKind, CHUNK_SIZE};

/// Controller tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Events per index chunk. 0 is treated as 1.
    pub chunk_size: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            chunk_size: CHUNK_SIZE,
        }
    }
}

impl ControllerConfig {
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }
}

/// What a call to [`Controller::run`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The committed index is current; nothing was queued
    IndexValid,
    /// The index was reset and a rebuild was queued
    RebuildQueued { events: usize, chunks: usize },
    /// The rebuild could not start; nothing was queued
    RebuildAborted,
}

struct Inner<E, R> {
    engine: RefCell<E>,
    reader: R,
    queue: RefCell<TaskQueue>,
    armed: Cell<bool>,
    scheduler: Rc<dyn Scheduler>,
    config: ControllerConfig,
    stats: RefCell<ControllerStats>,
}

impl<E: IndexEngine, R> Inner<E, R> {
    /// Body of one scheduler tick. Returns `true` while work remains.
    fn process_task(&self) -> bool {
        let task = self.queue.borrow_mut().pop();

        if let Some(task) = task {
            let kind = task.kind();
            let result = task.apply(&mut *self.engine.borrow_mut());
            let mut stats = self.stats.borrow_mut();
            match result {
                Ok(count) => {
                    stats.record_applied();
                    match kind {
                        TaskKind::IndexChunk => stats.events_indexed += count,
                        TaskKind::DeleteById => stats.events_deleted += count,
                        TaskKind::SetMetadata => {}
                    }
                    debug!(task = %kind, count, "Applied task");
                }
                Err(e) => {
                    stats.record_failed();
                    warn!(task = %kind, error = %e, "Failed to apply task");
                }
            }
        }

        if !self.queue.borrow().is_empty() {
            return true;
        }

        let committed = match self.engine.borrow_mut().commit() {
            Ok(()) => {
                debug!("Committed index");
                true
            }
            Err(e) => {
                error!(error = %e, "Failed to commit index");
                false
            }
        };
        self.stats.borrow_mut().record_commit(committed);
        self.armed.set(false);
        false
    }
}

/// Drives an [`IndexEngine`] from an [`EventReader`] through a [`Scheduler`].
pub struct Controller<E, R> {
    inner: Rc<Inner<E, R>>,
}

impl<E, R> Controller<E, R>
where
    E: IndexEngine + 'static,
    R: EventReader + 'static,
{
    pub fn new(
        engine: E,
        reader: R,
        scheduler: Rc<dyn Scheduler>,
        config: ControllerConfig,
    ) -> Self {
        Self {
            inner: Rc::new(Inner {
                engine: RefCell::new(engine),
                reader,
                queue: RefCell::new(TaskQueue::new()),
                armed: Cell::new(false),
                scheduler,
                config,
                stats: RefCell::new(ControllerStats::new()),
            }),
        }
    }

    /// Open or create the engine's storage.
    pub fn initialize(&self) -> Result<(), IndexingError> {
        let mut engine = self.inner.engine.borrow_mut();
        engine.initialize()?;
        info!(engine = engine.name(), "Index engine initialized");
        Ok(())
    }

    /// Check the index and queue a full rebuild if it is missing or stale.
    ///
    /// Reset and rebuild are not atomic: the index is empty from the moment
    /// it is dropped until the rebuild's final commit.
    pub fn run(&self) -> RunOutcome {
        if self.inner.engine.borrow().check_index() {
            debug!("Index is current");
            return RunOutcome::IndexValid;
        }

        info!("Index missing or outdated, rebuilding");
        if let Err(e) = self.inner.engine.borrow_mut().drop_index() {
            error!(error = %e, "Failed to drop index, rebuild aborted");
            self.inner.stats.borrow_mut().rebuilds_aborted += 1;
            return RunOutcome::RebuildAborted;
        }

        self.rebuild_index()
    }

    /// Queue every event in the store followed by the version marker.
    ///
    /// A reader failure queues nothing; the next [`Controller::run`] retries.
    pub fn rebuild_index(&self) -> RunOutcome {
        let events = match self.inner.reader.find_events(&FindEventsQuery::all_events()) {
            Ok(events) => events,
            Err(e) => {
                warn!(error = %e, "Failed to read events, rebuild aborted");
                self.inner.stats.borrow_mut().rebuilds_aborted += 1;
                return RunOutcome::RebuildAborted;
            }
        };

        let total = events.len();
        let chunks = self.push_events(
            events,
            Some(Task::set_metadata(INDEX_VERSION_KEY, INDEX_VERSION)),
        );
        self.inner.stats.borrow_mut().rebuilds_started += 1;

        info!(events = total, chunks, "Queued index rebuild");
        RunOutcome::RebuildQueued {
            events: total,
            chunks,
        }
    }

    /// Queue new or changed events for indexing.
    ///
    /// Returns the number of chunks queued.
    pub fn index_events(&self, events: Vec<Event>) -> usize {
        let total = events.len();
        let chunks = self.push_events(events, None);
        debug!(events = total, chunks, "Queued events for indexing");
        chunks
    }

    /// Queue removal of the given events as a single task.
    pub fn delete_events(&self, ids: impl IntoIterator<Item = EventId>) {
        let ids: BTreeSet<EventId> = ids.into_iter().collect();
        if ids.is_empty() {
            return;
        }
        debug!(count = ids.len(), "Queued event deletion");
        self.push_task(Task::delete_by_id(ids));
    }

    pub fn has_pending_tasks(&self) -> bool {
        !self.inner.queue.borrow().is_empty()
    }

    pub fn pending_tasks(&self) -> usize {
        self.inner.queue.borrow().len()
    }

    /// Whether a tick is currently scheduled.
    pub fn is_armed(&self) -> bool {
        self.inner.armed.get()
    }

    pub fn stats(&self) -> Ref<'_, ControllerStats> {
        self.inner.stats.borrow()
    }

    /// Borrow the engine, e.g. to query it between ticks.
    pub fn with_engine<T>(&self, f: impl FnOnce(&E) -> T) -> T {
        f(&self.inner.engine.borrow())
    }

    /// Queue the events as chunk tasks, followed by `trailer` if given.
    ///
    /// Returns the number of chunks queued.
    fn push_events(&self, events: Vec<Event>, trailer: Option<Task>) -> usize {
        let snapshot: Rc<[Event]> = Rc::from(events);
        let chunks = IndexChunk::split(snapshot, self.inner.config.chunk_size);
        let count = chunks.len();

        let tasks: Vec<Task> = chunks
            .into_iter()
            .map(Task::IndexChunk)
            .chain(trailer)
            .collect();
        if tasks.is_empty() {
            return 0;
        }
        self.inner.queue.borrow_mut().extend(tasks);
        self.arm();
        count
    }

    fn push_task(&self, task: Task) {
        self.inner.queue.borrow_mut().push(task);
        self.arm();
    }

    fn arm(&self) {
        if self.inner.armed.replace(true) {
            return;
        }
        let weak: Weak<Inner<E, R>> = Rc::downgrade(&self.inner);
        self.inner.scheduler.schedule(Box::new(move || match weak.upgrade() {
            Some(inner) => inner.process_task(),
            None => false,
        }));
    }
}
