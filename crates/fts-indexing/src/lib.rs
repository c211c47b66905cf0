//! Incremental indexing controller for event-fts.
//!
//! This crate keeps a full-text index in step with an authoritative event
//! store without blocking the host. Work is split into small tasks that are
//! applied one per scheduler tick and committed once per burst.
//!
//! ## Key Components
//!
//! - [`Controller`]: owns the task queue and scheduler state, decides when to
//!   rebuild, chunks large workloads
//! - [`Task`] / [`IndexChunk`]: units of work over a shared event snapshot
//! - [`Scheduler`]: host loop abstraction, with [`ManualScheduler`] for
//!   explicit driving and [`LocalScheduler`] for a tokio `LocalSet`
//! - [`IndexEngine`]: the index being maintained; [`TantivyIndexEngine`] is
//!   the bundled implementation
//! - [`EventReader`]: the event store being mirrored; [`JsonlEventReader`]
//!   and [`MemoryEventReader`] are bundled
//!
//! ## Lifecycle
//!
//! 1. `initialize()` opens the engine's storage
//! 2. `run()` checks the index and, if it is stale, drops it and queues every
//!    event followed by the `fts_index_version` marker
//! 3. `index_events()` / `delete_events()` queue incremental changes
//! 4. The scheduler applies one task per tick and commits when the queue
//!    drains
//!
//! ## Example
//!
//! ```ignore
//! use std::rc::Rc;
//! use fts_indexing::{Controller, ControllerConfig, JsonlEventReader, LocalScheduler, TantivyIndexEngine};
//!
//! let engine = TantivyIndexEngine::new(SearchIndexConfig::new("./fts-index"));
//! let reader = JsonlEventReader::new("events.jsonl");
//! let controller = Controller::new(engine, reader, Rc::new(LocalScheduler::new()), ControllerConfig::default());
//! controller.initialize()?;
//! controller.run();
//! ```

pub mod controller;
pub mod engine;
pub mod error;
pub mod queue;
pub mod reader;
pub mod scheduler;
pub mod stats;
pub mod tantivy_engine;
pub mod task;

#[cfg(test)]
mod test_support;

pub use controller::{Controller, ControllerConfig, RunOutcome};
pub use engine::IndexEngine;
pub use error::IndexingError;
pub use queue::TaskQueue;
pub use reader::{EventReader, JsonlEventReader, MemoryEventReader};
pub use scheduler::{LocalScheduler, ManualScheduler, Scheduler, Tick};
pub use stats::ControllerStats;
pub use tantivy_engine::TantivyIndexEngine;
pub use task::{IndexChunk, Task, TaskKind, CHUNK_SIZE};
