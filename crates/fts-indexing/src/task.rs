//! Units of indexing work.
//!
//! A [`Task`] is created when work is enqueued, applied to the engine exactly
//! once by a scheduler tick, and then dropped. Tasks are never retried or
//! mutated.

use std::collections::BTreeSet;
use std::rc::Rc;

use fts_types::{Event, EventId};

use crate::engine::IndexEngine;
use crate::error::IndexingError;

/// Default number of events per [`IndexChunk`].
///
/// One chunk is applied per scheduler tick, so this bounds how long a tick
/// can hold the host loop. Any positive value is correct.
pub const CHUNK_SIZE: usize = 32;

/// A window of a shared event snapshot.
///
/// All chunks of one rebuild reference the same `Rc<[Event]>`; the snapshot
/// is freed when the last chunk is dropped.
#[derive(Debug, Clone)]
pub struct IndexChunk {
    events: Rc<[Event]>,
    offset: usize,
    length: usize,
}

impl IndexChunk {
    /// Create a chunk. The window is clamped to the snapshot bounds.
    pub fn new(events: Rc<[Event]>, offset: usize, length: usize) -> Self {
        let offset = offset.min(events.len());
        let length = length.min(events.len() - offset);
        Self {
            events,
            offset,
            length,
        }
    }

    /// Split a snapshot into `ceil(len / chunk_size)` consecutive windows of at
    /// most `chunk_size` events. A chunk size of 0 is treated as 1.
    pub fn split(events: Rc<[Event]>, chunk_size: usize) -> Vec<IndexChunk> {
        let chunk_size = chunk_size.max(1);
        (0..events.len())
            .step_by(chunk_size)
            .map(|offset| IndexChunk::new(Rc::clone(&events), offset, chunk_size))
            .collect()
    }

    /// The events in this chunk's window.
    pub fn events(&self) -> &[Event] {
        &self.events[self.offset..self.offset + self.length]
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}

/// Kind of a task, for logging and statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    IndexChunk,
    DeleteById,
    SetMetadata,
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskKind::IndexChunk => write!(f, "index_chunk"),
            TaskKind::DeleteById => write!(f, "delete_by_id"),
            TaskKind::SetMetadata => write!(f, "set_metadata"),
        }
    }
}

/// One unit of queued indexing work.
#[derive(Debug, Clone)]
pub enum Task {
    /// Index (or re-index) a window of events
    IndexChunk(IndexChunk),
    /// Remove events from the index
    DeleteById { ids: BTreeSet<EventId> },
    /// Record an index metadata entry
    SetMetadata { key: String, value: String },
}

impl Task {
    pub fn delete_by_id(ids: impl IntoIterator<Item = EventId>) -> Self {
        Task::DeleteById {
            ids: ids.into_iter().collect(),
        }
    }

    pub fn set_metadata(key: impl Into<String>, value: impl Into<String>) -> Self {
        Task::SetMetadata {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn kind(&self) -> TaskKind {
        match self {
            Task::IndexChunk(_) => TaskKind::IndexChunk,
            Task::DeleteById { .. } => TaskKind::DeleteById,
            Task::SetMetadata { .. } => TaskKind::SetMetadata,
        }
    }

    /// Apply this task to the engine.
    ///
    /// Returns the number of events the task touched (0 for metadata).
    pub fn apply<E>(&self, engine: &mut E) -> Result<usize, IndexingError>
    where
        E: IndexEngine + ?Sized,
    {
        match self {
            Task::IndexChunk(chunk) => engine.index_events(chunk.events()),
            Task::DeleteById { ids } => engine.delete_events(ids),
            Task::SetMetadata { key, value } => engine.set_metadata(key, value).map(|()| 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{events, EngineCall, MockEngine};
    use rand::Rng;

    fn snapshot(n: u32) -> Rc<[Event]> {
        Rc::from(events(n))
    }

    #[test]
    fn test_split_sizes_for_65_events() {
        let chunks = IndexChunk::split(snapshot(65), CHUNK_SIZE);
        let sizes: Vec<usize> = chunks.iter().map(IndexChunk::len).collect();
        assert_eq!(sizes, vec![32, 32, 1]);
        assert_eq!(chunks[2].offset, 64);
    }

    #[test]
    fn test_split_empty_snapshot_yields_no_chunks() {
        assert!(IndexChunk::split(snapshot(0), CHUNK_SIZE).is_empty());
    }

    #[test]
    fn test_split_exact_multiple() {
        let chunks = IndexChunk::split(snapshot(64), CHUNK_SIZE);
        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|c| c.len() == 32));
    }

    #[test]
    fn test_split_zero_chunk_size_treated_as_one() {
        let chunks = IndexChunk::split(snapshot(3), 0);
        assert_eq!(chunks.len(), 3);
    }

    #[test]
    fn test_chunks_cover_snapshot_without_gaps_or_overlap() {
        let mut rng = rand::rng();
        for _ in 0..50 {
            let n: u32 = rng.random_range(0..500);
            let chunk_size: usize = rng.random_range(1..80);
            let snap = snapshot(n);
            let chunks = IndexChunk::split(Rc::clone(&snap), chunk_size);

            assert_eq!(chunks.len(), (n as usize).div_ceil(chunk_size));
            assert!(chunks.iter().all(|c| c.len() <= chunk_size && !c.is_empty()));

            let covered: Vec<EventId> = chunks
                .iter()
                .flat_map(|c| c.events().iter().map(|e| e.id))
                .collect();
            let expected: Vec<EventId> = snap.iter().map(|e| e.id).collect();
            assert_eq!(covered, expected, "n={} chunk_size={}", n, chunk_size);
        }
    }

    #[test]
    fn test_chunks_share_one_snapshot() {
        let snap = snapshot(70);
        let chunks = IndexChunk::split(Rc::clone(&snap), CHUNK_SIZE);
        assert_eq!(Rc::strong_count(&snap), 1 + chunks.len());
        assert!(chunks.iter().all(|c| Rc::ptr_eq(&c.events, &snap)));

        drop(chunks);
        assert_eq!(Rc::strong_count(&snap), 1);
    }

    #[test]
    fn test_new_clamps_window() {
        let chunk = IndexChunk::new(snapshot(10), 8, 32);
        assert_eq!(chunk.len(), 2);

        let past_end = IndexChunk::new(snapshot(10), 20, 5);
        assert!(past_end.is_empty());
        assert!(past_end.events().is_empty());
    }

    #[test]
    fn test_apply_dispatches_by_variant() {
        let (mut engine, log) = MockEngine::new();

        let chunk = Task::IndexChunk(IndexChunk::new(snapshot(5), 1, 2));
        assert_eq!(chunk.apply(&mut engine).unwrap(), 2);

        let delete = Task::delete_by_id([9, 7, 9]);
        assert_eq!(delete.apply(&mut engine).unwrap(), 2);

        let meta = Task::set_metadata("fts_index_version", "1");
        assert_eq!(meta.apply(&mut engine).unwrap(), 0);

        assert_eq!(
            *log.borrow(),
            vec![
                EngineCall::IndexEvents(vec![2, 3]),
                EngineCall::DeleteEvents(vec![7, 9]),
                EngineCall::SetMetadata("fts_index_version".to_string(), "1".to_string()),
            ]
        );
    }

    #[test]
    fn test_apply_propagates_engine_error() {
        let (mut engine, _log) = MockEngine::new();
        engine.poison_ids.insert(3);

        let task = Task::IndexChunk(IndexChunk::new(snapshot(5), 0, 5));
        assert!(matches!(
            task.apply(&mut engine),
            Err(IndexingError::TaskApply(_))
        ));
    }

    #[test]
    fn test_task_kind_display() {
        assert_eq!(TaskKind::IndexChunk.to_string(), "index_chunk");
        assert_eq!(Task::delete_by_id([1]).kind(), TaskKind::DeleteById);
        assert_eq!(Task::set_metadata("k", "v").kind().to_string(), "set_metadata");
    }
}
