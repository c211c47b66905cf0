//! Shared fixtures for unit tests: a recording engine and event builders.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use chrono::{TimeZone, Utc};
use fts_search::{INDEX_VERSION, INDEX_VERSION_KEY};
use fts_types::{Event, EventId, FindEventsQuery, Subject};

use crate::engine::IndexEngine;
use crate::error::IndexingError;
use crate::reader::EventReader;

/// Event with a timestamp that grows with its id.
pub fn event(id: EventId) -> Event {
    Event::new(
        id,
        Utc.timestamp_millis_opt(1_700_000_000_000 + i64::from(id) * 1000)
            .unwrap(),
        "application://gedit.desktop",
    )
    .with_subject(Subject::new(
        format!("file:///home/user/doc-{}.txt", id),
        format!("Document {}", id),
    ))
}

/// Events with ids `1..=n`.
pub fn events(n: u32) -> Vec<Event> {
    (1..=n).map(event).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    Initialize,
    CheckIndex,
    DropIndex,
    IndexEvents(Vec<EventId>),
    DeleteEvents(Vec<EventId>),
    SetMetadata(String, String),
    Commit,
}

pub type CallLog = Rc<RefCell<Vec<EngineCall>>>;

pub fn count_calls(log: &CallLog, pred: impl Fn(&EngineCall) -> bool) -> usize {
    log.borrow().iter().filter(|c| pred(c)).count()
}

/// Engine that records every call and models version metadata the way a
/// real engine does: it only counts once committed.
pub struct MockEngine {
    log: CallLog,
    pending_version: Option<String>,
    committed_version: Option<String>,
    pub fail_init: bool,
    pub fail_drop: bool,
    pub fail_commit: bool,
    /// Index calls containing any of these ids fail
    pub poison_ids: BTreeSet<EventId>,
}

impl MockEngine {
    pub fn new() -> (Self, CallLog) {
        let log: CallLog = Rc::default();
        let engine = Self {
            log: log.clone(),
            pending_version: None,
            committed_version: None,
            fail_init: false,
            fail_drop: false,
            fail_commit: false,
            poison_ids: BTreeSet::new(),
        };
        (engine, log)
    }

    /// Engine whose committed index is already current.
    pub fn valid() -> (Self, CallLog) {
        let (mut engine, log) = Self::new();
        engine.pending_version = Some(INDEX_VERSION.to_string());
        engine.committed_version = Some(INDEX_VERSION.to_string());
        (engine, log)
    }

    fn record(&self, call: EngineCall) {
        self.log.borrow_mut().push(call);
    }
}

impl IndexEngine for MockEngine {
    fn initialize(&mut self) -> Result<(), IndexingError> {
        self.record(EngineCall::Initialize);
        if self.fail_init {
            return Err(IndexingError::Init("mock storage unavailable".to_string()));
        }
        Ok(())
    }

    fn check_index(&self) -> bool {
        self.record(EngineCall::CheckIndex);
        self.committed_version.as_deref() == Some(INDEX_VERSION)
    }

    fn drop_index(&mut self) -> Result<(), IndexingError> {
        self.record(EngineCall::DropIndex);
        if self.fail_drop {
            return Err(IndexingError::Index("mock drop failure".to_string()));
        }
        self.pending_version = None;
        self.committed_version = None;
        Ok(())
    }

    fn index_events(&mut self, events: &[Event]) -> Result<usize, IndexingError> {
        let ids: Vec<EventId> = events.iter().map(|e| e.id).collect();
        let poisoned = ids.iter().any(|id| self.poison_ids.contains(id));
        self.record(EngineCall::IndexEvents(ids));
        if poisoned {
            return Err(IndexingError::TaskApply("mock index failure".to_string()));
        }
        Ok(events.len())
    }

    fn delete_events(&mut self, ids: &BTreeSet<EventId>) -> Result<usize, IndexingError> {
        self.record(EngineCall::DeleteEvents(ids.iter().copied().collect()));
        Ok(ids.len())
    }

    fn set_metadata(&mut self, key: &str, value: &str) -> Result<(), IndexingError> {
        self.record(EngineCall::SetMetadata(key.to_string(), value.to_string()));
        if key == INDEX_VERSION_KEY {
            self.pending_version = Some(value.to_string());
        }
        Ok(())
    }

    fn commit(&mut self) -> Result<(), IndexingError> {
        self.record(EngineCall::Commit);
        if self.fail_commit {
            return Err(IndexingError::Commit("mock commit failure".to_string()));
        }
        self.committed_version = self.pending_version.clone();
        Ok(())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Reader whose store is unreachable.
pub struct FailingReader;

impl EventReader for FailingReader {
    fn find_events(&self, _query: &FindEventsQuery) -> Result<Vec<Event>, IndexingError> {
        Err(IndexingError::Query("event store unavailable".to_string()))
    }
}

/// Reader that records the queries it receives.
pub struct RecordingReader {
    pub events: Vec<Event>,
    pub queries: Rc<RefCell<Vec<FindEventsQuery>>>,
}

impl EventReader for RecordingReader {
    fn find_events(&self, query: &FindEventsQuery) -> Result<Vec<Event>, IndexingError> {
        self.queries.borrow_mut().push(query.clone());
        Ok(query.apply(self.events.iter().cloned()))
    }
}
