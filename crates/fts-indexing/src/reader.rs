//! Event readers: the read side of the authoritative event store.

use std::path::PathBuf;

use tracing::debug;

use fts_types::{Event, FindEventsQuery};

use crate::error::IndexingError;

/// Query interface of the event store.
pub trait EventReader {
    /// Return every event matching the query, ordered and truncated as the
    /// query requests.
    fn find_events(&self, query: &FindEventsQuery) -> Result<Vec<Event>, IndexingError>;
}

/// Reader over an in-memory snapshot of events.
#[derive(Debug, Clone, Default)]
pub struct MemoryEventReader {
    events: Vec<Event>,
}

impl MemoryEventReader {
    pub fn new(events: Vec<Event>) -> Self {
        Self { events }
    }
}

impl EventReader for MemoryEventReader {
    fn find_events(&self, query: &FindEventsQuery) -> Result<Vec<Event>, IndexingError> {
        Ok(query.apply(self.events.iter().cloned()))
    }
}

/// Reader over a JSON-lines event log, one serialized [`Event`] per line.
///
/// The file is read on every query so the reader always reflects the
/// current log. A missing file is treated as an empty store.
#[derive(Debug, Clone)]
pub struct JsonlEventReader {
    path: PathBuf,
}

impl JsonlEventReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parse every event in the log, in file order.
    pub fn read_all(&self) -> Result<Vec<Event>, IndexingError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = ?self.path, "Event log does not exist yet");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(IndexingError::Query(format!(
                    "failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        contents
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(n, line)| {
                serde_json::from_str::<Event>(line).map_err(|e| {
                    IndexingError::Query(format!(
                        "{}:{}: invalid event: {}",
                        self.path.display(),
                        n + 1,
                        e
                    ))
                })
            })
            .collect()
    }
}

impl EventReader for JsonlEventReader {
    fn find_events(&self, query: &FindEventsQuery) -> Result<Vec<Event>, IndexingError> {
        let events = self.read_all()?;
        debug!(path = ?self.path, total = events.len(), "Read event log");
        Ok(query.apply(events))
    }
}
