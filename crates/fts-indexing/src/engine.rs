//! Index engine trait consumed by the controller.
//!
//! The engine owns the durable index. The controller only drives it: it
//! checks validity, resets it, applies queued work and decides when to
//! commit.

use std::collections::BTreeSet;

use fts_types::{Event, EventId};

use crate::error::IndexingError;

/// Interface to the component that stores, tokenizes and commits documents.
pub trait IndexEngine {
    /// Open or create the underlying storage.
    ///
    /// Fails with [`IndexingError::Init`] when storage cannot be opened.
    fn initialize(&mut self) -> Result<(), IndexingError>;

    /// Whether the committed index is complete and in the current format.
    fn check_index(&self) -> bool;

    /// Destroy all indexed content and metadata. Synchronous.
    fn drop_index(&mut self) -> Result<(), IndexingError>;

    /// Add or replace documents for the given events.
    ///
    /// Returns the number of events indexed.
    fn index_events(&mut self, events: &[Event]) -> Result<usize, IndexingError>;

    /// Remove documents for the given event ids.
    ///
    /// Returns the number of ids processed.
    fn delete_events(&mut self, ids: &BTreeSet<EventId>) -> Result<usize, IndexingError>;

    /// Record a metadata entry, persisted with the next commit.
    fn set_metadata(&mut self, key: &str, value: &str) -> Result<(), IndexingError>;

    /// Durably flush everything applied since the last commit.
    ///
    /// This may be expensive - batch updates before calling.
    fn commit(&mut self) -> Result<(), IndexingError>;

    /// Get the name of this engine for logging.
    fn name(&self) -> &str;
}
