//! Error types for the indexing controller.

use fts_search::SearchError;
use thiserror::Error;

/// Errors that can occur in the indexing controller and its collaborators
#[derive(Error, Debug)]
pub enum IndexingError {
    /// The index engine could not open or create its storage
    #[error("Index initialization error: {0}")]
    Init(String),

    /// The index engine was used before initialize()
    #[error("Index engine not initialized")]
    NotInitialized,

    /// The event reader failed
    #[error("Event query error: {0}")]
    Query(String),

    /// A queued task failed to apply
    #[error("Task apply error: {0}")]
    TaskApply(String),

    /// Flushing the index failed
    #[error("Commit error: {0}")]
    Commit(String),

    /// Generic index operation error
    #[error("Index error: {0}")]
    Index(String),

    /// Search index error
    #[error("Search error: {0}")]
    Search(#[from] SearchError),
}
