//! Tantivy-backed index engine.
//!
//! Wraps [`SearchIndex`] and [`SearchIndexer`] from fts-search. Metadata set
//! through the engine is written as the tantivy commit payload, so the
//! version marker becomes durable in the same commit as the documents queued
//! before it.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use fts_search::{
    EventSearcher, SearchIndex, SearchIndexConfig, SearchIndexer, INDEX_VERSION,
    INDEX_VERSION_KEY,
};
use fts_types::{Event, EventId};

use crate::engine::IndexEngine;
use crate::error::IndexingError;

struct OpenIndex {
    index: SearchIndex,
    indexer: SearchIndexer,
}

/// Full-text index engine using Tantivy with BM25 ranking.
pub struct TantivyIndexEngine {
    config: SearchIndexConfig,
    open: Option<OpenIndex>,
}

impl TantivyIndexEngine {
    /// Create an engine. Storage is not touched until `initialize()`.
    pub fn new(config: SearchIndexConfig) -> Self {
        Self { config, open: None }
    }

    fn open(&self) -> Result<&OpenIndex, IndexingError> {
        self.open.as_ref().ok_or(IndexingError::NotInitialized)
    }

    fn open_mut(&mut self) -> Result<&mut OpenIndex, IndexingError> {
        self.open.as_mut().ok_or(IndexingError::NotInitialized)
    }

    /// Index format version recorded by the last commit, if any.
    pub fn stored_version(&self) -> Result<Option<String>, IndexingError> {
        let metadata = self.open()?.indexer.committed_metadata()?;
        Ok(metadata.get(INDEX_VERSION_KEY).cloned())
    }

    /// A searcher over the last committed state of the index.
    pub fn searcher(&self) -> Result<EventSearcher, IndexingError> {
        Ok(EventSearcher::new(&self.open()?.index)?)
    }
}

impl IndexEngine for TantivyIndexEngine {
    fn initialize(&mut self) -> Result<(), IndexingError> {
        if self.open.is_some() {
            return Ok(());
        }

        let index = SearchIndex::open_or_create(self.config.clone()).map_err(|e| {
            IndexingError::Init(format!("{}: {}", self.config.index_path.display(), e))
        })?;
        let indexer =
            SearchIndexer::new(&index).map_err(|e| IndexingError::Init(e.to_string()))?;

        self.open = Some(OpenIndex { index, indexer });
        Ok(())
    }

    fn check_index(&self) -> bool {
        match self.stored_version() {
            Ok(Some(version)) if version == INDEX_VERSION => true,
            Ok(version) => {
                debug!(stored = ?version, expected = INDEX_VERSION, "Index version mismatch");
                false
            }
            Err(e) => {
                warn!(error = %e, "Failed to read index metadata");
                false
            }
        }
    }

    fn drop_index(&mut self) -> Result<(), IndexingError> {
        self.open_mut()?
            .indexer
            .delete_all()
            .map_err(|e| IndexingError::Index(format!("drop error: {}", e)))?;
        Ok(())
    }

    fn index_events(&mut self, events: &[Event]) -> Result<usize, IndexingError> {
        self.open()?
            .indexer
            .index_events(events)
            .map_err(|e| IndexingError::TaskApply(format!("index error: {}", e)))
    }

    fn delete_events(&mut self, ids: &BTreeSet<EventId>) -> Result<usize, IndexingError> {
        Ok(self.open()?.indexer.delete_events(ids))
    }

    fn set_metadata(&mut self, key: &str, value: &str) -> Result<(), IndexingError> {
        self.open_mut()?.indexer.set_metadata(key, value);
        Ok(())
    }

    fn commit(&mut self) -> Result<(), IndexingError> {
        self.open_mut()?
            .indexer
            .commit()
            .map_err(|e| IndexingError::Commit(e.to_string()))?;
        Ok(())
    }

    fn name(&self) -> &str {
        "tantivy"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{event, events};
    use tempfile::TempDir;

    fn open_engine(dir: &TempDir) -> TantivyIndexEngine {
        let mut engine = TantivyIndexEngine::new(SearchIndexConfig::new(dir.path().join("index")));
        engine.initialize().unwrap();
        engine
    }

    #[test]
    fn test_uninitialized_engine_errors() {
        let dir = TempDir::new().unwrap();
        let mut engine = TantivyIndexEngine::new(SearchIndexConfig::new(dir.path()));
        assert!(!engine.check_index());
        assert!(matches!(
            engine.commit(),
            Err(IndexingError::NotInitialized)
        ));
        assert!(matches!(
            engine.searcher(),
            Err(IndexingError::NotInitialized)
        ));
    }

    #[test]
    fn test_initialize_creates_directory() {
        let dir = TempDir::new().unwrap();
        let engine = open_engine(&dir);
        assert!(dir.path().join("index").join("meta.json").exists());
        assert_eq!(engine.name(), "tantivy");
    }

    #[test]
    fn test_initialize_fails_on_file_path() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("not-a-dir");
        std::fs::write(&file, b"x").unwrap();

        let mut engine = TantivyIndexEngine::new(SearchIndexConfig::new(&file));
        assert!(matches!(engine.initialize(), Err(IndexingError::Init(_))));
    }

    #[test]
    fn test_new_index_is_invalid_until_version_committed() {
        let dir = TempDir::new().unwrap();
        let mut engine = open_engine(&dir);
        assert!(!engine.check_index());

        engine.index_events(&events(3)).unwrap();
        engine.set_metadata(INDEX_VERSION_KEY, INDEX_VERSION).unwrap();
        assert!(!engine.check_index());

        engine.commit().unwrap();
        assert!(engine.check_index());
        assert_eq!(engine.stored_version().unwrap().as_deref(), Some("1"));
        assert_eq!(engine.searcher().unwrap().num_docs(), 3);
    }

    #[test]
    fn test_stale_version_is_invalid() {
        let dir = TempDir::new().unwrap();
        let mut engine = open_engine(&dir);
        engine.set_metadata(INDEX_VERSION_KEY, "0").unwrap();
        engine.commit().unwrap();
        assert!(!engine.check_index());
    }

    #[test]
    fn test_drop_index_clears_documents_and_version() {
        let dir = TempDir::new().unwrap();
        let mut engine = open_engine(&dir);
        engine.index_events(&events(5)).unwrap();
        engine.set_metadata(INDEX_VERSION_KEY, INDEX_VERSION).unwrap();
        engine.commit().unwrap();

        engine.drop_index().unwrap();
        assert!(!engine.check_index());
        assert_eq!(engine.searcher().unwrap().num_docs(), 0);
    }

    #[test]
    fn test_delete_and_reindex_by_id() {
        let dir = TempDir::new().unwrap();
        let mut engine = open_engine(&dir);
        engine.index_events(&events(4)).unwrap();
        engine.index_events(&[event(2)]).unwrap();
        engine.commit().unwrap();
        assert_eq!(engine.searcher().unwrap().num_docs(), 4);

        let ids: BTreeSet<EventId> = [1, 3].into_iter().collect();
        assert_eq!(engine.delete_events(&ids).unwrap(), 2);
        engine.commit().unwrap();

        let hits = engine.searcher().unwrap().search("document", 10).unwrap();
        let mut found: Vec<EventId> = hits.iter().map(|h| h.event_id).collect();
        found.sort_unstable();
        assert_eq!(found, vec![2, 4]);
    }

    #[test]
    fn test_version_survives_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let mut engine = open_engine(&dir);
            engine.set_metadata(INDEX_VERSION_KEY, INDEX_VERSION).unwrap();
            engine.commit().unwrap();
        }

        let engine = open_engine(&dir);
        assert!(engine.check_index());
    }
}
