//! Search indexer for adding and removing event documents.
//!
//! Documents and metadata changes are not visible until commit() is called.
//! Metadata is written as the commit payload, so a metadata entry becomes
//! durable in the same commit as the documents applied before it.

use std::collections::BTreeMap;

use tantivy::{Index, IndexWriter, Term};
use tracing::{debug, info, warn};

use fts_types::{Event, EventId};

use crate::document::event_to_doc;
use crate::error::SearchError;
use crate::index::{load_committed_metadata, SearchIndex};
use crate::schema::SearchSchema;

/// Manages document indexing operations.
///
/// Owns the index's single IndexWriter. Commit batches documents for
/// visibility and durability.
pub struct SearchIndexer {
    writer: IndexWriter,
    index: Index,
    schema: SearchSchema,
    /// Metadata as of the next commit
    metadata: BTreeMap<String, String>,
}

impl SearchIndexer {
    /// Create a new indexer from a SearchIndex.
    ///
    /// Pending metadata starts out as the metadata of the last commit.
    pub fn new(index: &SearchIndex) -> Result<Self, SearchError> {
        let writer = index.writer()?;
        let metadata = index.committed_metadata()?;

        Ok(Self {
            writer,
            index: index.index().clone(),
            schema: index.schema().clone(),
            metadata,
        })
    }

    fn id_term(&self, id: EventId) -> Term {
        Term::from_field_u64(self.schema.event_id, u64::from(id))
    }

    /// Index a batch of events.
    ///
    /// Each event replaces any document already indexed under its id.
    pub fn index_events(&self, events: &[Event]) -> Result<usize, SearchError> {
        let mut count = 0;
        for event in events {
            let doc = event_to_doc(&self.schema, event);

            self.writer.delete_term(self.id_term(event.id));
            self.writer.add_document(doc)?;
            count += 1;
        }

        debug!(count, "Indexed events batch");
        Ok(count)
    }

    /// Delete multiple events by id.
    pub fn delete_events<'a, I>(&self, ids: I) -> usize
    where
        I: IntoIterator<Item = &'a EventId>,
    {
        let mut count = 0;
        for id in ids {
            self.writer.delete_term(self.id_term(*id));
            count += 1;
        }

        debug!(count, "Deleted events batch");
        count
    }

    /// Remove every document and all metadata, and commit immediately.
    pub fn delete_all(&mut self) -> Result<u64, SearchError> {
        self.writer.delete_all_documents()?;
        self.metadata.clear();
        let opstamp = self.commit()?;
        warn!(opstamp, "Deleted all documents from index");
        Ok(opstamp)
    }

    /// Set a metadata entry. Takes effect with the next commit.
    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        debug!(key = %key, value = %value, "Set index metadata");
        self.metadata.insert(key, value);
    }

    /// Metadata stored with the last commit.
    pub fn committed_metadata(&self) -> Result<BTreeMap<String, String>, SearchError> {
        load_committed_metadata(&self.index)
    }

    /// Commit pending changes to make them searchable.
    ///
    /// This is expensive - batch document adds and commit periodically.
    pub fn commit(&mut self) -> Result<u64, SearchError> {
        let payload = serde_json::to_string(&self.metadata)?;

        let mut prepared = self.writer.prepare_commit()?;
        prepared.set_payload(&payload);
        let opstamp = prepared.commit()?;

        info!(opstamp, "Committed index changes");
        Ok(opstamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::SearchIndexConfig;
    use crate::schema::{INDEX_VERSION, INDEX_VERSION_KEY};
    use crate::searcher::EventSearcher;
    use chrono::Utc;
    use fts_types::Subject;
    use tempfile::TempDir;

    fn sample_event(id: EventId) -> Event {
        Event::new(id, Utc::now(), "application://gedit.desktop").with_subject(Subject::new(
            format!("file:///home/user/doc-{}.txt", id),
            format!("Document {}", id),
        ))
    }

    fn open(temp_dir: &TempDir) -> (SearchIndex, SearchIndexer) {
        let config = SearchIndexConfig::new(temp_dir.path());
        let index = SearchIndex::open_or_create(config).unwrap();
        let indexer = SearchIndexer::new(&index).unwrap();
        (index, indexer)
    }

    fn num_docs(index: &SearchIndex) -> u64 {
        let reader = index.reader().unwrap();
        reader.searcher().num_docs()
    }

    #[test]
    fn test_index_batch() {
        let temp_dir = TempDir::new().unwrap();
        let (index, mut indexer) = open(&temp_dir);

        let events: Vec<Event> = (0..5).map(sample_event).collect();
        let count = indexer.index_events(&events).unwrap();
        assert_eq!(count, 5);
        indexer.commit().unwrap();

        assert_eq!(num_docs(&index), 5);
    }

    #[test]
    fn test_reindex_replaces_existing_document() {
        let temp_dir = TempDir::new().unwrap();
        let (index, mut indexer) = open(&temp_dir);

        indexer.index_events(&[sample_event(1), sample_event(2)]).unwrap();
        indexer.commit().unwrap();

        let mut renamed = sample_event(1);
        renamed.subjects[0].text = "Renamed agenda".to_string();
        indexer.index_events(&[renamed]).unwrap();
        indexer.commit().unwrap();

        assert_eq!(num_docs(&index), 2);
        let searcher = EventSearcher::new(&index).unwrap();
        let hits = searcher.search("agenda", 10).unwrap();
        assert_eq!(hits.iter().map(|h| h.event_id).collect::<Vec<_>>(), vec![1]);
        let hits = searcher.search("document", 10).unwrap();
        assert_eq!(hits.iter().map(|h| h.event_id).collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_duplicate_ids_in_one_batch_keep_last() {
        let temp_dir = TempDir::new().unwrap();
        let (index, mut indexer) = open(&temp_dir);

        let mut second = sample_event(5);
        second.subjects[0].text = "Budget spreadsheet".to_string();
        indexer.index_events(&[sample_event(5), second]).unwrap();
        indexer.commit().unwrap();

        assert_eq!(num_docs(&index), 1);
        let searcher = EventSearcher::new(&index).unwrap();
        assert_eq!(searcher.search("budget", 10).unwrap().len(), 1);
    }

    #[test]
    fn test_delete_events() {
        let temp_dir = TempDir::new().unwrap();
        let (index, mut indexer) = open(&temp_dir);

        let events: Vec<Event> = (1..=3).map(sample_event).collect();
        indexer.index_events(&events).unwrap();
        indexer.commit().unwrap();
        assert_eq!(num_docs(&index), 3);

        let deleted = indexer.delete_events(&[1, 3]);
        assert_eq!(deleted, 2);
        indexer.commit().unwrap();
        assert_eq!(num_docs(&index), 1);

        // Unknown ids are a no-op
        indexer.delete_events(&[2, 99]);
        indexer.commit().unwrap();
        assert_eq!(num_docs(&index), 0);
    }

    #[test]
    fn test_metadata_only_visible_after_commit() {
        let temp_dir = TempDir::new().unwrap();
        let (_index, mut indexer) = open(&temp_dir);

        indexer.set_metadata(INDEX_VERSION_KEY, INDEX_VERSION);
        assert!(indexer.committed_metadata().unwrap().is_empty());

        indexer.commit().unwrap();
        let committed = indexer.committed_metadata().unwrap();
        assert_eq!(
            committed.get(INDEX_VERSION_KEY).map(String::as_str),
            Some(INDEX_VERSION)
        );
    }

    #[test]
    fn test_metadata_survives_later_commits_and_reopen() {
        let temp_dir = TempDir::new().unwrap();
        {
            let (_index, mut indexer) = open(&temp_dir);
            indexer.set_metadata("owner", "tests");
            indexer.commit().unwrap();

            indexer.index_events(&[sample_event(1)]).unwrap();
            indexer.commit().unwrap();
        }

        // A fresh indexer carries the committed metadata into its next commit
        let (index, mut indexer) = open(&temp_dir);
        indexer.index_events(&[sample_event(2)]).unwrap();
        indexer.commit().unwrap();
        assert_eq!(
            index.committed_metadata().unwrap().get("owner").map(String::as_str),
            Some("tests")
        );
    }

    #[test]
    fn test_delete_all_clears_documents_and_metadata() {
        let temp_dir = TempDir::new().unwrap();
        let (index, mut indexer) = open(&temp_dir);

        indexer.index_events(&[sample_event(1), sample_event(2)]).unwrap();
        indexer.set_metadata(INDEX_VERSION_KEY, INDEX_VERSION);
        indexer.commit().unwrap();

        indexer.delete_all().unwrap();

        assert_eq!(num_docs(&index), 0);
        assert!(indexer.committed_metadata().unwrap().is_empty());

        // Cleared metadata stays cleared across the next commit
        indexer.commit().unwrap();
        assert!(indexer.committed_metadata().unwrap().is_empty());
    }
}
