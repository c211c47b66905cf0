//! Keyword search over indexed events using BM25 scoring.

use tantivy::collector::TopDocs;
use tantivy::query::QueryParser;
use tantivy::schema::Value;
use tantivy::IndexReader;
use tracing::{debug, info};

use fts_types::EventId;

use crate::error::SearchError;
use crate::index::SearchIndex;
use crate::schema::SearchSchema;

/// A search hit with relevance score.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub event_id: EventId,
    /// BM25 relevance score
    pub score: f32,
    pub timestamp_ms: Option<i64>,
}

/// Searcher over the event index.
pub struct EventSearcher {
    reader: IndexReader,
    schema: SearchSchema,
    query_parser: QueryParser,
}

impl EventSearcher {
    /// Create a new searcher from a SearchIndex.
    pub fn new(index: &SearchIndex) -> Result<Self, SearchError> {
        let reader = index.reader()?;
        let schema = index.schema().clone();

        let query_parser = QueryParser::for_index(index.index(), vec![schema.text]);

        Ok(Self {
            reader,
            schema,
            query_parser,
        })
    }

    /// Reload the reader to see recent commits.
    pub fn reload(&self) -> Result<(), SearchError> {
        self.reader.reload()?;
        debug!("Reloaded search reader");
        Ok(())
    }

    /// Number of live documents visible to this searcher.
    pub fn num_docs(&self) -> u64 {
        self.reader.searcher().num_docs()
    }

    /// Search with a query string, best matches first.
    pub fn search(&self, query_str: &str, limit: usize) -> Result<Vec<SearchHit>, SearchError> {
        if query_str.trim().is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let searcher = self.reader.searcher();
        let query = self.query_parser.parse_query(query_str)?;
        let top_docs = searcher.search(&query, &TopDocs::with_limit(limit))?;

        let mut hits = Vec::with_capacity(top_docs.len());
        for (score, doc_address) in top_docs {
            let doc: tantivy::TantivyDocument = searcher.doc(doc_address)?;

            let Some(event_id) = doc
                .get_first(self.schema.event_id)
                .and_then(|v| v.as_u64())
                .and_then(|id| EventId::try_from(id).ok())
            else {
                continue;
            };

            let timestamp_ms = doc
                .get_first(self.schema.timestamp_ms)
                .and_then(|v| v.as_i64());

            hits.push(SearchHit {
                event_id,
                score,
                timestamp_ms,
            });
        }

        info!(query = query_str, results = hits.len(), "Event search complete");

        Ok(hits)
    }
}
