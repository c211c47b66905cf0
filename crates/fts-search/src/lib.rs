//! # fts-search
//!
//! Full-text index of activity events using Tantivy.
//!
//! ## Features
//! - Embedded Tantivy index with MmapDirectory for persistence
//! - Schema indexing subject titles, URI tails and actor names
//! - Replace-by-id document updates and deletes
//! - Key/value index metadata persisted atomically with each commit
//! - BM25 search returning event ids

pub mod document;
pub mod error;
pub mod index;
pub mod indexer;
pub mod schema;
pub mod searcher;

pub use document::{event_to_doc, extract_event_text};
pub use error::SearchError;
pub use index::{SearchIndex, SearchIndexConfig};
pub use indexer::SearchIndexer;
pub use schema::{build_event_schema, SearchSchema, INDEX_VERSION, INDEX_VERSION_KEY};
pub use searcher::{EventSearcher, SearchHit};
