//! On-disk location of the event index.
//!
//! [`SearchIndex`] owns the index directory: opening it creates any missing
//! parent directories, builds the event schema for a fresh index and checks
//! the schema of an existing one. Writers and readers are handed out from
//! here so the memory budget and reload policy live in one place.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy};
use tracing::{debug, info};

use crate::error::SearchError;
use crate::schema::{build_event_schema, SearchSchema};

const DEFAULT_WRITER_MEMORY_MB: usize = 50;

/// File tantivy writes once an index has been created in a directory.
const META_FILE: &str = "meta.json";

/// Where the index lives and how much memory its writer may use.
#[derive(Debug, Clone)]
pub struct SearchIndexConfig {
    pub index_path: PathBuf,
    pub writer_memory_mb: usize,
}

impl Default for SearchIndexConfig {
    fn default() -> Self {
        Self::new("./fts-index")
    }
}

impl SearchIndexConfig {
    pub fn new(index_path: impl Into<PathBuf>) -> Self {
        Self {
            index_path: index_path.into(),
            writer_memory_mb: DEFAULT_WRITER_MEMORY_MB,
        }
    }

    pub fn with_memory_mb(mut self, mb: usize) -> Self {
        self.writer_memory_mb = mb;
        self
    }

    fn writer_budget_bytes(&self) -> usize {
        self.writer_memory_mb.saturating_mul(1024 * 1024)
    }
}

/// An opened event index and its validated schema.
pub struct SearchIndex {
    index: Index,
    schema: SearchSchema,
    config: SearchIndexConfig,
}

impl SearchIndex {
    /// Open the index at `config.index_path`, creating it (and any missing
    /// directories) when none exists yet.
    ///
    /// Fails with [`SearchError::Io`] when the path cannot be used as a
    /// directory and with [`SearchError::SchemaMismatch`] when an existing
    /// index was built with a different schema.
    pub fn open_or_create(config: SearchIndexConfig) -> Result<Self, SearchError> {
        let path = config.index_path.as_path();
        let index = if has_index(path) {
            debug!(path = ?path, "Opening existing index");
            Index::open_in_dir(path)?
        } else {
            std::fs::create_dir_all(path)?;
            info!(path = ?path, "Creating new index");
            Index::create_in_dir(path, build_event_schema().schema().clone())?
        };
        let schema = SearchSchema::from_schema(index.schema())?;

        Ok(Self {
            index,
            schema,
            config,
        })
    }

    pub fn schema(&self) -> &SearchSchema {
        &self.schema
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    /// A writer with the configured memory budget.
    ///
    /// Tantivy allows one writer per index at a time.
    pub fn writer(&self) -> Result<IndexWriter, SearchError> {
        let writer = self.index.writer(self.config.writer_budget_bytes())?;
        debug!(memory_mb = self.config.writer_memory_mb, "Created index writer");
        Ok(writer)
    }

    /// A reader that only sees new commits after an explicit `reload()`.
    pub fn reader(&self) -> Result<IndexReader, SearchError> {
        Ok(self
            .index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?)
    }

    /// Metadata stored with the last commit.
    pub fn committed_metadata(&self) -> Result<BTreeMap<String, String>, SearchError> {
        load_committed_metadata(&self.index)
    }
}

fn has_index(path: &Path) -> bool {
    path.join(META_FILE).is_file()
}

/// Read the metadata map carried by the last commit's payload.
///
/// An index that was never committed, or committed without a payload, has no
/// metadata.
pub(crate) fn load_committed_metadata(
    index: &Index,
) -> Result<BTreeMap<String, String>, SearchError> {
    match index.load_metas()?.payload {
        Some(payload) if !payload.is_empty() => Ok(serde_json::from_str(&payload)?),
        _ => Ok(BTreeMap::new()),
    }
}
