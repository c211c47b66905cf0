//! Tantivy schema definition for the event index.
//!
//! One document per event. Raw-string fields are stored for display and
//! exact filtering; the `text` field carries the tokenized searchable
//! content.

use tantivy::schema::{Field, Schema, FAST, INDEXED, STORED, STRING, TEXT};

use crate::SearchError;

/// Metadata key recording which index format a completed rebuild wrote.
pub const INDEX_VERSION_KEY: &str = "fts_index_version";

/// Current index format version. Bump whenever the schema or the document
/// mapping changes so existing indexes are rebuilt.
pub const INDEX_VERSION: &str = "1";

/// Schema field handles for efficient access
#[derive(Debug, Clone)]
pub struct SearchSchema {
    schema: Schema,
    /// Primary key: event id (u64, INDEXED | STORED)
    pub event_id: Field,
    /// Event timestamp in milliseconds (i64, STORED | FAST)
    pub timestamp_ms: Field,
    /// Searchable text: subject titles, URI tails, actor name (TEXT)
    pub text: Field,
    /// Actor URI (STRING | STORED)
    pub actor: Field,
    /// Event interpretation URI (STRING | STORED)
    pub interpretation: Field,
    /// Event manifestation URI (STRING | STORED)
    pub manifestation: Field,
    /// Subject URIs, one value per subject (STRING | STORED)
    pub subject_uri: Field,
}

impl SearchSchema {
    /// Get the underlying Tantivy schema
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Create a SearchSchema from an existing Tantivy Schema
    pub fn from_schema(schema: Schema) -> Result<Self, SearchError> {
        let field = |name: &str| {
            schema
                .get_field(name)
                .map_err(|_| SearchError::SchemaMismatch(format!("missing {} field", name)))
        };

        let event_id = field("event_id")?;
        let timestamp_ms = field("timestamp_ms")?;
        let text = field("text")?;
        let actor = field("actor")?;
        let interpretation = field("interpretation")?;
        let manifestation = field("manifestation")?;
        let subject_uri = field("subject_uri")?;

        Ok(Self {
            schema,
            event_id,
            timestamp_ms,
            text,
            actor,
            interpretation,
            manifestation,
            subject_uri,
        })
    }
}

/// Build the event index schema.
pub fn build_event_schema() -> SearchSchema {
    let mut schema_builder = Schema::builder();

    // Indexed so deletes can target a single event by term
    let event_id = schema_builder.add_u64_field("event_id", INDEXED | STORED);

    let timestamp_ms = schema_builder.add_i64_field("timestamp_ms", STORED | FAST);

    let text = schema_builder.add_text_field("text", TEXT);

    let actor = schema_builder.add_text_field("actor", STRING | STORED);
    let interpretation = schema_builder.add_text_field("interpretation", STRING | STORED);
    let manifestation = schema_builder.add_text_field("manifestation", STRING | STORED);
    let subject_uri = schema_builder.add_text_field("subject_uri", STRING | STORED);

    let schema = schema_builder.build();

    SearchSchema {
        schema,
        event_id,
        timestamp_ms,
        text,
        actor,
        interpretation,
        manifestation,
        subject_uri,
    }
}
