//! Document mapping from events to Tantivy documents.

use tantivy::TantivyDocument;

use fts_types::Event;

use crate::schema::SearchSchema;

/// Convert an Event to a Tantivy document.
///
/// Subject URIs are added as separate values of the multi-valued
/// `subject_uri` field.
pub fn event_to_doc(schema: &SearchSchema, event: &Event) -> TantivyDocument {
    let mut doc = TantivyDocument::default();

    doc.add_u64(schema.event_id, u64::from(event.id));
    doc.add_i64(schema.timestamp_ms, event.timestamp_ms());
    doc.add_text(schema.text, extract_event_text(event));
    doc.add_text(schema.actor, &event.actor);
    doc.add_text(schema.interpretation, &event.interpretation);
    doc.add_text(schema.manifestation, &event.manifestation);
    for subject in &event.subjects {
        doc.add_text(schema.subject_uri, &subject.uri);
    }

    doc
}

/// Extract the searchable text for an event.
///
/// Returns subject titles, the last URI segment of each subject, and the
/// actor's application name, space separated.
pub fn extract_event_text(event: &Event) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for subject in &event.subjects {
        if !subject.text.is_empty() {
            parts.push(&subject.text);
        }
        if let Some(tail) = subject.uri_tail() {
            if tail != subject.text {
                parts.push(tail);
            }
        }
    }

    let actor = event.actor_name();
    if !actor.is_empty() {
        parts.push(actor);
    }

    parts.join(" ")
}
