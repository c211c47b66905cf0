//! Event type mirrored from the event store.
//!
//! Events are immutable records of user activity. Each event describes what
//! happened (interpretation), how it happened (manifestation), which
//! application did it (actor), and the subjects it happened to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier assigned to an event by the event store.
pub type EventId = u32;

/// The thing an event happened to (a file, a web page, a note, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// Location of the subject
    pub uri: String,

    /// What kind of thing the subject is
    #[serde(default)]
    pub interpretation: String,

    /// How the subject is stored or presented
    #[serde(default)]
    pub manifestation: String,

    #[serde(default)]
    pub mimetype: String,

    /// Where the subject came from (parent folder, referrer, ...)
    #[serde(default)]
    pub origin: String,

    /// Human readable title or label
    #[serde(default)]
    pub text: String,

    /// Storage medium identifier
    #[serde(default)]
    pub storage: String,

    /// Whether the storage medium is currently reachable
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

impl Subject {
    /// Create a subject with only a URI and a display text.
    pub fn new(uri: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            interpretation: String::new(),
            manifestation: String::new(),
            mimetype: String::new(),
            origin: String::new(),
            text: text.into(),
            storage: String::new(),
            available: true,
        }
    }

    pub fn with_mimetype(mut self, mimetype: impl Into<String>) -> Self {
        self.mimetype = mimetype.into();
        self
    }

    pub fn with_interpretation(mut self, interpretation: impl Into<String>) -> Self {
        self.interpretation = interpretation.into();
        self
    }

    pub fn with_storage(mut self, storage: impl Into<String>, available: bool) -> Self {
        self.storage = storage.into();
        self.available = available;
        self
    }

    /// Last non-empty path segment of the URI, e.g. `report.pdf` for
    /// `file:///home/user/report.pdf`.
    pub fn uri_tail(&self) -> Option<&str> {
        let without_query = self.uri.split(['?', '#']).next().unwrap_or_default();
        without_query
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|s| !s.is_empty() && !s.ends_with(':'))
    }
}

/// An activity event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Store-assigned identifier
    pub id: EventId,

    /// When the event occurred
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,

    #[serde(default)]
    pub interpretation: String,

    #[serde(default)]
    pub manifestation: String,

    /// Application responsible, usually an `application://name.desktop` URI
    #[serde(default)]
    pub actor: String,

    #[serde(default)]
    pub origin: String,

    #[serde(default)]
    pub subjects: Vec<Subject>,
}

impl Event {
    /// Create a new event without subjects.
    pub fn new(id: EventId, timestamp: DateTime<Utc>, actor: impl Into<String>) -> Self {
        Self {
            id,
            timestamp,
            interpretation: String::new(),
            manifestation: String::new(),
            actor: actor.into(),
            origin: String::new(),
            subjects: Vec::new(),
        }
    }

    pub fn with_interpretation(mut self, interpretation: impl Into<String>) -> Self {
        self.interpretation = interpretation.into();
        self
    }

    pub fn with_manifestation(mut self, manifestation: impl Into<String>) -> Self {
        self.manifestation = manifestation.into();
        self
    }

    pub fn with_subject(mut self, subject: Subject) -> Self {
        self.subjects.push(subject);
        self
    }

    /// Get timestamp as milliseconds since Unix epoch
    pub fn timestamp_ms(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }

    /// Application name derived from the actor URI.
    ///
    /// `application://gedit.desktop` becomes `gedit`.
    pub fn actor_name(&self) -> &str {
        let name = self
            .actor
            .strip_prefix("application://")
            .unwrap_or(&self.actor);
        name.strip_suffix(".desktop").unwrap_or(name)
    }
}
