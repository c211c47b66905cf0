//! Query vocabulary for asking the event store for events.

use serde::{Deserialize, Serialize};

use crate::event::Event;

/// Inclusive range of timestamps in milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start_ms: i64,
    pub end_ms: i64,
}

impl TimeRange {
    pub fn new(start_ms: i64, end_ms: i64) -> Self {
        Self { start_ms, end_ms }
    }

    /// A range covering every representable timestamp, including those
    /// before the epoch.
    pub fn anytime() -> Self {
        Self {
            start_ms: i64::MIN,
            end_ms: i64::MAX,
        }
    }

    pub fn contains(&self, timestamp_ms: i64) -> bool {
        (self.start_ms..=self.end_ms).contains(&timestamp_ms)
    }
}

impl Default for TimeRange {
    fn default() -> Self {
        Self::anytime()
    }
}

/// Filter on whether an event's subjects are currently reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageState {
    /// Only events with at least one unavailable subject
    NotAvailable,
    /// Only events whose subjects are all available
    Available,
    /// No filtering
    #[default]
    Any,
}

impl StorageState {
    pub fn matches(&self, event: &Event) -> bool {
        match self {
            StorageState::Any => true,
            StorageState::Available => event.subjects.iter().all(|s| s.available),
            StorageState::NotAvailable => event.subjects.iter().any(|s| !s.available),
        }
    }
}

/// Ordering of the result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultType {
    /// Newest first
    #[default]
    MostRecentEvents,
    /// Oldest first
    LeastRecentEvents,
}

/// Pattern an event must match. Unset fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTemplate {
    #[serde(default)]
    pub interpretation: Option<String>,
    #[serde(default)]
    pub manifestation: Option<String>,
    #[serde(default)]
    pub actor: Option<String>,
    /// Matches when any subject URI starts with this prefix
    #[serde(default)]
    pub subject_uri_prefix: Option<String>,
}

impl EventTemplate {
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    pub fn with_interpretation(mut self, interpretation: impl Into<String>) -> Self {
        self.interpretation = Some(interpretation.into());
        self
    }

    pub fn with_subject_uri_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.subject_uri_prefix = Some(prefix.into());
        self
    }

    pub fn matches(&self, event: &Event) -> bool {
        let field_matches =
            |wanted: &Option<String>, actual: &str| wanted.as_deref().is_none_or(|w| w == actual);

        field_matches(&self.interpretation, &event.interpretation)
            && field_matches(&self.manifestation, &event.manifestation)
            && field_matches(&self.actor, &event.actor)
            && self.subject_uri_prefix.as_deref().is_none_or(|prefix| {
                event.subjects.iter().any(|s| s.uri.starts_with(prefix))
            })
    }
}

/// A complete find-events request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindEventsQuery {
    pub time_range: TimeRange,
    /// An event matches if it matches any template; no templates matches all
    pub templates: Vec<EventTemplate>,
    pub storage_state: StorageState,
    /// Maximum number of events to return, 0 for no limit
    pub limit: u32,
    pub result_type: ResultType,
}

impl FindEventsQuery {
    /// The query used for a full index rebuild: every event ever recorded,
    /// newest first, without a result cap.
    pub fn all_events() -> Self {
        Self {
            time_range: TimeRange::anytime(),
            templates: Vec::new(),
            storage_state: StorageState::Any,
            limit: 0,
            result_type: ResultType::MostRecentEvents,
        }
    }

    pub fn with_time_range(mut self, time_range: TimeRange) -> Self {
        self.time_range = time_range;
        self
    }

    pub fn with_template(mut self, template: EventTemplate) -> Self {
        self.templates.push(template);
        self
    }

    pub fn with_storage_state(mut self, storage_state: StorageState) -> Self {
        self.storage_state = storage_state;
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_result_type(mut self, result_type: ResultType) -> Self {
        self.result_type = result_type;
        self
    }

    /// Check the time range, templates and storage state against one event.
    pub fn matches(&self, event: &Event) -> bool {
        self.time_range.contains(event.timestamp_ms())
            && (self.templates.is_empty() || self.templates.iter().any(|t| t.matches(event)))
            && self.storage_state.matches(event)
    }

    /// Filter, order and truncate a set of events according to this query.
    ///
    /// Events with equal timestamps are ordered by id in the same direction
    /// as the timestamps so the result is deterministic.
    pub fn apply<I>(&self, events: I) -> Vec<Event>
    where
        I: IntoIterator<Item = Event>,
    {
        let mut matched: Vec<Event> = events.into_iter().filter(|e| self.matches(e)).collect();

        match self.result_type {
            ResultType::MostRecentEvents => {
                matched.sort_by(|a, b| (b.timestamp, b.id).cmp(&(a.timestamp, a.id)))
            }
            ResultType::LeastRecentEvents => {
                matched.sort_by(|a, b| (a.timestamp, a.id).cmp(&(b.timestamp, b.id)))
            }
        }

        if self.limit > 0 {
            matched.truncate(self.limit as usize);
        }
        matched
    }
}

impl Default for FindEventsQuery {
    fn default() -> Self {
        Self::all_events()
    }
}
