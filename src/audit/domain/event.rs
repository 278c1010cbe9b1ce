//! Audit event records.

use super::{EventId, EventType};
use crate::run::domain::RunId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form structured payload of an event.
pub type EventData = Map<String, Value>;

/// Converts a JSON object literal into an event payload.
///
/// Anything other than an object yields an empty payload.
#[must_use]
pub fn event_data(value: Value) -> EventData {
    match value {
        Value::Object(map) => map,
        _ => EventData::new(),
    }
}

/// Longest message excerpt included in a summary.
const SUMMARY_MESSAGE_CHARS: usize = 50;

/// An event that has not been assigned an identity yet.
///
/// Only an event repository turns a `NewEvent` into an [`Event`], which is
/// what keeps identity assignment in one place.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    run_id: RunId,
    event_type: EventType,
    timestamp: DateTime<Utc>,
    data: EventData,
}

impl NewEvent {
    /// Stamps a new event with the current clock time.
    #[must_use]
    pub fn new(run_id: RunId, event_type: EventType, data: EventData, clock: &impl Clock) -> Self {
        Self {
            run_id,
            event_type,
            timestamp: clock.utc(),
            data,
        }
    }

    /// Returns the owning run.
    #[must_use]
    pub const fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Returns the event type.
    #[must_use]
    pub const fn event_type(&self) -> EventType {
        self.event_type
    }

    /// Seals the event under the given identity.
    #[must_use]
    pub fn into_event(self, id: EventId) -> Event {
        Event {
            id,
            run_id: self.run_id,
            event_type: self.event_type,
            timestamp: self.timestamp,
            data: self.data,
        }
    }
}

/// Immutable audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    id: EventId,
    run_id: RunId,
    #[serde(rename = "type")]
    event_type: EventType,
    timestamp: DateTime<Utc>,
    data: EventData,
}

impl Event {
    /// Returns the log-global identity.
    #[must_use]
    pub const fn id(&self) -> EventId {
        self.id
    }

    /// Returns the owning run.
    #[must_use]
    pub const fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Returns the event type.
    #[must_use]
    pub const fn event_type(&self) -> EventType {
        self.event_type
    }

    /// Returns when the event was recorded.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns the payload.
    #[must_use]
    pub const fn data(&self) -> &EventData {
        &self.data
    }

    /// Derives a one-line digest for compact operator views.
    ///
    /// The dotted type name is spelled with spaces and followed by the first
    /// of `path`, `target`, `message` (cut to 50 characters) or `tool` found
    /// in the payload.
    ///
    /// # Examples
    ///
    /// ```
    /// use parapet::audit::domain::{EventId, EventType, NewEvent, event_data};
    /// use parapet::run::domain::RunId;
    /// use mockable::DefaultClock;
    /// use serde_json::json;
    ///
    /// let data = event_data(json!({"path": "src/lib.rs", "tool": "Edit"}));
    /// let event = NewEvent::new(RunId::new(), EventType::FileChanged, data, &DefaultClock)
    ///     .into_event(EventId::FIRST);
    /// assert_eq!(event.summary(), "file changed src/lib.rs");
    /// ```
    #[must_use]
    pub fn summary(&self) -> String {
        let label = self.event_type.as_str().replace('.', " ");
        if let Some(path) = self.field("path") {
            return format!("{label} {}", display_value(path));
        }
        if let Some(target) = self.field("target") {
            return format!("{label} {}", display_value(target));
        }
        if let Some(message) = self.field("message") {
            let excerpt: String = display_value(message)
                .chars()
                .take(SUMMARY_MESSAGE_CHARS)
                .collect();
            return format!("{label}: {excerpt}");
        }
        if let Some(tool) = self.field("tool") {
            return format!("{label} {}", display_value(tool));
        }
        label
    }

    fn field(&self, key: &str) -> Option<&Value> {
        self.data.get(key).filter(|value| !value.is_null())
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
