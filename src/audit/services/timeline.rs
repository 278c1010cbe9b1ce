//! Paged, summarized view of a run's events.

use crate::audit::{
    domain::{Event, EventData, EventId, EventType},
    ports::{EventRepository, EventRepositoryError},
};
use crate::run::{
    domain::RunId,
    ports::{RunRepository, RunRepositoryError},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Page size used when a query does not set one.
const DEFAULT_PAGE_SIZE: usize = 100;

/// Parameters for reading a page of a run's timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineQuery {
    run_id: RunId,
    since: Option<EventId>,
    limit: usize,
}

impl TimelineQuery {
    /// Creates a query for the first page of a run.
    #[must_use]
    pub const fn new(run_id: RunId) -> Self {
        Self {
            run_id,
            since: None,
            limit: DEFAULT_PAGE_SIZE,
        }
    }

    /// Only returns events after the given cursor.
    #[must_use]
    pub const fn since(mut self, cursor: EventId) -> Self {
        self.since = Some(cursor);
        self
    }

    /// Sets the page size.
    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// One event as presented in a timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    /// Event identity.
    pub id: EventId,
    /// Event type.
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Recording time.
    pub timestamp: DateTime<Utc>,
    /// One-line digest.
    pub summary: String,
    /// Full payload.
    pub data: EventData,
}

impl From<Event> for TimelineEntry {
    fn from(event: Event) -> Self {
        let summary = event.summary();
        Self {
            id: event.id(),
            event_type: event.event_type(),
            timestamp: event.timestamp(),
            summary,
            data: event.data().clone(),
        }
    }
}

/// A page of a run's timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    /// Run the page belongs to.
    pub run_id: RunId,
    /// Entries in ascending identity order.
    pub events: Vec<TimelineEntry>,
    /// Identity of the last entry on this page, to use as the next cursor.
    pub latest_event_id: Option<EventId>,
    /// Whether more events exist after this page.
    pub has_more: bool,
}

/// Errors returned while building a timeline.
#[derive(Debug, Error)]
pub enum TimelineError {
    /// The run does not exist.
    #[error("run not found: {0}")]
    RunNotFound(RunId),
    /// Run lookup failed.
    #[error(transparent)]
    Runs(#[from] RunRepositoryError),
    /// Event lookup failed.
    #[error(transparent)]
    Events(#[from] EventRepositoryError),
}

/// Result type for timeline queries.
pub type TimelineResult<T> = Result<T, TimelineError>;

/// Reads timeline pages for existing runs.
#[derive(Clone)]
pub struct TimelineService<R, E>
where
    R: RunRepository,
    E: EventRepository,
{
    runs: Arc<R>,
    events: Arc<E>,
}

impl<R, E> TimelineService<R, E>
where
    R: RunRepository,
    E: EventRepository,
{
    /// Creates a timeline service.
    #[must_use]
    pub const fn new(runs: Arc<R>, events: Arc<E>) -> Self {
        Self { runs, events }
    }

    /// Returns one page of the run's timeline.
    ///
    /// One extra event is requested beyond the page size to learn whether
    /// another page exists.
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError::RunNotFound`] for an unknown run, or the
    /// underlying repository error.
    pub fn timeline(&self, query: TimelineQuery) -> TimelineResult<Timeline> {
        if self.runs.find_by_id(query.run_id)?.is_none() {
            return Err(TimelineError::RunNotFound(query.run_id));
        }

        let mut page =
            self.events
                .find_by_run(query.run_id, query.since, query.limit.saturating_add(1))?;
        let has_more = page.len() > query.limit;
        page.truncate(query.limit);

        let latest_event_id = page.last().map(Event::id);
        Ok(Timeline {
            run_id: query.run_id,
            events: page.into_iter().map(TimelineEntry::from).collect(),
            latest_event_id,
            has_more,
        })
    }
}
