//! Repository port for audit events.

use crate::audit::domain::{Event, EventId, EventType, NewEvent};
use crate::run::domain::RunId;
use std::sync::Arc;
use thiserror::Error;

/// Result type for event repository operations.
pub type EventRepositoryResult<T> = Result<T, EventRepositoryError>;

/// Append-only event persistence contract.
///
/// Events are never updated or deleted once appended.
pub trait EventRepository: Send + Sync {
    /// Assigns the next identity to `event` and stores it.
    ///
    /// Identities start at [`EventId::FIRST`] and increase by one per call
    /// across all runs. Implementations must assign the identity and store
    /// the event atomically.
    ///
    /// # Errors
    ///
    /// Returns [`EventRepositoryError::IdentityExhausted`] when no further
    /// identity exists, or [`EventRepositoryError::Persistence`] on backend
    /// failure.
    fn append(&self, event: NewEvent) -> EventRepositoryResult<Event>;

    /// Finds an event by identity.
    fn find_by_id(&self, id: EventId) -> EventRepositoryResult<Option<Event>>;

    /// Returns events of a run with identity greater than `since`, ascending,
    /// truncated to `limit`.
    fn find_by_run(
        &self,
        run_id: RunId,
        since: Option<EventId>,
        limit: usize,
    ) -> EventRepositoryResult<Vec<Event>>;

    /// Returns the first `limit` events of one type for a run, ascending.
    fn find_by_type(
        &self,
        run_id: RunId,
        event_type: EventType,
        limit: usize,
    ) -> EventRepositoryResult<Vec<Event>>;

    /// Counts the events of a run.
    fn count_by_run(&self, run_id: RunId) -> EventRepositoryResult<usize>;

    /// Returns the highest identity recorded for a run, or `None` when the
    /// run has no events.
    fn latest_id(&self, run_id: RunId) -> EventRepositoryResult<Option<EventId>>;
}

/// Errors returned by event repository implementations.
#[derive(Debug, Clone, Error)]
pub enum EventRepositoryError {
    /// Every identity has been handed out.
    #[error("event identity space exhausted")]
    IdentityExhausted,

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl EventRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
