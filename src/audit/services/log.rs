//! Event log facade with in-process listeners.

use crate::audit::{
    domain::{Event, EventData, EventId, EventType, NewEvent},
    ports::{EventRepository, EventRepositoryResult},
};
use crate::run::domain::RunId;
use mockable::Clock;
use std::sync::{Arc, PoisonError, RwLock};

/// Callback invoked synchronously after every successful append.
pub type EventListener = Arc<dyn Fn(&Event) + Send + Sync>;

/// Records events and fans them out to listeners owned by this instance.
///
/// There is no process-wide bus: whoever needs notifications subscribes on
/// the log they were handed.
pub struct EventLog<R, C>
where
    R: EventRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
    listeners: RwLock<Vec<EventListener>>,
}

impl<R, C> EventLog<R, C>
where
    R: EventRepository,
    C: Clock + Send + Sync,
{
    /// Creates an event log over a repository.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self {
            repository,
            clock,
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// Returns the underlying repository for read-side queries.
    #[must_use]
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Registers a listener for every subsequent append.
    pub fn subscribe(&self, listener: impl Fn(&Event) + Send + Sync + 'static) {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(listener));
    }

    /// Appends an event and notifies listeners.
    ///
    /// # Errors
    ///
    /// Returns the repository error when the event could not be stored; in
    /// that case no listener is called.
    pub fn append(
        &self,
        run_id: RunId,
        event_type: EventType,
        data: EventData,
    ) -> EventRepositoryResult<Event> {
        let event = self
            .repository
            .append(NewEvent::new(run_id, event_type, data, &*self.clock))?;
        tracing::debug!(
            event_id = %event.id(),
            run_id = %run_id,
            event_type = %event_type,
            "event appended"
        );

        let listeners: Vec<EventListener> = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for listener in listeners {
            listener(&event);
        }
        Ok(event)
    }

    /// Returns events of a run after an optional cursor, ascending.
    ///
    /// # Errors
    ///
    /// Propagates repository failures.
    pub fn find_by_run(
        &self,
        run_id: RunId,
        since: Option<EventId>,
        limit: usize,
    ) -> EventRepositoryResult<Vec<Event>> {
        self.repository.find_by_run(run_id, since, limit)
    }

    /// Returns the highest identity recorded for a run.
    ///
    /// # Errors
    ///
    /// Propagates repository failures.
    pub fn latest_id(&self, run_id: RunId) -> EventRepositoryResult<Option<EventId>> {
        self.repository.latest_id(run_id)
    }
}
