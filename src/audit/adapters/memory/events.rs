//! Vector-backed event store.

use crate::audit::{
    domain::{Event, EventId, EventType, NewEvent},
    ports::{EventRepository, EventRepositoryError, EventRepositoryResult},
};
use crate::run::domain::RunId;
use std::sync::{Arc, PoisonError, RwLock};

/// Thread-safe in-memory event repository.
///
/// Events are kept in identity order; the identity counter and the vector
/// are guarded by the same lock so concurrent appends stay gap-free.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventRepository {
    state: Arc<RwLock<InMemoryEventState>>,
}

#[derive(Debug, Default)]
struct InMemoryEventState {
    events: Vec<Event>,
    last_id: Option<EventId>,
}

impl InMemoryEventRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error<T>(err: &PoisonError<T>) -> EventRepositoryError {
    EventRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

impl EventRepository for InMemoryEventRepository {
    fn append(&self, event: NewEvent) -> EventRepositoryResult<Event> {
        let mut state = self.state.write().map_err(|err| lock_error(&err))?;
        let id = match state.last_id {
            None => EventId::FIRST,
            Some(last) => last.next().ok_or(EventRepositoryError::IdentityExhausted)?,
        };
        let stored = event.into_event(id);
        state.events.push(stored.clone());
        state.last_id = Some(id);
        Ok(stored)
    }

    fn find_by_id(&self, id: EventId) -> EventRepositoryResult<Option<Event>> {
        let state = self.state.read().map_err(|err| lock_error(&err))?;
        let found = state
            .events
            .binary_search_by_key(&id, Event::id)
            .ok()
            .and_then(|index| state.events.get(index))
            .cloned();
        Ok(found)
    }

    fn find_by_run(
        &self,
        run_id: RunId,
        since: Option<EventId>,
        limit: usize,
    ) -> EventRepositoryResult<Vec<Event>> {
        let state = self.state.read().map_err(|err| lock_error(&err))?;
        let events = state
            .events
            .iter()
            .filter(|event| event.run_id() == run_id)
            .filter(|event| since.is_none_or(|cursor| event.id() > cursor))
            .take(limit)
            .cloned()
            .collect();
        Ok(events)
    }

    fn find_by_type(
        &self,
        run_id: RunId,
        event_type: EventType,
        limit: usize,
    ) -> EventRepositoryResult<Vec<Event>> {
        let state = self.state.read().map_err(|err| lock_error(&err))?;
        let events = state
            .events
            .iter()
            .filter(|event| event.run_id() == run_id && event.event_type() == event_type)
            .take(limit)
            .cloned()
            .collect();
        Ok(events)
    }

    fn count_by_run(&self, run_id: RunId) -> EventRepositoryResult<usize> {
        let state = self.state.read().map_err(|err| lock_error(&err))?;
        Ok(state
            .events
            .iter()
            .filter(|event| event.run_id() == run_id)
            .count())
    }

    fn latest_id(&self, run_id: RunId) -> EventRepositoryResult<Option<EventId>> {
        let state = self.state.read().map_err(|err| lock_error(&err))?;
        Ok(state
            .events
            .iter()
            .rev()
            .find(|event| event.run_id() == run_id)
            .map(Event::id))
    }
}
