//! In-memory event repository.

mod events;

pub use events::InMemoryEventRepository;
