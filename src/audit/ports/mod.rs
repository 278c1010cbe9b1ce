//! Port contracts for the audit log.

pub mod repository;

pub use repository::{EventRepository, EventRepositoryError, EventRepositoryResult};
