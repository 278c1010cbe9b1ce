//! Port contracts for run and task persistence.

pub mod repository;

pub use repository::{RunRepository, RunRepositoryError, RunRepositoryResult, TaskRepository};
