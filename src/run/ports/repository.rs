//! Repository ports for runs and tasks.

use crate::run::domain::{Run, RunId, Task, TaskId};
use std::sync::Arc;
use thiserror::Error;

/// Result type for run and task repository operations.
pub type RunRepositoryResult<T> = Result<T, RunRepositoryError>;

/// Run persistence contract.
pub trait RunRepository: Send + Sync {
    /// Stores a new run.
    ///
    /// # Errors
    ///
    /// Returns [`RunRepositoryError::DuplicateRun`] when the identifier
    /// already exists.
    fn store(&self, run: &Run) -> RunRepositoryResult<()>;

    /// Persists changes to an existing run.
    ///
    /// # Errors
    ///
    /// Returns [`RunRepositoryError::RunNotFound`] when the run does not
    /// exist.
    fn update(&self, run: &Run) -> RunRepositoryResult<()>;

    /// Finds a run by identifier.
    ///
    /// Returns `None` when the run does not exist.
    fn find_by_id(&self, id: RunId) -> RunRepositoryResult<Option<Run>>;

    /// Returns every pending or running run, oldest first.
    fn find_active(&self) -> RunRepositoryResult<Vec<Run>>;

    /// Returns up to `limit` runs, newest first by creation time.
    fn list_recent(&self, limit: usize) -> RunRepositoryResult<Vec<Run>>;
}

/// Task persistence contract.
pub trait TaskRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`RunRepositoryError::DuplicateTask`] when the identifier
    /// already exists.
    fn store(&self, task: &Task) -> RunRepositoryResult<()>;

    /// Persists changes to an existing task.
    ///
    /// # Errors
    ///
    /// Returns [`RunRepositoryError::TaskNotFound`] when the task does not
    /// exist.
    fn update(&self, task: &Task) -> RunRepositoryResult<()>;

    /// Finds a task by identifier.
    fn find_by_id(&self, id: TaskId) -> RunRepositoryResult<Option<Task>>;

    /// Returns every task of a run in insertion order.
    fn find_by_run(&self, run_id: RunId) -> RunRepositoryResult<Vec<Task>>;
}

/// Errors returned by run and task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum RunRepositoryError {
    /// A run with the same identifier already exists.
    #[error("duplicate run identifier: {0}")]
    DuplicateRun(RunId),

    /// The run was not found.
    #[error("run not found: {0}")]
    RunNotFound(RunId),

    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl RunRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
