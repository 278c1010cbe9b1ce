//! Error types for run and task validation.

use super::{RunId, RunStatus, TaskId, TaskStatus, TaskTransition};
use thiserror::Error;

/// Errors returned while constructing or transitioning runs and tasks.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RunDomainError {
    /// The run goal is empty after trimming.
    #[error("run goal must not be empty")]
    EmptyGoal,

    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTaskTitle,

    /// The worker identifier is empty after trimming.
    #[error("worker identifier must not be empty")]
    EmptyWorkerId,

    /// The run transition is not in the run transition table.
    #[error("cannot transition run {run_id} from {from} to {to}")]
    InvalidRunTransition {
        /// Run whose transition was rejected.
        run_id: RunId,
        /// Status at the time of the attempt.
        from: RunStatus,
        /// Requested status.
        to: RunStatus,
    },

    /// The task transition is not legal from the task's current status.
    #[error("cannot {transition} task {task_id} in {from} status")]
    InvalidTaskTransition {
        /// Task whose transition was rejected.
        task_id: TaskId,
        /// Status at the time of the attempt.
        from: TaskStatus,
        /// Requested transition.
        transition: TaskTransition,
    },
}

/// Error returned while parsing run statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown run status: {0}")]
pub struct ParseRunStatusError(pub String);

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);
