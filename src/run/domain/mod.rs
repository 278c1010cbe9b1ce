//! Domain model for runs and tasks.

mod error;
mod ids;
mod run;
mod task;

pub use error::{ParseRunStatusError, ParseTaskStatusError, RunDomainError};
pub use ids::{RunId, TaskId, WorkerId};
pub use run::{Run, RunStatus, RunTransitionError};
pub use task::{Task, TaskStatus, TaskTransition, TaskTransitionError};
