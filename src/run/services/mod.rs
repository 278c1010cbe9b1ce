//! Application services for run and task lifecycles.

mod run_lifecycle;
mod task_lifecycle;

pub use run_lifecycle::{
    CreateRunRequest, RunLifecycleError, RunLifecycleResult, RunLifecycleService,
};
pub use task_lifecycle::{
    CreateTaskRequest, TaskLifecycleError, TaskLifecycleResult, TaskLifecycleService,
};
