//! Service layer for task creation and transitions.

use crate::audit::{
    domain::{EventType, event_data},
    ports::{EventRepository, EventRepositoryError},
    services::EventLog,
};
use crate::run::{
    domain::{RunDomainError, RunId, Task, TaskId, WorkerId},
    ports::{RunRepository, RunRepositoryError, TaskRepository},
};
use mockable::Clock;
use serde_json::{Value, json};
use std::cmp::Reverse;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

/// Request payload for creating a task in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    run_id: RunId,
    title: String,
    description: Option<String>,
    priority: i32,
    input_refs: Vec<String>,
}

impl CreateTaskRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(run_id: RunId, title: impl Into<String>) -> Self {
        Self {
            run_id,
            title: title.into(),
            description: None,
            priority: 0,
            input_refs: Vec::new(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Sets input references.
    #[must_use]
    pub fn with_input_refs(mut self, refs: impl IntoIterator<Item = String>) -> Self {
        self.input_refs = refs.into_iter().collect();
        self
    }
}

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// Domain validation or transition failed.
    #[error(transparent)]
    Domain(#[from] RunDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] RunRepositoryError),
    /// The event could not be recorded.
    #[error(transparent)]
    Events(#[from] EventRepositoryError),
    /// The owning run does not exist.
    #[error("run not found: {0}")]
    RunNotFound(RunId),
    /// The owning run has already finished.
    #[error("run {0} is not active")]
    RunNotActive(RunId),
    /// The task does not exist.
    #[error("task not found: {0}")]
    NotFound(TaskId),
}

/// Result type for task lifecycle operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Task lifecycle orchestration service.
///
/// Transitions are serialized across the service and all of its clones, so
/// two concurrent changes to one task cannot both apply.
pub struct TaskLifecycleService<T, R, E, C>
where
    T: TaskRepository,
    R: RunRepository,
    E: EventRepository,
    C: Clock + Send + Sync,
{
    tasks: Arc<T>,
    runs: Arc<R>,
    events: Arc<EventLog<E, C>>,
    clock: Arc<C>,
    transitions: Arc<Mutex<()>>,
}

impl<T, R, E, C> Clone for TaskLifecycleService<T, R, E, C>
where
    T: TaskRepository,
    R: RunRepository,
    E: EventRepository,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            tasks: Arc::clone(&self.tasks),
            runs: Arc::clone(&self.runs),
            events: Arc::clone(&self.events),
            clock: Arc::clone(&self.clock),
            transitions: Arc::clone(&self.transitions),
        }
    }
}

impl<T, R, E, C> TaskLifecycleService<T, R, E, C>
where
    T: TaskRepository,
    R: RunRepository,
    E: EventRepository,
    C: Clock + Send + Sync,
{
    /// Creates a task lifecycle service.
    #[must_use]
    pub fn new(
        tasks: Arc<T>,
        runs: Arc<R>,
        events: Arc<EventLog<E, C>>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            tasks,
            runs,
            events,
            clock,
            transitions: Arc::new(Mutex::new(())),
        }
    }

    /// Creates a pending task in an active run and records `task.created`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::RunNotFound`] or
    /// [`TaskLifecycleError::RunNotActive`] when the run cannot take new
    /// work, and [`TaskLifecycleError::Domain`] for a blank title.
    pub fn create_task(&self, request: CreateTaskRequest) -> TaskLifecycleResult<Task> {
        let run = self
            .runs
            .find_by_id(request.run_id)?
            .ok_or(TaskLifecycleError::RunNotFound(request.run_id))?;
        if !run.is_active() {
            return Err(TaskLifecycleError::RunNotActive(run.id()));
        }

        let mut task = Task::new(run.id(), request.title, &*self.clock)?
            .with_priority(request.priority)
            .with_input_refs(request.input_refs);
        if let Some(description) = request.description {
            task = task.with_description(description);
        }
        self.tasks.store(&task)?;

        self.record(
            &task,
            EventType::TaskCreated,
            json!({ "task_id": task.id(), "title": task.title(), "priority": task.priority() }),
        )?;
        Ok(task)
    }

    /// Assigns a pending task to a worker and records `task.assigned`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for an unknown task or
    /// [`TaskLifecycleError::Domain`] when the task is not pending.
    pub fn assign(&self, task_id: TaskId, worker: WorkerId) -> TaskLifecycleResult<Task> {
        let _guard = self.lock();
        let mut task = self.load(task_id)?;
        task.assign(worker.clone(), &*self.clock)?;
        self.persist(
            task,
            EventType::TaskAssigned,
            json!({ "task_id": task_id, "worker_id": worker }),
        )
    }

    /// Blocks an in-progress task and records `task.blocked`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for an unknown task or
    /// [`TaskLifecycleError::Domain`] when the task is not in progress.
    pub fn block(&self, task_id: TaskId, reason: &str) -> TaskLifecycleResult<Task> {
        let _guard = self.lock();
        let mut task = self.load(task_id)?;
        task.block(reason, &*self.clock)?;
        self.persist(
            task,
            EventType::TaskBlocked,
            json!({ "task_id": task_id, "reason": reason }),
        )
    }

    /// Resumes a blocked task and records `task.unblocked`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for an unknown task or
    /// [`TaskLifecycleError::Domain`] when the task is not blocked.
    pub fn unblock(&self, task_id: TaskId) -> TaskLifecycleResult<Task> {
        let _guard = self.lock();
        let mut task = self.load(task_id)?;
        task.unblock(&*self.clock)?;
        self.persist(task, EventType::TaskUnblocked, json!({ "task_id": task_id }))
    }

    /// Completes an in-progress task and records `task.completed`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for an unknown task or
    /// [`TaskLifecycleError::Domain`] when the task is not in progress.
    pub fn complete(&self, task_id: TaskId, output_refs: &[String]) -> TaskLifecycleResult<Task> {
        let _guard = self.lock();
        let mut task = self.load(task_id)?;
        task.complete(output_refs.iter().cloned(), &*self.clock)?;
        self.persist(
            task,
            EventType::TaskCompleted,
            json!({ "task_id": task_id, "output_refs": output_refs }),
        )
    }

    /// Fails an in-progress task and records `task.failed`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for an unknown task or
    /// [`TaskLifecycleError::Domain`] when the task is not in progress.
    pub fn fail(&self, task_id: TaskId, message: &str) -> TaskLifecycleResult<Task> {
        let _guard = self.lock();
        let mut task = self.load(task_id)?;
        task.fail(message, &*self.clock)?;
        self.persist(
            task,
            EventType::TaskFailed,
            json!({ "task_id": task_id, "message": message }),
        )
    }

    /// Finds a task by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when lookup fails.
    pub fn find(&self, task_id: TaskId) -> TaskLifecycleResult<Option<Task>> {
        Ok(self.tasks.find_by_id(task_id)?)
    }

    /// Returns the tasks of a run, most urgent first.
    ///
    /// Tasks with equal priority keep their creation order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when lookup fails.
    pub fn list_for_run(&self, run_id: RunId) -> TaskLifecycleResult<Vec<Task>> {
        let mut tasks = self.tasks.find_by_run(run_id)?;
        tasks.sort_by_key(|task| Reverse(task.priority()));
        Ok(tasks)
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.transitions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn load(&self, task_id: TaskId) -> TaskLifecycleResult<Task> {
        self.tasks
            .find_by_id(task_id)?
            .ok_or(TaskLifecycleError::NotFound(task_id))
    }

    fn persist(&self, task: Task, event_type: EventType, data: Value) -> TaskLifecycleResult<Task> {
        self.tasks.update(&task)?;
        self.record(&task, event_type, data)?;
        Ok(task)
    }

    fn record(&self, task: &Task, event_type: EventType, data: Value) -> TaskLifecycleResult<()> {
        tracing::debug!(
            task_id = %task.id(),
            run_id = %task.run_id(),
            status = %task.status(),
            "task status changed"
        );
        self.events
            .append(task.run_id(), event_type, event_data(data))?;
        Ok(())
    }
}
