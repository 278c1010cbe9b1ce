//! Service layer for starting and finishing runs.

use crate::audit::{
    domain::{EventType, event_data},
    ports::{EventRepository, EventRepositoryError},
    services::EventLog,
};
use crate::run::{
    domain::{Run, RunDomainError, RunId},
    ports::{RunRepository, RunRepositoryError},
};
use camino::Utf8PathBuf;
use mockable::Clock;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

/// Request payload for starting a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRunRequest {
    goal: String,
    repo_root: Utf8PathBuf,
    branch: Option<String>,
}

impl CreateRunRequest {
    /// Creates a request for a goal in a repository.
    #[must_use]
    pub fn new(goal: impl Into<String>, repo_root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            goal: goal.into(),
            repo_root: repo_root.into(),
            branch: None,
        }
    }

    /// Sets the working branch.
    #[must_use]
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }
}

/// Service-level errors for run lifecycle operations.
#[derive(Debug, Error)]
pub enum RunLifecycleError {
    /// Domain validation or transition failed.
    #[error(transparent)]
    Domain(#[from] RunDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] RunRepositoryError),
    /// The event could not be recorded.
    #[error(transparent)]
    Events(#[from] EventRepositoryError),
    /// The run does not exist.
    #[error("run not found: {0}")]
    NotFound(RunId),
}

/// Result type for run lifecycle operations.
pub type RunLifecycleResult<T> = Result<T, RunLifecycleError>;

/// Run lifecycle orchestration service.
pub struct RunLifecycleService<R, E, C>
where
    R: RunRepository,
    E: EventRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    events: Arc<EventLog<E, C>>,
    clock: Arc<C>,
}

impl<R, E, C> Clone for RunLifecycleService<R, E, C>
where
    R: RunRepository,
    E: EventRepository,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            events: Arc::clone(&self.events),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R, E, C> RunLifecycleService<R, E, C>
where
    R: RunRepository,
    E: EventRepository,
    C: Clock + Send + Sync,
{
    /// Creates a run lifecycle service.
    #[must_use]
    pub const fn new(repository: Arc<R>, events: Arc<EventLog<E, C>>, clock: Arc<C>) -> Self {
        Self {
            repository,
            events,
            clock,
        }
    }

    /// Creates and starts a run, then records `run.started`.
    ///
    /// # Errors
    ///
    /// Returns [`RunLifecycleError`] when the goal is blank, the repository
    /// rejects the run or the event cannot be recorded.
    pub fn create_run(&self, request: CreateRunRequest) -> RunLifecycleResult<Run> {
        let mut run = Run::new(request.goal, request.repo_root, &*self.clock)?;
        if let Some(branch) = request.branch {
            run.set_branch(branch, &*self.clock);
        }
        run.start(&*self.clock)?;
        self.repository.store(&run)?;

        tracing::info!(run_id = %run.id(), goal = run.goal(), "run started");
        self.events.append(
            run.id(),
            EventType::RunStarted,
            event_data(json!({
                "goal": run.goal(),
                "repo_root": run.repo_root(),
                "branch": run.branch(),
            })),
        )?;
        Ok(run)
    }

    /// Completes a running run and records `run.completed`.
    ///
    /// # Errors
    ///
    /// Returns [`RunLifecycleError::NotFound`] for an unknown run or
    /// [`RunLifecycleError::Domain`] when the run is not running.
    pub fn complete(&self, run_id: RunId) -> RunLifecycleResult<Run> {
        let mut run = self.load(run_id)?;
        run.complete(&*self.clock)?;
        self.persist(run, EventType::RunCompleted, json!({}))
    }

    /// Fails a running run and records `run.failed` with the reason.
    ///
    /// # Errors
    ///
    /// Returns [`RunLifecycleError::NotFound`] for an unknown run or
    /// [`RunLifecycleError::Domain`] when the run is not running.
    pub fn fail(&self, run_id: RunId, reason: &str) -> RunLifecycleResult<Run> {
        let mut run = self.load(run_id)?;
        run.fail(&*self.clock)?;
        self.persist(run, EventType::RunFailed, json!({ "message": reason }))
    }

    /// Cancels an active run and records `run.cancelled`.
    ///
    /// # Errors
    ///
    /// Returns [`RunLifecycleError::NotFound`] for an unknown run or
    /// [`RunLifecycleError::Domain`] when the run is already terminal.
    pub fn cancel(&self, run_id: RunId) -> RunLifecycleResult<Run> {
        let mut run = self.load(run_id)?;
        run.cancel(&*self.clock)?;
        self.persist(run, EventType::RunCancelled, json!({}))
    }

    /// Finds a run by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RunLifecycleError::Repository`] when lookup fails.
    pub fn find(&self, run_id: RunId) -> RunLifecycleResult<Option<Run>> {
        Ok(self.repository.find_by_id(run_id)?)
    }

    /// Returns every pending or running run.
    ///
    /// # Errors
    ///
    /// Returns [`RunLifecycleError::Repository`] when lookup fails.
    pub fn list_active(&self) -> RunLifecycleResult<Vec<Run>> {
        Ok(self.repository.find_active()?)
    }

    /// Returns up to `limit` runs, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`RunLifecycleError::Repository`] when lookup fails.
    pub fn list_recent(&self, limit: usize) -> RunLifecycleResult<Vec<Run>> {
        Ok(self.repository.list_recent(limit)?)
    }

    fn load(&self, run_id: RunId) -> RunLifecycleResult<Run> {
        self.repository
            .find_by_id(run_id)?
            .ok_or(RunLifecycleError::NotFound(run_id))
    }

    fn persist(
        &self,
        run: Run,
        event_type: EventType,
        data: serde_json::Value,
    ) -> RunLifecycleResult<Run> {
        self.repository.update(&run)?;
        tracing::info!(run_id = %run.id(), status = %run.status(), "run status changed");
        self.events.append(run.id(), event_type, event_data(data))?;
        Ok(run)
    }
}
