//! Task aggregate and its transition rules.

use super::{ParseTaskStatusError, RunDomainError, RunId, TaskId, WorkerId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Task lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task is waiting for a worker.
    Pending,
    /// Task is owned by a worker and being worked on.
    InProgress,
    /// Task finished successfully.
    Completed,
    /// Task finished with an error.
    Failed,
    /// Task is waiting on an approval or another dependency.
    Blocked,
}

/// Named operation that moves a task between statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskTransition {
    /// `Pending -> InProgress`, recording the owner.
    Assign,
    /// `InProgress -> Blocked`.
    Block,
    /// `Blocked -> InProgress`.
    Unblock,
    /// `InProgress -> Completed`.
    Complete,
    /// `InProgress -> Failed`.
    Fail,
}

impl TaskTransition {
    /// Returns the status a successful transition lands in.
    #[must_use]
    pub const fn target(self) -> TaskStatus {
        match self {
            Self::Assign | Self::Unblock => TaskStatus::InProgress,
            Self::Block => TaskStatus::Blocked,
            Self::Complete => TaskStatus::Completed,
            Self::Fail => TaskStatus::Failed,
        }
    }

    /// Returns the only status the transition may start from.
    #[must_use]
    pub const fn source(self) -> TaskStatus {
        match self {
            Self::Assign => TaskStatus::Pending,
            Self::Block | Self::Complete | Self::Fail => TaskStatus::InProgress,
            Self::Unblock => TaskStatus::Blocked,
        }
    }

    /// Returns the verb used in messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Assign => "assign",
            Self::Block => "block",
            Self::Unblock => "unblock",
            Self::Complete => "complete",
            Self::Fail => "fail",
        }
    }
}

impl fmt::Display for TaskTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status-level rejection of a task transition.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("cannot {transition} task in {from} status")]
pub struct TaskTransitionError {
    /// Status at the time of the attempt.
    pub from: TaskStatus,
    /// Requested transition.
    pub transition: TaskTransition,
}

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Blocked => "blocked",
        }
    }

    /// Applies a transition, returning the new status.
    ///
    /// # Errors
    ///
    /// Returns [`TaskTransitionError`] when the transition does not start
    /// from this status.
    pub fn apply(self, transition: TaskTransition) -> Result<Self, TaskTransitionError> {
        if self == transition.source() {
            Ok(transition.target())
        } else {
            Err(TaskTransitionError {
                from: self,
                transition,
            })
        }
    }

    /// Returns `true` for completed and failed tasks.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "blocked" => Ok(Self::Blocked),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit of work inside a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    run_id: RunId,
    title: String,
    description: String,
    status: TaskStatus,
    owner: Option<WorkerId>,
    priority: i32,
    input_refs: Vec<String>,
    output_refs: Vec<String>,
    error_message: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a pending task for a run.
    ///
    /// # Errors
    ///
    /// Returns [`RunDomainError::EmptyTaskTitle`] when the title is blank.
    pub fn new(
        run_id: RunId,
        title: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<Self, RunDomainError> {
        let raw_title = title.into();
        let trimmed = raw_title.trim();
        if trimmed.is_empty() {
            return Err(RunDomainError::EmptyTaskTitle);
        }

        let timestamp = clock.utc();
        Ok(Self {
            id: TaskId::new(),
            run_id,
            title: trimmed.to_owned(),
            description: String::new(),
            status: TaskStatus::Pending,
            owner: None,
            priority: 0,
            input_refs: Vec::new(),
            output_refs: Vec::new(),
            error_message: None,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the priority; higher values are more urgent.
    #[must_use]
    pub const fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the input references.
    #[must_use]
    pub fn with_input_refs(mut self, refs: impl IntoIterator<Item = String>) -> Self {
        self.input_refs = refs.into_iter().collect();
        self
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning run.
    #[must_use]
    pub const fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description, empty when none was given.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the current status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the owning worker once assigned.
    #[must_use]
    pub const fn owner(&self) -> Option<&WorkerId> {
        self.owner.as_ref()
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> i32 {
        self.priority
    }

    /// Returns the input references.
    #[must_use]
    pub fn input_refs(&self) -> &[String] {
        &self.input_refs
    }

    /// Returns the output references.
    #[must_use]
    pub fn output_refs(&self) -> &[String] {
        &self.output_refs
    }

    /// Returns the block or failure reason, if any.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest change timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Assigns the task to a worker.
    ///
    /// # Errors
    ///
    /// Returns [`RunDomainError::InvalidTaskTransition`] unless pending.
    pub fn assign(&mut self, worker: WorkerId, clock: &impl Clock) -> Result<(), RunDomainError> {
        self.apply(TaskTransition::Assign, clock)?;
        self.owner = Some(worker);
        Ok(())
    }

    /// Blocks the task; a non-empty reason is kept as the error message.
    ///
    /// # Errors
    ///
    /// Returns [`RunDomainError::InvalidTaskTransition`] unless in progress.
    pub fn block(&mut self, reason: &str, clock: &impl Clock) -> Result<(), RunDomainError> {
        self.apply(TaskTransition::Block, clock)?;
        if !reason.is_empty() {
            self.error_message = Some(reason.to_owned());
        }
        Ok(())
    }

    /// Resumes a blocked task and clears its reason.
    ///
    /// # Errors
    ///
    /// Returns [`RunDomainError::InvalidTaskTransition`] unless blocked.
    pub fn unblock(&mut self, clock: &impl Clock) -> Result<(), RunDomainError> {
        self.apply(TaskTransition::Unblock, clock)?;
        self.error_message = None;
        Ok(())
    }

    /// Completes the task and appends output references.
    ///
    /// # Errors
    ///
    /// Returns [`RunDomainError::InvalidTaskTransition`] unless in progress.
    pub fn complete(
        &mut self,
        output_refs: impl IntoIterator<Item = String>,
        clock: &impl Clock,
    ) -> Result<(), RunDomainError> {
        self.apply(TaskTransition::Complete, clock)?;
        self.output_refs.extend(output_refs);
        Ok(())
    }

    /// Fails the task with a reason.
    ///
    /// # Errors
    ///
    /// Returns [`RunDomainError::InvalidTaskTransition`] unless in progress.
    pub fn fail(
        &mut self,
        message: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<(), RunDomainError> {
        self.apply(TaskTransition::Fail, clock)?;
        self.error_message = Some(message.into());
        Ok(())
    }

    fn apply(
        &mut self,
        transition: TaskTransition,
        clock: &impl Clock,
    ) -> Result<(), RunDomainError> {
        self.status = self.status.apply(transition).map_err(|err| {
            RunDomainError::InvalidTaskTransition {
                task_id: self.id,
                from: err.from,
                transition: err.transition,
            }
        })?;
        self.updated_at = clock.utc();
        Ok(())
    }
}
