//! Run aggregate and its status machine.

use super::{ParseRunStatusError, RunDomainError, RunId};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Run lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Run has been created but not started.
    Pending,
    /// Run is executing.
    Running,
    /// Run reached its goal.
    Completed,
    /// Run stopped because of an error.
    Failed,
    /// Run was stopped by an operator.
    Cancelled,
}

/// Status-level rejection of a run transition.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("cannot transition from {from} to {to}")]
pub struct RunTransitionError {
    /// Status at the time of the attempt.
    pub from: RunStatus,
    /// Requested status.
    pub to: RunStatus,
}

impl RunStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns whether the run transition table contains `self -> target`.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Running | Self::Cancelled)
                | (Self::Running, Self::Completed | Self::Failed | Self::Cancelled)
        )
    }

    /// Applies a transition, returning the new status.
    ///
    /// # Errors
    ///
    /// Returns [`RunTransitionError`] when the transition is not in the
    /// table. Terminal statuses reject every transition.
    pub const fn apply(self, target: Self) -> Result<Self, RunTransitionError> {
        if self.can_transition_to(target) {
            Ok(target)
        } else {
            Err(RunTransitionError {
                from: self,
                to: target,
            })
        }
    }

    /// Returns `true` for pending and running runs.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Running)
    }

    /// Returns `true` for runs that can no longer change.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !self.is_active()
    }
}

impl TryFrom<&str> for RunStatus {
    type Error = ParseRunStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "running" => Ok(Self::Running),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseRunStatusError(value.to_owned())),
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Run aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    id: RunId,
    goal: String,
    status: RunStatus,
    repo_root: Utf8PathBuf,
    branch: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Run {
    /// Creates a pending run.
    ///
    /// # Errors
    ///
    /// Returns [`RunDomainError::EmptyGoal`] when the goal is blank.
    pub fn new(
        goal: impl Into<String>,
        repo_root: impl Into<Utf8PathBuf>,
        clock: &impl Clock,
    ) -> Result<Self, RunDomainError> {
        let raw_goal = goal.into();
        let trimmed = raw_goal.trim();
        if trimmed.is_empty() {
            return Err(RunDomainError::EmptyGoal);
        }

        let timestamp = clock.utc();
        Ok(Self {
            id: RunId::new(),
            goal: trimmed.to_owned(),
            status: RunStatus::Pending,
            repo_root: repo_root.into(),
            branch: None,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Returns the run identifier.
    #[must_use]
    pub const fn id(&self) -> RunId {
        self.id
    }

    /// Returns the goal text.
    #[must_use]
    pub fn goal(&self) -> &str {
        &self.goal
    }

    /// Returns the current status.
    #[must_use]
    pub const fn status(&self) -> RunStatus {
        self.status
    }

    /// Returns the repository root the run operates on.
    #[must_use]
    pub fn repo_root(&self) -> &Utf8Path {
        &self.repo_root
    }

    /// Returns the working branch, if one was recorded.
    #[must_use]
    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref()
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

    /// Returns `true` while the run is pending or running.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Records the working branch.
    pub fn set_branch(&mut self, branch: impl Into<String>, clock: &impl Clock) {
        self.branch = Some(branch.into());
        self.touch(clock);
    }

    /// Starts the run (`Pending -> Running`).
    ///
    /// # Errors
    ///
    /// Returns [`RunDomainError::InvalidRunTransition`] from any other status.
    pub fn start(&mut self, clock: &impl Clock) -> Result<(), RunDomainError> {
        self.transition_to(RunStatus::Running, clock)
    }

    /// Completes the run (`Running -> Completed`).
    ///
    /// # Errors
    ///
    /// Returns [`RunDomainError::InvalidRunTransition`] from any other status.
    pub fn complete(&mut self, clock: &impl Clock) -> Result<(), RunDomainError> {
        self.transition_to(RunStatus::Completed, clock)
    }

    /// Fails the run (`Running -> Failed`).
    ///
    /// # Errors
    ///
    /// Returns [`RunDomainError::InvalidRunTransition`] from any other status.
    pub fn fail(&mut self, clock: &impl Clock) -> Result<(), RunDomainError> {
        self.transition_to(RunStatus::Failed, clock)
    }

    /// Cancels a pending or running run.
    ///
    /// # Errors
    ///
    /// Returns [`RunDomainError::InvalidRunTransition`] from terminal statuses.
    pub fn cancel(&mut self, clock: &impl Clock) -> Result<(), RunDomainError> {
        self.transition_to(RunStatus::Cancelled, clock)
    }

    /// Moves the run to `target` when the transition table allows it.
    ///
    /// # Errors
    ///
    /// Returns [`RunDomainError::InvalidRunTransition`] naming both statuses.
    pub fn transition_to(
        &mut self,
        target: RunStatus,
        clock: &impl Clock,
    ) -> Result<(), RunDomainError> {
        self.status = self
            .status
            .apply(target)
            .map_err(|err| RunDomainError::InvalidRunTransition {
                run_id: self.id,
                from: err.from,
                to: err.to,
            })?;
        self.touch(clock);
        Ok(())
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
