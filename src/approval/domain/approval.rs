//! Approval aggregate root.

use super::{
    ApprovalDomainError, ApprovalId, ApprovalStatus, ApprovalType, RiskAssessment, assess_risk,
};
use crate::run::domain::{RunId, TaskId, WorkerId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Outcome a human chose for an approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalDecision {
    /// Allow the action.
    Approve,
    /// Refuse the action.
    Reject,
}

impl ApprovalDecision {
    /// Returns the status the decision resolves to.
    #[must_use]
    pub const fn status(self) -> ApprovalStatus {
        match self {
            Self::Approve => ApprovalStatus::Approved,
            Self::Reject => ApprovalStatus::Rejected,
        }
    }
}

/// A decision together with who made it and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Chosen outcome.
    pub decision: ApprovalDecision,
    /// Who decided, for example `user` or `auto`.
    pub resolved_by: String,
    /// Optional free-form comment, empty when none was given.
    pub comment: String,
}

impl Resolution {
    /// Creates an approving resolution.
    #[must_use]
    pub fn approve(resolved_by: impl Into<String>) -> Self {
        Self {
            decision: ApprovalDecision::Approve,
            resolved_by: resolved_by.into(),
            comment: String::new(),
        }
    }

    /// Creates a rejecting resolution.
    #[must_use]
    pub fn reject(resolved_by: impl Into<String>) -> Self {
        Self {
            decision: ApprovalDecision::Reject,
            resolved_by: resolved_by.into(),
            comment: String::new(),
        }
    }

    /// Attaches a comment.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }
}

/// A risky action awaiting, or having received, a human decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approval {
    id: ApprovalId,
    run_id: RunId,
    #[serde(rename = "type")]
    approval_type: ApprovalType,
    target: String,
    status: ApprovalStatus,
    diff_content: Option<String>,
    requester_worker_id: Option<WorkerId>,
    requester_task_id: Option<TaskId>,
    risk: RiskAssessment,
    created_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    resolved_at: Option<DateTime<Utc>>,
    resolved_by: Option<String>,
    comment: String,
}

impl Approval {
    /// Creates a pending approval and scores its risk.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalDomainError::EmptyTarget`] when the target is blank.
    pub fn new(
        run_id: RunId,
        approval_type: ApprovalType,
        target: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<Self, ApprovalDomainError> {
        let target_text = target.into();
        if target_text.trim().is_empty() {
            return Err(ApprovalDomainError::EmptyTarget);
        }

        let risk = assess_risk(approval_type, &target_text);
        Ok(Self {
            id: ApprovalId::new(),
            run_id,
            approval_type,
            target: target_text,
            status: ApprovalStatus::Pending,
            diff_content: None,
            requester_worker_id: None,
            requester_task_id: None,
            risk,
            created_at: clock.utc(),
            expires_at: None,
            resolved_at: None,
            resolved_by: None,
            comment: String::new(),
        })
    }

    /// Attaches the proposed change.
    #[must_use]
    pub fn with_diff(mut self, diff: impl Into<String>) -> Self {
        self.diff_content = Some(diff.into());
        self
    }

    /// Records the worker that asked for the action.
    #[must_use]
    pub fn with_requester_worker(mut self, worker: WorkerId) -> Self {
        self.requester_worker_id = Some(worker);
        self
    }

    /// Records the task that is blocked on the decision.
    #[must_use]
    pub const fn with_requester_task(mut self, task_id: TaskId) -> Self {
        self.requester_task_id = Some(task_id);
        self
    }

    /// Sets the instant after which the approval can no longer be resolved.
    #[must_use]
    pub const fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Returns the approval identifier.
    #[must_use]
    pub const fn id(&self) -> ApprovalId {
        self.id
    }

    /// Returns the owning run.
    #[must_use]
    pub const fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Returns the action category.
    #[must_use]
    pub const fn approval_type(&self) -> ApprovalType {
        self.approval_type
    }

    /// Returns the file path or command the action targets.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Returns the current status.
    #[must_use]
    pub const fn status(&self) -> ApprovalStatus {
        self.status
    }

    /// Returns the proposed change, if one was attached.
    #[must_use]
    pub fn diff_content(&self) -> Option<&str> {
        self.diff_content.as_deref()
    }

    /// Returns the requesting worker.
    #[must_use]
    pub const fn requester_worker_id(&self) -> Option<&WorkerId> {
        self.requester_worker_id.as_ref()
    }

    /// Returns the blocked task.
    #[must_use]
    pub const fn requester_task_id(&self) -> Option<TaskId> {
        self.requester_task_id
    }

    /// Returns the risk score.
    #[must_use]
    pub const fn risk_score(&self) -> u8 {
        self.risk.score
    }

    /// Returns the risk explanation.
    #[must_use]
    pub fn risk_reason(&self) -> &str {
        &self.risk.reason
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the expiry instant, if any.
    #[must_use]
    pub const fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Returns when the approval left the pending status.
    #[must_use]
    pub const fn resolved_at(&self) -> Option<DateTime<Utc>> {
        self.resolved_at
    }

    /// Returns who resolved the approval.
    #[must_use]
    pub fn resolved_by(&self) -> Option<&str> {
        self.resolved_by.as_deref()
    }

    /// Returns the resolver's comment.
    #[must_use]
    pub fn comment(&self) -> &str {
        &self.comment
    }

    /// Returns `true` while no decision has been recorded.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == ApprovalStatus::Pending
    }

    /// Returns whether the approval is expired at `now`.
    ///
    /// An approval is expired when its status says so or when `now` is past
    /// its expiry instant.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.status == ApprovalStatus::Expired
            || self.expires_at.is_some_and(|deadline| now > deadline)
    }

    /// Applies a human decision.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalDomainError::InvalidTransition`] when the approval
    /// is not pending, [`ApprovalDomainError::Expired`] when its expiry has
    /// passed, and [`ApprovalDomainError::EmptyResolver`] for a blank
    /// resolver.
    pub fn resolve(
        &mut self,
        resolution: Resolution,
        clock: &impl Clock,
    ) -> Result<(), ApprovalDomainError> {
        let target = resolution.decision.status();
        let next = self.checked_transition(target)?;
        let now = clock.utc();
        if self.is_expired_at(now) {
            return Err(ApprovalDomainError::Expired(self.id));
        }
        let resolver = resolution.resolved_by.trim();
        if resolver.is_empty() {
            return Err(ApprovalDomainError::EmptyResolver);
        }

        self.status = next;
        self.resolved_at = Some(now);
        self.resolved_by = Some(resolver.to_owned());
        self.comment = resolution.comment;
        Ok(())
    }

    /// Marks a pending approval as expired.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalDomainError::InvalidTransition`] unless pending.
    pub fn expire(&mut self, clock: &impl Clock) -> Result<(), ApprovalDomainError> {
        self.status = self.checked_transition(ApprovalStatus::Expired)?;
        self.resolved_at = Some(clock.utc());
        Ok(())
    }

    fn checked_transition(
        &self,
        target: ApprovalStatus,
    ) -> Result<ApprovalStatus, ApprovalDomainError> {
        self.status
            .apply(target)
            .map_err(|err| ApprovalDomainError::InvalidTransition {
                approval_id: self.id,
                from: err.from,
                to: err.to,
            })
    }
}
