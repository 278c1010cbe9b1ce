//! Requesting and resolving approvals.

use crate::approval::{
    domain::{
        Approval, ApprovalDecision, ApprovalDomainError, ApprovalId, ApprovalType, Resolution,
    },
    ports::{ApprovalRepository, ApprovalRepositoryError},
};
use crate::audit::{
    domain::{EventType, event_data},
    ports::{EventRepository, EventRepositoryError},
    services::EventLog,
};
use crate::run::domain::{RunId, TaskId, WorkerId};
use chrono::Duration;
use mockable::Clock;
use serde_json::json;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

/// Request payload for creating an approval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalRequest {
    run_id: RunId,
    approval_type: ApprovalType,
    target: String,
    diff: Option<String>,
    worker: Option<WorkerId>,
    task_id: Option<TaskId>,
    ttl: Option<Duration>,
}

impl ApprovalRequest {
    /// Creates a request for an action on a target.
    #[must_use]
    pub fn new(run_id: RunId, approval_type: ApprovalType, target: impl Into<String>) -> Self {
        Self {
            run_id,
            approval_type,
            target: target.into(),
            diff: None,
            worker: None,
            task_id: None,
            ttl: None,
        }
    }

    /// Attaches the proposed change.
    #[must_use]
    pub fn with_diff(mut self, diff: impl Into<String>) -> Self {
        self.diff = Some(diff.into());
        self
    }

    /// Records the requesting worker.
    #[must_use]
    pub fn with_worker(mut self, worker: WorkerId) -> Self {
        self.worker = Some(worker);
        self
    }

    /// Records the task waiting on the decision.
    #[must_use]
    pub const fn with_task(mut self, task_id: TaskId) -> Self {
        self.task_id = Some(task_id);
        self
    }

    /// Lets the approval lapse after `ttl`.
    #[must_use]
    pub const fn expires_in(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }
}

/// Service-level errors for the approval workflow.
#[derive(Debug, Error)]
pub enum ApprovalWorkflowError {
    /// Domain validation or transition failed.
    #[error(transparent)]
    Domain(#[from] ApprovalDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] ApprovalRepositoryError),
    /// The event could not be recorded.
    #[error(transparent)]
    Events(#[from] EventRepositoryError),
    /// The approval does not exist.
    #[error("approval not found: {0}")]
    NotFound(ApprovalId),
}

/// Result type for approval workflow operations.
pub type ApprovalWorkflowResult<T> = Result<T, ApprovalWorkflowError>;

/// Approval workflow orchestration service.
///
/// State changes of one service instance are serialized, so two concurrent
/// resolutions of the same approval cannot both succeed.
pub struct ApprovalWorkflowService<A, E, C>
where
    A: ApprovalRepository,
    E: EventRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<A>,
    events: Arc<EventLog<E, C>>,
    clock: Arc<C>,
    transitions: Mutex<()>,
}

impl<A, E, C> ApprovalWorkflowService<A, E, C>
where
    A: ApprovalRepository,
    E: EventRepository,
    C: Clock + Send + Sync,
{
    /// Creates an approval workflow service.
    #[must_use]
    pub const fn new(repository: Arc<A>, events: Arc<EventLog<E, C>>, clock: Arc<C>) -> Self {
        Self {
            repository,
            events,
            clock,
            transitions: Mutex::new(()),
        }
    }

    /// Creates a pending approval and records `approval.requested`.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalWorkflowError::Domain`] for a blank target or the
    /// repository or event error when persisting fails.
    pub fn request(&self, request: ApprovalRequest) -> ApprovalWorkflowResult<Approval> {
        let mut approval = Approval::new(
            request.run_id,
            request.approval_type,
            request.target,
            &*self.clock,
        )?;
        if let Some(diff) = request.diff {
            approval = approval.with_diff(diff);
        }
        if let Some(worker) = request.worker {
            approval = approval.with_requester_worker(worker);
        }
        if let Some(task_id) = request.task_id {
            approval = approval.with_requester_task(task_id);
        }
        if let Some(deadline) = request
            .ttl
            .and_then(|ttl| approval.created_at().checked_add_signed(ttl))
        {
            approval = approval.with_expiry(deadline);
        }
        self.repository.store(&approval)?;

        tracing::info!(
            approval_id = %approval.id(),
            run_id = %approval.run_id(),
            approval_type = %approval.approval_type(),
            risk_score = approval.risk_score(),
            "approval requested"
        );
        self.events.append(
            approval.run_id(),
            EventType::ApprovalRequested,
            event_data(json!({
                "approval_id": approval.id(),
                "type": approval.approval_type(),
                "target": approval.target(),
                "risk_score": approval.risk_score(),
                "risk_reason": approval.risk_reason(),
                "task_id": approval.requester_task_id(),
            })),
        )?;
        Ok(approval)
    }

    /// Approves a pending approval.
    ///
    /// # Errors
    ///
    /// See [`ApprovalWorkflowService::resolve`].
    pub fn approve(
        &self,
        approval_id: ApprovalId,
        resolved_by: &str,
        comment: &str,
    ) -> ApprovalWorkflowResult<Approval> {
        self.resolve(
            approval_id,
            Resolution::approve(resolved_by).with_comment(comment),
        )
    }

    /// Rejects a pending approval.
    ///
    /// # Errors
    ///
    /// See [`ApprovalWorkflowService::resolve`].
    pub fn reject(
        &self,
        approval_id: ApprovalId,
        resolved_by: &str,
        comment: &str,
    ) -> ApprovalWorkflowResult<Approval> {
        self.resolve(
            approval_id,
            Resolution::reject(resolved_by).with_comment(comment),
        )
    }

    /// Applies a decision and records `approval.approved` or
    /// `approval.rejected`.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalWorkflowError::NotFound`] for an unknown approval
    /// and [`ApprovalWorkflowError::Domain`] when it is no longer pending or
    /// has expired.
    pub fn resolve(
        &self,
        approval_id: ApprovalId,
        resolution: Resolution,
    ) -> ApprovalWorkflowResult<Approval> {
        let _guard = self
            .transitions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut approval = self.load(approval_id)?;
        let event_type = match resolution.decision {
            ApprovalDecision::Approve => EventType::ApprovalApproved,
            ApprovalDecision::Reject => EventType::ApprovalRejected,
        };
        approval.resolve(resolution, &*self.clock)?;
        self.repository.update(&approval)?;

        tracing::info!(
            approval_id = %approval_id,
            status = %approval.status(),
            resolved_by = approval.resolved_by().unwrap_or_default(),
            "approval resolved"
        );
        self.events.append(
            approval.run_id(),
            event_type,
            event_data(json!({
                "approval_id": approval_id,
                "target": approval.target(),
                "resolved_by": approval.resolved_by(),
                "comment": approval.comment(),
            })),
        )?;
        Ok(approval)
    }

    /// Marks a pending approval as expired and records `approval.expired`.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalWorkflowError::NotFound`] for an unknown approval
    /// and [`ApprovalWorkflowError::Domain`] when it is no longer pending.
    pub fn expire(&self, approval_id: ApprovalId) -> ApprovalWorkflowResult<Approval> {
        let _guard = self
            .transitions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut approval = self.load(approval_id)?;
        approval.expire(&*self.clock)?;
        self.record_expiry(&approval)?;
        Ok(approval)
    }

    /// Expires every pending approval of a run whose deadline has passed.
    ///
    /// Returns the approvals that were expired.
    ///
    /// # Errors
    ///
    /// Returns the repository or event error when persisting fails.
    pub fn expire_overdue(&self, run_id: RunId) -> ApprovalWorkflowResult<Vec<Approval>> {
        let _guard = self
            .transitions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let now = self.clock.utc();
        let mut expired = Vec::new();
        for mut approval in self.repository.find_pending_by_run(run_id)? {
            if !approval.is_expired_at(now) {
                continue;
            }
            approval.expire(&*self.clock)?;
            self.record_expiry(&approval)?;
            expired.push(approval);
        }
        Ok(expired)
    }

    /// Finds an approval by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalWorkflowError::Repository`] when lookup fails.
    pub fn find(&self, approval_id: ApprovalId) -> ApprovalWorkflowResult<Option<Approval>> {
        Ok(self.repository.find_by_id(approval_id)?)
    }

    /// Returns the pending approvals of a run.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalWorkflowError::Repository`] when lookup fails.
    pub fn pending_for_run(&self, run_id: RunId) -> ApprovalWorkflowResult<Vec<Approval>> {
        Ok(self.repository.find_pending_by_run(run_id)?)
    }

    fn load(&self, approval_id: ApprovalId) -> ApprovalWorkflowResult<Approval> {
        self.repository
            .find_by_id(approval_id)?
            .ok_or(ApprovalWorkflowError::NotFound(approval_id))
    }

    fn record_expiry(&self, approval: &Approval) -> ApprovalWorkflowResult<()> {
        self.repository.update(approval)?;
        tracing::info!(approval_id = %approval.id(), "approval expired");
        self.events.append(
            approval.run_id(),
            EventType::ApprovalExpired,
            event_data(json!({
                "approval_id": approval.id(),
                "target": approval.target(),
            })),
        )?;
        Ok(())
    }
}
