//! Policy-gated tool execution with approvals and checkpoints.

use crate::approval::{
    domain::{Approval, ApprovalDomainError, ApprovalId, ApprovalStatus, Resolution},
    ports::ApprovalRepository,
    services::{ApprovalRequest, ApprovalWorkflowError, ApprovalWorkflowService},
};
use crate::audit::{
    domain::{EventType, event_data},
    ports::{EventRepository, EventRepositoryError},
    services::EventLog,
};
use crate::checkpoint::{
    domain::CheckpointId,
    ports::CheckpointStore,
    services::{CheckpointError, CheckpointManager},
};
use crate::gateway::{
    domain::{ToolCallOutcome, ToolCallRequest, approval_subject},
    ports::ToolInvoker,
};
use crate::policy::{
    domain::{PolicyDecision, match_value_for},
    services::PolicyEngine,
};
use crate::run::{
    domain::{RunId, TaskId},
    ports::{RunRepository, TaskRepository},
    services::{TaskLifecycleError, TaskLifecycleService},
};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::Duration;
use mockable::Clock;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

/// Errors raised while gating a tool call.
///
/// Tool failures are not errors; they surface as
/// [`ToolCallOutcome::Failed`].
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The event could not be recorded.
    #[error(transparent)]
    Events(#[from] EventRepositoryError),
    /// Requesting or resolving an approval failed.
    #[error(transparent)]
    Approval(#[from] ApprovalWorkflowError),
    /// Blocking or unblocking the requesting task failed.
    #[error(transparent)]
    Task(#[from] TaskLifecycleError),
    /// Tracking or checkpointing the target file failed.
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),
    /// No parked call waits on the approval.
    #[error("no tool call is waiting on approval {0}")]
    NoPendingCall(ApprovalId),
}

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Routes every tool call through the policy engine.
///
/// Allowed calls run immediately; mutating calls are checkpointed first.
/// Denied calls never reach the invoker. Calls that need a human are parked
/// until [`ToolGateway::resolve`] is called with the decision.
pub struct ToolGateway<I, A, T, R, E, S, C>
where
    I: ToolInvoker,
    A: ApprovalRepository,
    T: TaskRepository,
    R: RunRepository,
    E: EventRepository,
    S: CheckpointStore,
    C: Clock + Send + Sync,
{
    policy: Arc<PolicyEngine>,
    invoker: Arc<I>,
    approvals: Arc<ApprovalWorkflowService<A, E, C>>,
    tasks: TaskLifecycleService<T, R, E, C>,
    checkpoints: Arc<CheckpointManager<S, C>>,
    events: Arc<EventLog<E, C>>,
    approval_ttl: Option<Duration>,
    pending: Mutex<HashMap<ApprovalId, ToolCallRequest>>,
}

impl<I, A, T, R, E, S, C> ToolGateway<I, A, T, R, E, S, C>
where
    I: ToolInvoker,
    A: ApprovalRepository,
    T: TaskRepository,
    R: RunRepository,
    E: EventRepository,
    S: CheckpointStore,
    C: Clock + Send + Sync,
{
    /// Creates a gateway from its collaborators.
    #[must_use]
    pub fn new(
        policy: Arc<PolicyEngine>,
        invoker: Arc<I>,
        approvals: Arc<ApprovalWorkflowService<A, E, C>>,
        tasks: TaskLifecycleService<T, R, E, C>,
        checkpoints: Arc<CheckpointManager<S, C>>,
        events: Arc<EventLog<E, C>>,
    ) -> Self {
        Self {
            policy,
            invoker,
            approvals,
            tasks,
            checkpoints,
            events,
            approval_ttl: None,
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Gives every approval requested by the gateway a time to live.
    ///
    /// Overdue approvals are cleared by [`ToolGateway::expire_overdue`].
    #[must_use]
    pub const fn with_approval_ttl(mut self, ttl: Duration) -> Self {
        self.approval_ttl = Some(ttl);
        self
    }

    /// Records, evaluates and dispatches a tool call.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when an event, approval, task transition or
    /// checkpoint cannot be persisted.
    pub fn handle(&self, request: ToolCallRequest) -> GatewayResult<ToolCallOutcome> {
        self.events.append(
            request.run_id(),
            EventType::ToolCalled,
            event_data(json!({
                "tool": request.tool_name(),
                "args": request.args(),
                "task_id": request.task_id(),
                "worker_id": request.worker(),
            })),
        )?;

        let decision = self.policy.check(request.tool_name(), request.args());
        tracing::debug!(
            run_id = %request.run_id(),
            tool = request.tool_name(),
            decision = %decision,
            "tool call evaluated"
        );
        match decision {
            PolicyDecision::Allow => self.execute(&request),
            PolicyDecision::Deny => self.deny(&request, "denied by policy"),
            PolicyDecision::Ask => self.park(request),
        }
    }

    /// Applies a human decision to a parked call.
    ///
    /// An approved call runs without being evaluated again; a rejected one
    /// is reported as denied, and so is one whose approval expired. The
    /// requesting task is unblocked in every case. If the approval was
    /// already decided but its call never finished, the stored decision is
    /// applied and `resolution` is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NoPendingCall`] when no call waits on the
    /// approval, and [`GatewayError::Approval`] when it cannot be resolved.
    /// The call stays parked whenever an error is returned.
    pub fn resolve(
        &self,
        approval_id: ApprovalId,
        resolution: Resolution,
    ) -> GatewayResult<ToolCallOutcome> {
        let Some(request) = self.pending().remove(&approval_id) else {
            return Err(GatewayError::NoPendingCall(approval_id));
        };

        let outcome = self
            .decide(approval_id, resolution)
            .and_then(|approval| self.settle(&approval, &request));
        if outcome.is_err() {
            self.pending().insert(approval_id, request);
        }
        outcome
    }

    /// Expires the overdue approvals of a run and denies their parked calls.
    ///
    /// Calls parked on approvals that were expired elsewhere are reaped
    /// too. Returns the approvals whose calls were denied.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Approval`] when expiry fails and
    /// [`GatewayError::Events`] when a denial cannot be recorded. Calls not
    /// yet denied stay parked.
    pub fn expire_overdue(&self, run_id: RunId) -> GatewayResult<Vec<ApprovalId>> {
        self.approvals.expire_overdue(run_id)?;

        let parked: Vec<ApprovalId> = self
            .pending()
            .iter()
            .filter(|(_, request)| request.run_id() == run_id)
            .map(|(approval_id, _)| *approval_id)
            .collect();

        let mut reaped = Vec::new();
        for approval_id in parked {
            let Some(approval) = self.approvals.find(approval_id)? else {
                continue;
            };
            if approval.status() != ApprovalStatus::Expired {
                continue;
            }
            let Some(request) = self.pending().remove(&approval_id) else {
                continue;
            };
            if let Err(err) = self.settle(&approval, &request) {
                self.pending().insert(approval_id, request);
                return Err(err);
            }
            reaped.push(approval_id);
        }
        Ok(reaped)
    }

    /// Returns the approvals that still have a parked call.
    #[must_use]
    pub fn pending_calls(&self) -> Vec<ApprovalId> {
        self.pending().keys().copied().collect()
    }

    /// Restores a checkpoint and records `checkpoint.restored`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Checkpoint`] for an unknown checkpoint and
    /// [`GatewayError::Events`] when the event cannot be recorded.
    pub fn rollback(
        &self,
        run_id: RunId,
        checkpoint_id: CheckpointId,
    ) -> GatewayResult<Vec<Utf8PathBuf>> {
        let restored = self.checkpoints.restore(checkpoint_id)?;
        self.events.append(
            run_id,
            EventType::CheckpointRestored,
            event_data(json!({
                "checkpoint_id": checkpoint_id,
                "paths": restored,
            })),
        )?;
        Ok(restored)
    }

    fn execute(&self, request: &ToolCallRequest) -> GatewayResult<ToolCallOutcome> {
        let tool = request.tool_name();
        let target = self.mutated_path(request);
        let mut created = false;

        if let Some(path) = target {
            match self.checkpoints.track(path) {
                Ok(()) => {}
                Err(CheckpointError::OutsideWorkspace(_)) => {
                    return self.deny(request, "path is outside the workspace");
                }
                Err(err) => return Err(err.into()),
            }
            created = !self.checkpoints.exists(path)?;
            let checkpoint = self.checkpoints.checkpoint(&format!("before {tool} {path}"))?;
            self.events.append(
                request.run_id(),
                EventType::CheckpointCreated,
                event_data(json!({
                    "checkpoint_id": checkpoint.id(),
                    "turn": checkpoint.turn(),
                    "path": path,
                })),
            )?;
        }

        match self.invoker.invoke(tool, request.args()) {
            Ok(output) => {
                self.events.append(
                    request.run_id(),
                    EventType::ToolResult,
                    event_data(json!({ "tool": tool, "output": output })),
                )?;
                if let Some(path) = target {
                    let event_type = if created {
                        EventType::FileCreated
                    } else {
                        EventType::FileChanged
                    };
                    self.events.append(
                        request.run_id(),
                        event_type,
                        event_data(json!({ "path": path, "tool": tool })),
                    )?;
                }
                Ok(ToolCallOutcome::Executed { output })
            }
            Err(err) => {
                tracing::warn!(tool, error = %err, "tool invocation failed");
                self.events.append(
                    request.run_id(),
                    EventType::ToolError,
                    event_data(json!({ "tool": tool, "message": err.message })),
                )?;
                Ok(ToolCallOutcome::Failed { error: err.message })
            }
        }
    }

    fn deny(&self, request: &ToolCallRequest, reason: &str) -> GatewayResult<ToolCallOutcome> {
        tracing::info!(
            run_id = %request.run_id(),
            tool = request.tool_name(),
            reason,
            "tool call denied"
        );
        self.events.append(
            request.run_id(),
            EventType::ToolDenied,
            event_data(json!({
                "tool": request.tool_name(),
                "target": match_value_for(request.tool_name(), request.args()),
                "message": reason,
            })),
        )?;
        Ok(ToolCallOutcome::Denied {
            reason: reason.to_owned(),
        })
    }

    fn park(&self, request: ToolCallRequest) -> GatewayResult<ToolCallOutcome> {
        let (approval_type, target) = approval_subject(request.tool_name(), request.args());
        if let Some(task_id) = request.task_id() {
            self.tasks
                .block(task_id, &format!("awaiting approval for {target}"))?;
        }

        let mut approval_request = ApprovalRequest::new(request.run_id(), approval_type, target);
        if let Some(worker) = request.worker() {
            approval_request = approval_request.with_worker(worker.clone());
        }
        if let Some(task_id) = request.task_id() {
            approval_request = approval_request.with_task(task_id);
        }
        if let Some(ttl) = self.approval_ttl {
            approval_request = approval_request.expires_in(ttl);
        }
        let approval = match self.approvals.request(approval_request) {
            Ok(approval) => approval,
            Err(err) => {
                if let Some(task_id) = request.task_id() {
                    self.resume_task(task_id);
                }
                return Err(err.into());
            }
        };

        let prompt = self
            .policy
            .permission_prompt(request.tool_name(), request.args());
        self.pending().insert(approval.id(), request);
        Ok(ToolCallOutcome::AwaitingApproval {
            approval_id: approval.id(),
            prompt,
            risk_score: approval.risk_score(),
        })
    }

    /// Returns the approval with a final decision, deciding it if needed.
    fn decide(&self, approval_id: ApprovalId, resolution: Resolution) -> GatewayResult<Approval> {
        let current = self
            .approvals
            .find(approval_id)?
            .ok_or(ApprovalWorkflowError::NotFound(approval_id))?;
        if !current.is_pending() {
            return Ok(current);
        }
        match self.approvals.resolve(approval_id, resolution) {
            Err(ApprovalWorkflowError::Domain(ApprovalDomainError::Expired(_))) => {
                Ok(self.approvals.expire(approval_id)?)
            }
            decided => Ok(decided?),
        }
    }

    /// Runs or denies a call according to its decided approval.
    fn settle(
        &self,
        approval: &Approval,
        request: &ToolCallRequest,
    ) -> GatewayResult<ToolCallOutcome> {
        if let Some(task_id) = approval.requester_task_id() {
            self.resume_task(task_id);
        }
        match approval.status() {
            ApprovalStatus::Approved => self.execute(request),
            ApprovalStatus::Expired => self.deny(request, "approval expired"),
            _ => {
                let reason = format!(
                    "rejected by {}",
                    approval.resolved_by().unwrap_or("reviewer")
                );
                self.deny(request, &reason)
            }
        }
    }

    fn resume_task(&self, task_id: TaskId) {
        if let Err(err) = self.tasks.unblock(task_id) {
            tracing::warn!(
                task_id = %task_id,
                error = %err,
                "requesting task left in its current state"
            );
        }
    }

    fn mutated_path<'a>(&self, request: &'a ToolCallRequest) -> Option<&'a Utf8Path> {
        if !self.policy.is_write_tool(request.tool_name()) {
            return None;
        }
        match_value_for(request.tool_name(), request.args()).map(Utf8Path::new)
    }

    fn pending(&self) -> MutexGuard<'_, HashMap<ApprovalId, ToolCallRequest>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
