//! Closed taxonomy of audit event types.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error returned while parsing an event type name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown event type: {0}")]
pub struct ParseEventTypeError(pub String);

/// Dot-namespaced kind of an audit event.
///
/// The serialized form is the dotted name, for example `approval.rejected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    /// A run started executing.
    #[serde(rename = "run.started")]
    RunStarted,
    /// A run reached its goal.
    #[serde(rename = "run.completed")]
    RunCompleted,
    /// A run stopped with an error.
    #[serde(rename = "run.failed")]
    RunFailed,
    /// A run was cancelled.
    #[serde(rename = "run.cancelled")]
    RunCancelled,
    /// A plan was produced.
    #[serde(rename = "plan.created")]
    PlanCreated,
    /// A plan was revised.
    #[serde(rename = "plan.updated")]
    PlanUpdated,
    /// A plan phase began.
    #[serde(rename = "phase.started")]
    PhaseStarted,
    /// A plan phase finished.
    #[serde(rename = "phase.completed")]
    PhaseCompleted,
    /// A task was created.
    #[serde(rename = "task.created")]
    TaskCreated,
    /// A task was assigned to a worker.
    #[serde(rename = "task.assigned")]
    TaskAssigned,
    /// Work on a task began.
    #[serde(rename = "task.started")]
    TaskStarted,
    /// A task finished successfully.
    #[serde(rename = "task.completed")]
    TaskCompleted,
    /// A task failed.
    #[serde(rename = "task.failed")]
    TaskFailed,
    /// A task is waiting on a decision or dependency.
    #[serde(rename = "task.blocked")]
    TaskBlocked,
    /// A blocked task resumed.
    #[serde(rename = "task.unblocked")]
    TaskUnblocked,
    /// A tool call was received.
    #[serde(rename = "tool.called")]
    ToolCalled,
    /// A tool call returned a result.
    #[serde(rename = "tool.result")]
    ToolResult,
    /// A tool call failed.
    #[serde(rename = "tool.error")]
    ToolError,
    /// A tool call was refused by policy or a human.
    #[serde(rename = "tool.denied")]
    ToolDenied,
    /// A file was read.
    #[serde(rename = "file.read")]
    FileRead,
    /// A file was modified.
    #[serde(rename = "file.changed")]
    FileChanged,
    /// A file was created.
    #[serde(rename = "file.created")]
    FileCreated,
    /// A file was deleted.
    #[serde(rename = "file.deleted")]
    FileDeleted,
    /// An approval was requested.
    #[serde(rename = "approval.requested")]
    ApprovalRequested,
    /// An approval was granted.
    #[serde(rename = "approval.approved")]
    ApprovalApproved,
    /// An approval was refused.
    #[serde(rename = "approval.rejected")]
    ApprovalRejected,
    /// An approval lapsed before a decision.
    #[serde(rename = "approval.expired")]
    ApprovalExpired,
    /// A checkpoint was written.
    #[serde(rename = "checkpoint.created")]
    CheckpointCreated,
    /// A checkpoint was restored.
    #[serde(rename = "checkpoint.restored")]
    CheckpointRestored,
    /// A test run began.
    #[serde(rename = "test.started")]
    TestStarted,
    /// A test run passed.
    #[serde(rename = "test.passed")]
    TestPassed,
    /// A test run failed.
    #[serde(rename = "test.failed")]
    TestFailed,
    /// Informational note.
    #[serde(rename = "info")]
    Info,
    /// Warning note.
    #[serde(rename = "warning")]
    Warning,
    /// Error note.
    #[serde(rename = "error")]
    Error,
}

impl EventType {
    /// Returns the dot-namespaced name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RunStarted => "run.started",
            Self::RunCompleted => "run.completed",
            Self::RunFailed => "run.failed",
            Self::RunCancelled => "run.cancelled",
            Self::PlanCreated => "plan.created",
            Self::PlanUpdated => "plan.updated",
            Self::PhaseStarted => "phase.started",
            Self::PhaseCompleted => "phase.completed",
            Self::TaskCreated => "task.created",
            Self::TaskAssigned => "task.assigned",
            Self::TaskStarted => "task.started",
            Self::TaskCompleted => "task.completed",
            Self::TaskFailed => "task.failed",
            Self::TaskBlocked => "task.blocked",
            Self::TaskUnblocked => "task.unblocked",
            Self::ToolCalled => "tool.called",
            Self::ToolResult => "tool.result",
            Self::ToolError => "tool.error",
            Self::ToolDenied => "tool.denied",
            Self::FileRead => "file.read",
            Self::FileChanged => "file.changed",
            Self::FileCreated => "file.created",
            Self::FileDeleted => "file.deleted",
            Self::ApprovalRequested => "approval.requested",
            Self::ApprovalApproved => "approval.approved",
            Self::ApprovalRejected => "approval.rejected",
            Self::ApprovalExpired => "approval.expired",
            Self::CheckpointCreated => "checkpoint.created",
            Self::CheckpointRestored => "checkpoint.restored",
            Self::TestStarted => "test.started",
            Self::TestPassed => "test.passed",
            Self::TestFailed => "test.failed",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }

    /// Returns the namespace before the first dot, or the whole name for
    /// the generic `info`, `warning` and `error` kinds.
    #[must_use]
    pub fn category(self) -> &'static str {
        let name = self.as_str();
        name.split_once('.').map_or(name, |(category, _)| category)
    }
}

impl TryFrom<&str> for EventType {
    type Error = ParseEventTypeError;

    fn try_from(value: &str) -> Result<Self, ParseEventTypeError> {
        match value {
            "run.started" => Ok(Self::RunStarted),
            "run.completed" => Ok(Self::RunCompleted),
            "run.failed" => Ok(Self::RunFailed),
            "run.cancelled" => Ok(Self::RunCancelled),
            "plan.created" => Ok(Self::PlanCreated),
            "plan.updated" => Ok(Self::PlanUpdated),
            "phase.started" => Ok(Self::PhaseStarted),
            "phase.completed" => Ok(Self::PhaseCompleted),
            "task.created" => Ok(Self::TaskCreated),
            "task.assigned" => Ok(Self::TaskAssigned),
            "task.started" => Ok(Self::TaskStarted),
            "task.completed" => Ok(Self::TaskCompleted),
            "task.failed" => Ok(Self::TaskFailed),
            "task.blocked" => Ok(Self::TaskBlocked),
            "task.unblocked" => Ok(Self::TaskUnblocked),
            "tool.called" => Ok(Self::ToolCalled),
            "tool.result" => Ok(Self::ToolResult),
            "tool.error" => Ok(Self::ToolError),
            "tool.denied" => Ok(Self::ToolDenied),
            "file.read" => Ok(Self::FileRead),
            "file.changed" => Ok(Self::FileChanged),
            "file.created" => Ok(Self::FileCreated),
            "file.deleted" => Ok(Self::FileDeleted),
            "approval.requested" => Ok(Self::ApprovalRequested),
            "approval.approved" => Ok(Self::ApprovalApproved),
            "approval.rejected" => Ok(Self::ApprovalRejected),
            "approval.expired" => Ok(Self::ApprovalExpired),
            "checkpoint.created" => Ok(Self::CheckpointCreated),
            "checkpoint.restored" => Ok(Self::CheckpointRestored),
            "test.started" => Ok(Self::TestStarted),
            "test.passed" => Ok(Self::TestPassed),
            "test.failed" => Ok(Self::TestFailed),
            "info" => Ok(Self::Info),
            "warning" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            _ => Err(ParseEventTypeError(value.to_owned())),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
