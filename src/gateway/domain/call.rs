//! Tool call requests and their outcomes.

use crate::approval::domain::ApprovalId;
use crate::policy::domain::ToolArgs;
use crate::run::domain::{RunId, TaskId, WorkerId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tool invocation an agent wants to perform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    run_id: RunId,
    task_id: Option<TaskId>,
    worker: Option<WorkerId>,
    tool_name: String,
    args: ToolArgs,
}

impl ToolCallRequest {
    /// Creates a request for a tool in a run.
    #[must_use]
    pub fn new(run_id: RunId, tool_name: impl Into<String>, args: ToolArgs) -> Self {
        Self {
            run_id,
            task_id: None,
            worker: None,
            tool_name: tool_name.into(),
            args,
        }
    }

    /// Records the task issuing the call; it is blocked while an approval
    /// is pending.
    #[must_use]
    pub const fn for_task(mut self, task_id: TaskId) -> Self {
        self.task_id = Some(task_id);
        self
    }

    /// Records the worker issuing the call.
    #[must_use]
    pub fn by_worker(mut self, worker: WorkerId) -> Self {
        self.worker = Some(worker);
        self
    }

    /// Returns the run the call belongs to.
    #[must_use]
    pub const fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Returns the issuing task.
    #[must_use]
    pub const fn task_id(&self) -> Option<TaskId> {
        self.task_id
    }

    /// Returns the issuing worker.
    #[must_use]
    pub const fn worker(&self) -> Option<&WorkerId> {
        self.worker.as_ref()
    }

    /// Returns the tool name as the agent spelled it.
    #[must_use]
    pub fn tool_name(&self) -> &str {
        &self.tool_name
    }

    /// Returns the structured arguments.
    #[must_use]
    pub const fn args(&self) -> &ToolArgs {
        &self.args
    }
}

/// What happened to a tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ToolCallOutcome {
    /// The tool ran and returned output.
    Executed {
        /// Tool output.
        output: Value,
    },
    /// The tool ran and reported an error.
    Failed {
        /// Error reported by the tool.
        error: String,
    },
    /// The call was refused and never reached the tool.
    Denied {
        /// Why the call was refused.
        reason: String,
    },
    /// The call is parked until a human decides.
    AwaitingApproval {
        /// Approval to resolve.
        approval_id: ApprovalId,
        /// Question to show the human.
        prompt: String,
        /// Heuristic risk score of the action.
        risk_score: u8,
    },
}
