//! Port for executing tools once a call has been cleared.

use crate::policy::domain::ToolArgs;
use serde_json::Value;
use thiserror::Error;

/// Failure reported by a tool.
///
/// A failed tool is an ordinary outcome of a call, not a gateway fault: it
/// is recorded as `tool.error` and handed back to the agent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{tool} failed: {message}")]
pub struct ToolInvocationError {
    /// Tool that failed.
    pub tool: String,
    /// Error text reported by the tool.
    pub message: String,
}

impl ToolInvocationError {
    /// Creates an invocation error.
    #[must_use]
    pub fn new(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            message: message.into(),
        }
    }
}

/// Executes tools on behalf of the gateway.
///
/// Implementations perform the real side effect (editing a file, running a
/// command). The gateway only calls them after the policy, and where needed
/// a human, has cleared the call.
#[cfg_attr(test, mockall::automock)]
pub trait ToolInvoker: Send + Sync {
    /// Runs a tool with its arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ToolInvocationError`] when the tool reports a failure.
    fn invoke(&self, tool_name: &str, args: &ToolArgs) -> Result<Value, ToolInvocationError>;
}
