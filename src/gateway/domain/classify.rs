//! Mapping of tool calls onto approval categories.

use crate::approval::domain::ApprovalType;
use crate::policy::domain::{ToolArgs, ToolKind, match_value_for};
use serde_json::Value;

/// Returns the approval category and target for a call that needs a human
/// decision.
///
/// Shell commands are refined by prefix: `git push` is a push and `rm ` a
/// deletion. Unknown tools count as edits when they name a file and as
/// commands otherwise. The target falls back to the tool name when the call
/// carries no usable argument.
///
/// # Examples
///
/// ```
/// use parapet::approval::domain::ApprovalType;
/// use parapet::gateway::domain::approval_subject;
/// use serde_json::json;
///
/// let args = json!({"command": "git push origin main"});
/// let args = args.as_object().cloned().unwrap_or_default();
/// let (kind, target) = approval_subject("Bash", &args);
/// assert_eq!(kind, ApprovalType::GitPush);
/// assert_eq!(target, "git push origin main");
/// ```
#[must_use]
pub fn approval_subject(tool_name: &str, args: &ToolArgs) -> (ApprovalType, String) {
    let value = match_value_for(tool_name, args);
    let target = value.unwrap_or(tool_name).to_owned();
    let approval_type = match ToolKind::resolve(tool_name) {
        Some(ToolKind::Edit) => ApprovalType::FileEdit,
        Some(ToolKind::Write) => ApprovalType::FileCreate,
        Some(ToolKind::Bash) => command_type(value.unwrap_or_default()),
        Some(ToolKind::Read | ToolKind::Grep | ToolKind::Glob) | None => {
            if names_a_file(args) {
                ApprovalType::FileEdit
            } else {
                ApprovalType::BashCommand
            }
        }
    };
    (approval_type, target)
}

fn command_type(command: &str) -> ApprovalType {
    let trimmed = command.trim_start();
    if trimmed.starts_with("git push") {
        ApprovalType::GitPush
    } else if trimmed.starts_with("rm ") {
        ApprovalType::FileDelete
    } else {
        ApprovalType::BashCommand
    }
}

fn names_a_file(args: &ToolArgs) -> bool {
    ["file_path", "path"].into_iter().any(|key| {
        args.get(key)
            .and_then(Value::as_str)
            .is_some_and(|value| !value.is_empty())
    })
}
