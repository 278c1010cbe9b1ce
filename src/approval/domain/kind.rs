//! Kinds of actions that can require approval.

use super::ParseApprovalTypeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of the action awaiting a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalType {
    /// Modify an existing file.
    FileEdit,
    /// Create or overwrite a file.
    FileCreate,
    /// Delete a file.
    FileDelete,
    /// Run a shell command.
    BashCommand,
    /// Push commits to a remote.
    GitPush,
}

impl ApprovalType {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FileEdit => "file_edit",
            Self::FileCreate => "file_create",
            Self::FileDelete => "file_delete",
            Self::BashCommand => "bash_command",
            Self::GitPush => "git_push",
        }
    }

    /// Returns the risk score before target heuristics are applied.
    #[must_use]
    pub const fn base_risk(self) -> u8 {
        match self {
            Self::FileEdit | Self::FileCreate => 2,
            Self::BashCommand => 3,
            Self::FileDelete | Self::GitPush => 4,
        }
    }
}

impl TryFrom<&str> for ApprovalType {
    type Error = ParseApprovalTypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "file_edit" => Ok(Self::FileEdit),
            "file_create" => Ok(Self::FileCreate),
            "file_delete" => Ok(Self::FileDelete),
            "bash_command" => Ok(Self::BashCommand),
            "git_push" => Ok(Self::GitPush),
            _ => Err(ParseApprovalTypeError(value.to_owned())),
        }
    }
}

impl fmt::Display for ApprovalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
