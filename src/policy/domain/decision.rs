//! Outcome of a policy evaluation.

use super::ParsePolicyDecisionError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Three-valued verdict for a tool invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyDecision {
    /// Proceed without asking.
    Allow,
    /// Refuse without asking.
    Deny,
    /// Pause for a human decision.
    Ask,
}

impl PolicyDecision {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Deny => "deny",
            Self::Ask => "ask",
        }
    }
}

impl TryFrom<&str> for PolicyDecision {
    type Error = ParsePolicyDecisionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "allow" => Ok(Self::Allow),
            "deny" => Ok(Self::Deny),
            "ask" => Ok(Self::Ask),
            _ => Err(ParsePolicyDecisionError(value.to_owned())),
        }
    }
}

impl fmt::Display for PolicyDecision {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
