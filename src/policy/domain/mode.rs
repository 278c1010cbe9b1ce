//! Permission modes applied when no explicit rule matches.

use super::{ParsePolicyModeError, ToolClass};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default authorization posture of a policy engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyMode {
    /// Allow safe tools, ask for everything else.
    #[default]
    Default,
    /// Read-only planning: allow safe tools, ask for everything else.
    Plan,
    /// Allow safe and write tools, ask for command execution.
    AcceptEdits,
    /// Allow every tool.
    Bypass,
}

impl PolicyMode {
    /// Returns the canonical configuration representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Plan => "plan",
            Self::AcceptEdits => "accept_edits",
            Self::Bypass => "bypass",
        }
    }

    /// Parses a configured mode, falling back to [`PolicyMode::Default`].
    ///
    /// An unknown mode keeps the gate available with its most common
    /// posture instead of refusing to start.
    ///
    /// # Examples
    ///
    /// ```
    /// use parapet::policy::domain::PolicyMode;
    ///
    /// assert_eq!(PolicyMode::parse("plan"), PolicyMode::Plan);
    /// assert_eq!(PolicyMode::parse("yolo"), PolicyMode::Default);
    /// ```
    #[must_use]
    pub fn parse(value: &str) -> Self {
        value.parse::<Self>().unwrap_or_else(|err| {
            tracing::warn!(mode = %err.0, "unknown permission mode, using default");
            Self::Default
        })
    }

    /// Returns whether the mode allows a tool of the given class outright.
    ///
    /// `None` stands for a tool the policy layer does not recognise.
    #[must_use]
    pub const fn allows(self, class: Option<ToolClass>) -> bool {
        match self {
            Self::Bypass => true,
            Self::AcceptEdits => matches!(class, Some(ToolClass::Safe | ToolClass::Write)),
            Self::Default | Self::Plan => matches!(class, Some(ToolClass::Safe)),
        }
    }
}

impl FromStr for PolicyMode {
    type Err = ParsePolicyModeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "default" => Ok(Self::Default),
            "plan" => Ok(Self::Plan),
            "accept_edits" => Ok(Self::AcceptEdits),
            "bypass" => Ok(Self::Bypass),
            _ => Err(ParsePolicyModeError(value.to_owned())),
        }
    }
}

impl fmt::Display for PolicyMode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
