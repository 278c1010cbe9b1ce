//! Domain model for tool permission evaluation.
//!
//! Covers canonical tool classification, permission modes, rule parsing and
//! matching, and the three-valued decision returned to callers.

mod decision;
mod error;
mod mode;
mod rule;
mod tool;

pub use decision::PolicyDecision;
pub use error::{ParsePolicyDecisionError, ParsePolicyModeError};
pub use mode::PolicyMode;
pub use rule::{PermissionRule, RuleMatcher};
pub use tool::{ToolArgs, ToolClass, ToolKind, match_value_for, tool_class};
