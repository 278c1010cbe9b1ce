//! Rule and mode based permission evaluation.

use super::PolicySettings;
use crate::policy::domain::{
    PermissionRule, PolicyDecision, PolicyMode, ToolArgs, ToolClass, ToolKind, match_value_for,
    tool_class,
};

/// Longest command shown verbatim in a confirmation prompt.
const PROMPT_COMMAND_LIMIT: usize = 50;

/// Evaluates tool invocations against a mode and ordered allow/deny rules.
///
/// The rule lists are read-only after construction, so one engine can be
/// shared between callers behind an `Arc` without locking.
///
/// # Examples
///
/// ```
/// use parapet::policy::domain::{PolicyDecision, PolicyMode};
/// use parapet::policy::services::PolicyEngine;
/// use serde_json::json;
///
/// let engine = PolicyEngine::new(PolicyMode::Default, ["Bash(npm run:*)"], ["Read(.env*)"]);
/// let args = json!({"command": "npm run test"});
/// let args = args.as_object().expect("object");
/// assert_eq!(engine.check("Bash", args), PolicyDecision::Allow);
/// ```
#[derive(Debug, Clone)]
pub struct PolicyEngine {
    mode: PolicyMode,
    allow_rules: Vec<PermissionRule>,
    deny_rules: Vec<PermissionRule>,
}

impl Default for PolicyEngine {
    fn default() -> Self {
        Self {
            mode: PolicyMode::Default,
            allow_rules: Vec::new(),
            deny_rules: Vec::new(),
        }
    }
}

impl PolicyEngine {
    /// Creates an engine from a mode and raw rule strings.
    #[must_use]
    pub fn new<A, D>(mode: PolicyMode, allow: A, deny: D) -> Self
    where
        A: IntoIterator,
        A::Item: AsRef<str>,
        D: IntoIterator,
        D::Item: AsRef<str>,
    {
        Self {
            mode,
            allow_rules: parse_rules(allow),
            deny_rules: parse_rules(deny),
        }
    }

    /// Creates an engine from configuration settings.
    ///
    /// Unknown mode names fall back to [`PolicyMode::Default`].
    #[must_use]
    pub fn from_settings(settings: &PolicySettings) -> Self {
        Self::new(
            PolicyMode::parse(&settings.mode),
            &settings.allow,
            &settings.deny,
        )
    }

    /// Returns the configured mode.
    #[must_use]
    pub const fn mode(&self) -> PolicyMode {
        self.mode
    }

    /// Returns the parsed allow rules in evaluation order.
    #[must_use]
    pub fn allow_rules(&self) -> &[PermissionRule] {
        &self.allow_rules
    }

    /// Returns the parsed deny rules in evaluation order.
    #[must_use]
    pub fn deny_rules(&self) -> &[PermissionRule] {
        &self.deny_rules
    }

    /// Decides whether a tool invocation may proceed.
    ///
    /// Deny rules are consulted first and win unconditionally, then allow
    /// rules, then the mode default for the tool.
    #[must_use]
    pub fn check(&self, tool_name: &str, args: &ToolArgs) -> PolicyDecision {
        if let Some(rule) = first_match(&self.deny_rules, tool_name, args) {
            tracing::debug!(tool = tool_name, rule = %rule, "deny rule matched");
            return PolicyDecision::Deny;
        }

        if let Some(rule) = first_match(&self.allow_rules, tool_name, args) {
            tracing::debug!(tool = tool_name, rule = %rule, "allow rule matched");
            return PolicyDecision::Allow;
        }

        let decision = self.mode_default(tool_name);
        tracing::debug!(
            tool = tool_name,
            mode = %self.mode,
            decision = %decision,
            "no rule matched, applying mode default"
        );
        decision
    }

    /// Returns the decision the mode alone gives for a tool.
    #[must_use]
    pub fn mode_default(&self, tool_name: &str) -> PolicyDecision {
        if self.mode.allows(tool_class(tool_name)) {
            PolicyDecision::Allow
        } else {
            PolicyDecision::Ask
        }
    }

    /// Returns whether the tool is read-only.
    #[must_use]
    pub fn is_safe_tool(&self, tool_name: &str) -> bool {
        tool_class(tool_name) == Some(ToolClass::Safe)
    }

    /// Returns whether the tool modifies files.
    #[must_use]
    pub fn is_write_tool(&self, tool_name: &str) -> bool {
        tool_class(tool_name) == Some(ToolClass::Write)
    }

    /// Returns whether the tool executes commands.
    #[must_use]
    pub fn is_execute_tool(&self, tool_name: &str) -> bool {
        tool_class(tool_name) == Some(ToolClass::Execute)
    }

    /// Formats the confirmation question shown to a human for an invocation.
    ///
    /// Long commands are shortened so the prompt stays on one line.
    #[must_use]
    pub fn permission_prompt(&self, tool_name: &str, args: &ToolArgs) -> String {
        let subject = match_value_for(tool_name, args).unwrap_or("unknown");
        match ToolKind::resolve(tool_name) {
            Some(ToolKind::Edit) => format!("Allow editing {subject}?"),
            Some(ToolKind::Write) => format!("Allow writing to {subject}?"),
            Some(ToolKind::Read) => format!("Allow reading {subject}?"),
            Some(ToolKind::Bash) => format!("Allow running: {}?", truncate_command(subject)),
            Some(ToolKind::Grep | ToolKind::Glob) | None => format!("Allow {tool_name}?"),
        }
    }
}

fn parse_rules<I>(rules: I) -> Vec<PermissionRule>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    rules
        .into_iter()
        .map(|rule| PermissionRule::parse(rule.as_ref()))
        .collect()
}

fn first_match<'a>(
    rules: &'a [PermissionRule],
    tool_name: &str,
    args: &ToolArgs,
) -> Option<&'a PermissionRule> {
    rules.iter().find(|rule| rule.matches(tool_name, args))
}

fn truncate_command(command: &str) -> String {
    if command.chars().count() <= PROMPT_COMMAND_LIMIT {
        return command.to_owned();
    }
    let mut shortened: String = command
        .chars()
        .take(PROMPT_COMMAND_LIMIT.saturating_sub(3))
        .collect();
    shortened.push_str("...");
    shortened
}
