//! Allow/deny rule grammar and matching.
//!
//! A rule is `ToolName` or `ToolName(pattern)`. Without a pattern the rule
//! covers every invocation of the tool. Patterns are interpreted in priority
//! order:
//!
//! 1. `prefix:*` is a literal prefix match on the argument value,
//! 2. anything containing `**` is a recursive path pattern,
//! 3. everything else is a plain glob.
//!
//! All matches are anchored and case-sensitive. Plain globs follow shell
//! `fnmatch` rules: braces are literal characters and a `[` with no closing
//! `]` matches itself.

use super::ToolArgs;
use super::ToolKind;
use super::tool::match_value_for;
use globset::{Glob, GlobMatcher};
use regex::Regex;
use std::fmt;

/// Compiled matcher for a rule pattern.
#[derive(Debug, Clone)]
pub enum RuleMatcher {
    /// The rule has no pattern and covers every invocation.
    Any,
    /// Literal prefix match produced from a `prefix:*` pattern.
    Prefix(String),
    /// Anchored regular expression produced from a `**` pattern.
    Recursive(Regex),
    /// Plain glob pattern.
    Glob(GlobMatcher),
    /// The rule could not be parsed or compiled and matches nothing.
    Never,
}

impl RuleMatcher {
    /// Compiles a pattern string into a matcher.
    ///
    /// Patterns that fail to compile degrade to [`RuleMatcher::Never`].
    #[must_use]
    pub fn compile(pattern: &str) -> Self {
        if pattern.contains(":*") {
            return Self::Prefix(pattern.replace(":*", ""));
        }

        if pattern.contains("**") {
            return match Regex::new(&recursive_pattern_regex(pattern)) {
                Ok(regex) => Self::Recursive(regex),
                Err(err) => {
                    tracing::warn!(%pattern, error = %err, "permission pattern failed to compile");
                    Self::Never
                }
            };
        }

        match Glob::new(&literal_glob(pattern)) {
            Ok(glob) => Self::Glob(glob.compile_matcher()),
            Err(err) => {
                tracing::warn!(%pattern, error = %err, "permission glob failed to compile");
                Self::Never
            }
        }
    }

    /// Returns whether the matcher accepts the whole value.
    #[must_use]
    pub fn is_match(&self, value: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Prefix(prefix) => value.starts_with(prefix.as_str()),
            Self::Recursive(regex) => regex.is_match(value),
            Self::Glob(glob) => glob.is_match(value),
            Self::Never => false,
        }
    }
}

/// Escapes the glob syntax `fnmatch` does not know about.
///
/// Braces become single-character classes, as does a `[` that never closes.
/// Characters inside a closed class are copied unchanged.
fn literal_glob(pattern: &str) -> String {
    let mut glob = String::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    let mut in_class = false;
    while let Some(ch) = chars.next() {
        match ch {
            ']' if in_class => {
                in_class = false;
                glob.push(ch);
            }
            _ if in_class => glob.push(ch),
            '[' if chars.as_str().contains(']') => {
                in_class = true;
                glob.push(ch);
            }
            '[' | '{' | '}' => {
                glob.push('[');
                glob.push(ch);
                glob.push(']');
            }
            _ => glob.push(ch),
        }
    }
    glob
}

/// Translates a `**` pattern into an anchored regular expression.
///
/// `**/` matches zero or more leading path segments, a bare `**` matches
/// anything, and `*` matches anything except `/`. Every other character is
/// matched literally.
fn recursive_pattern_regex(pattern: &str) -> String {
    let mut regex = String::with_capacity(pattern.len().saturating_mul(2).saturating_add(2));
    regex.push('^');
    let mut rest = pattern;
    while !rest.is_empty() {
        if let Some(tail) = rest.strip_prefix("**/") {
            regex.push_str("(?:.*/)?");
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix("**") {
            regex.push_str(".*");
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix('*') {
            regex.push_str("[^/]*");
            rest = tail;
        } else {
            let mut chars = rest.chars();
            if let Some(literal) = chars.next() {
                let mut buffer = [0_u8; 4];
                regex.push_str(&regex::escape(literal.encode_utf8(&mut buffer)));
            }
            rest = chars.as_str();
        }
    }
    regex.push('$');
    regex
}

/// A parsed allow or deny rule.
///
/// Rules are immutable once parsed; a [`crate::policy::services::PolicyEngine`]
/// owns its rule lists for its whole lifetime.
#[derive(Debug, Clone)]
pub struct PermissionRule {
    raw: String,
    tool_name: String,
    pattern: Option<String>,
    matcher: RuleMatcher,
}

impl PermissionRule {
    /// Parses a rule string.
    ///
    /// Malformed rules are not an error: they produce a rule that matches
    /// nothing so that one bad configuration entry cannot disable the gate.
    ///
    /// # Examples
    ///
    /// ```
    /// use parapet::policy::domain::PermissionRule;
    ///
    /// let rule = PermissionRule::parse("Bash(npm run:*)");
    /// assert_eq!(rule.tool_name(), "Bash");
    /// assert_eq!(rule.pattern(), Some("npm run:*"));
    /// assert!(rule.is_well_formed());
    /// ```
    #[must_use]
    pub fn parse(rule: &str) -> Self {
        let trimmed = rule.trim();
        match split_rule(trimmed) {
            Some((tool_name, None)) => Self {
                raw: trimmed.to_owned(),
                tool_name: tool_name.to_owned(),
                pattern: None,
                matcher: RuleMatcher::Any,
            },
            Some((tool_name, Some(pattern))) => Self {
                raw: trimmed.to_owned(),
                tool_name: tool_name.to_owned(),
                pattern: Some(pattern.to_owned()),
                matcher: RuleMatcher::compile(pattern),
            },
            None => {
                tracing::warn!(rule = %trimmed, "malformed permission rule will match nothing");
                Self {
                    raw: trimmed.to_owned(),
                    tool_name: trimmed.to_owned(),
                    pattern: None,
                    matcher: RuleMatcher::Never,
                }
            }
        }
    }

    /// Returns the rule text as configured (trimmed).
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Returns the tool name the rule is bound to.
    #[must_use]
    pub fn tool_name(&self) -> &str {
        &self.tool_name
    }

    /// Returns the pattern, if the rule has one.
    #[must_use]
    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref()
    }

    /// Returns the compiled matcher.
    #[must_use]
    pub const fn matcher(&self) -> &RuleMatcher {
        &self.matcher
    }

    /// Returns `false` when the rule degraded to matching nothing.
    #[must_use]
    pub const fn is_well_formed(&self) -> bool {
        !matches!(self.matcher, RuleMatcher::Never)
    }

    /// Returns whether the rule covers an invocation of `tool_name` with
    /// `args`.
    ///
    /// Pattern-bearing rules never match when the tool-specific argument is
    /// missing.
    #[must_use]
    pub fn matches(&self, tool_name: &str, args: &ToolArgs) -> bool {
        if !self.is_well_formed() || !same_tool(&self.tool_name, tool_name) {
            return false;
        }

        match self.matcher {
            RuleMatcher::Any => true,
            _ => match_value_for(tool_name, args).is_some_and(|value| self.matcher.is_match(value)),
        }
    }
}

impl fmt::Display for PermissionRule {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.raw)
    }
}

/// Splits `Tool` or `Tool(pattern)` into its parts.
fn split_rule(rule: &str) -> Option<(&str, Option<&str>)> {
    let Some((tool_name, remainder)) = rule.split_once('(') else {
        return is_tool_identifier(rule).then_some((rule, None));
    };

    let pattern = remainder.strip_suffix(')')?;
    if !is_tool_identifier(tool_name) || pattern.is_empty() {
        return None;
    }
    Some((tool_name, Some(pattern)))
}

fn is_tool_identifier(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|character| character.is_alphanumeric() || character == '_')
}

/// Compares tool names after folding known aliases.
fn same_tool(rule_tool: &str, invoked_tool: &str) -> bool {
    match (ToolKind::resolve(rule_tool), ToolKind::resolve(invoked_tool)) {
        (Some(rule_kind), Some(invoked_kind)) => rule_kind == invoked_kind,
        _ => rule_tool == invoked_tool,
    }
}

#[cfg(test)]
mod tests {
    use super::recursive_pattern_regex;

    #[test]
    fn recursive_translation_escapes_literals() {
        assert_eq!(
            recursive_pattern_regex("src/**/*.py"),
            r"^src/(?:.*/)?[^/]*\.py$"
        );
    }

    #[test]
    fn bare_double_star_matches_anything() {
        assert_eq!(recursive_pattern_regex("logs/**"), "^logs/.*$");
    }
}
