//! Canonical tool names and their permission classes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Structured arguments of a tool invocation.
pub type ToolArgs = Map<String, Value>;

/// Permission class of a canonical tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolClass {
    /// Read-only tools that never mutate the workspace.
    Safe,
    /// Tools that create or modify files.
    Write,
    /// Tools that run arbitrary commands.
    Execute,
}

/// Canonical tool known to the policy layer.
///
/// Agents may address the same tool under more than one name (`Edit` and
/// `edit_tool`, for example). [`ToolKind::resolve`] is the only place where
/// aliases are folded into a canonical kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    /// Reads a file.
    Read,
    /// Edits an existing file in place.
    Edit,
    /// Writes a whole file.
    Write,
    /// Searches file contents.
    Grep,
    /// Lists files matching a glob.
    Glob,
    /// Runs a shell command.
    Bash,
}

impl ToolKind {
    /// Every canonical tool kind.
    pub const ALL: [Self; 6] = [
        Self::Read,
        Self::Edit,
        Self::Write,
        Self::Grep,
        Self::Glob,
        Self::Bash,
    ];

    /// Resolves a tool name or alias to its canonical kind.
    ///
    /// Returns `None` for tools the policy layer does not know about. Name
    /// comparison is case-sensitive.
    ///
    /// # Examples
    ///
    /// ```
    /// use parapet::policy::domain::ToolKind;
    ///
    /// assert_eq!(ToolKind::resolve("edit_tool"), Some(ToolKind::Edit));
    /// assert_eq!(ToolKind::resolve("Edit"), Some(ToolKind::Edit));
    /// assert_eq!(ToolKind::resolve("edit"), None);
    /// ```
    #[must_use]
    pub fn resolve(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.canonical_name() == name || kind.alias() == name)
    }

    /// Returns the primary name agents use for this tool.
    #[must_use]
    pub const fn canonical_name(self) -> &'static str {
        match self {
            Self::Read => "Read",
            Self::Edit => "Edit",
            Self::Write => "Write",
            Self::Grep => "Grep",
            Self::Glob => "Glob",
            Self::Bash => "Bash",
        }
    }

    /// Returns the interchangeable secondary name for this tool.
    #[must_use]
    pub const fn alias(self) -> &'static str {
        match self {
            Self::Read => "read_tool",
            Self::Edit => "edit_tool",
            Self::Write => "write_tool",
            Self::Grep => "grep_tool",
            Self::Glob => "glob_tool",
            Self::Bash => "bash_tool",
        }
    }

    /// Returns the permission class of this tool.
    #[must_use]
    pub const fn class(self) -> ToolClass {
        match self {
            Self::Read | Self::Grep | Self::Glob => ToolClass::Safe,
            Self::Edit | Self::Write => ToolClass::Write,
            Self::Bash => ToolClass::Execute,
        }
    }

    /// Returns the argument value rule patterns are compared against.
    ///
    /// File tools use `file_path`, the shell uses `command`, and search tools
    /// prefer `path` over `pattern`. Empty strings and non-string values count
    /// as absent.
    #[must_use]
    pub fn match_value(self, args: &ToolArgs) -> Option<&str> {
        match self {
            Self::Read | Self::Edit | Self::Write => string_arg(args, "file_path"),
            Self::Bash => string_arg(args, "command"),
            Self::Grep | Self::Glob => {
                string_arg(args, "path").or_else(|| string_arg(args, "pattern"))
            }
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.canonical_name())
    }
}

/// Returns the class of a tool name, resolving aliases first.
#[must_use]
pub fn tool_class(name: &str) -> Option<ToolClass> {
    ToolKind::resolve(name).map(ToolKind::class)
}

/// Returns the argument value to match rules against for any tool name.
///
/// Unknown tools fall back to `file_path`, then `path`, then `command`.
#[must_use]
pub fn match_value_for<'a>(tool_name: &str, args: &'a ToolArgs) -> Option<&'a str> {
    match ToolKind::resolve(tool_name) {
        Some(kind) => kind.match_value(args),
        None => string_arg(args, "file_path")
            .or_else(|| string_arg(args, "path"))
            .or_else(|| string_arg(args, "command")),
    }
}

/// Returns a non-empty string argument.
pub(crate) fn string_arg<'a>(args: &'a ToolArgs, key: &str) -> Option<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
}
