//! Shared collaborators for integration tests.

use camino::Utf8PathBuf;
use parapet::gateway::ports::{ToolInvocationError, ToolInvoker};
use parapet::policy::domain::ToolArgs;
use serde_json::{Value, json};
use std::fs;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tempfile::TempDir;

/// Tool invoker that records every call and applies file writes.
///
/// Calls carrying `file_path` and `content` write the content below the
/// workspace root; every other call succeeds without side effects.
pub struct RecordingInvoker {
    root: Utf8PathBuf,
    calls: Mutex<Vec<String>>,
}

impl RecordingInvoker {
    /// Creates an invoker rooted at a workspace.
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            root: root.into(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Returns the tool names invoked so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ToolInvoker for RecordingInvoker {
    fn invoke(&self, tool_name: &str, args: &ToolArgs) -> Result<Value, ToolInvocationError> {
        self.lock().push(tool_name.to_owned());
        let path = args.get("file_path").and_then(Value::as_str);
        let content = args.get("content").and_then(Value::as_str);
        if let (Some(path), Some(content)) = (path, content) {
            let target = self.root.join(path);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)
                    .map_err(|err| ToolInvocationError::new(tool_name, err.to_string()))?;
            }
            fs::write(&target, content)
                .map_err(|err| ToolInvocationError::new(tool_name, err.to_string()))?;
            return Ok(json!({ "written": target }));
        }
        Ok(json!({ "tool": tool_name }))
    }
}

/// Creates a temporary workspace and returns it with its canonical path.
///
/// # Errors
///
/// Returns an error when the directory cannot be created or its path is not
/// UTF-8.
pub fn temp_workspace() -> eyre::Result<(TempDir, Utf8PathBuf)> {
    let dir = tempfile::tempdir()?;
    let path = Utf8PathBuf::from_path_buf(dir.path().canonicalize()?)
        .map_err(|path| eyre::eyre!("non UTF-8 temp dir: {}", path.display()))?;
    Ok((dir, path))
}

/// Builds tool arguments from a JSON object literal.
pub fn args(value: Value) -> ToolArgs {
    match value {
        Value::Object(map) => map,
        _ => ToolArgs::new(),
    }
}
