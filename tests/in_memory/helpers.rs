//! Shared fixtures for in-memory integration tests.

use crate::test_helpers::{RecordingInvoker, temp_workspace};
use camino::Utf8PathBuf;
use mockable::DefaultClock;
use parapet::context::{CoreContext, CoreSettings};
use parapet::policy::services::PolicySettings;
use parapet::run::{domain::Run, services::CreateRunRequest};
use std::sync::Arc;
use tempfile::TempDir;

/// Context type used by in-memory integration tests.
pub type TestContext = CoreContext<RecordingInvoker, DefaultClock>;

/// A wired context over a temporary workspace with one running run.
pub struct Core {
    _workspace: TempDir,
    /// Canonical workspace root.
    pub root: Utf8PathBuf,
    /// Invoker shared with the gateway.
    pub invoker: Arc<RecordingInvoker>,
    /// The wired context.
    pub context: TestContext,
    /// Run started for the test.
    pub run: Run,
}

/// Settings used by the integration tests.
pub fn settings() -> CoreSettings {
    CoreSettings {
        policy: PolicySettings {
            mode: "default".to_owned(),
            allow: vec!["Bash(npm run:*)".to_owned(), "Edit(src/**)".to_owned()],
            deny: vec!["Read(.env*)".to_owned(), "Bash(rm -rf:*)".to_owned()],
        },
        ..CoreSettings::default()
    }
}

/// Builds a context and starts a run in it.
///
/// # Errors
///
/// Returns an error when the workspace or the run cannot be created.
pub fn core() -> eyre::Result<Core> {
    let (workspace, root) = temp_workspace()?;
    let invoker = Arc::new(RecordingInvoker::new(root.clone()));
    let context = CoreContext::new(
        settings(),
        &root,
        Arc::clone(&invoker),
        Arc::new(DefaultClock),
    )?;
    let run = context
        .runs()
        .create_run(CreateRunRequest::new("Keep the agent honest", root.as_str()))?;
    Ok(Core {
        _workspace: workspace,
        root,
        invoker,
        context,
        run,
    })
}
