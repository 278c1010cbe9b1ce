//! Shared world state for approval workflow BDD scenarios.

use crate::test_helpers::{RecordingInvoker, temp_workspace};
use mockable::DefaultClock;
use parapet::context::{CoreContext, CoreSettings};
use parapet::gateway::domain::ToolCallOutcome;
use parapet::policy::services::PolicySettings;
use parapet::run::domain::{Run, Task, WorkerId};
use parapet::run::services::{CreateRunRequest, CreateTaskRequest};
use rstest::fixture;
use std::sync::Arc;
use tempfile::TempDir;

/// Context type used by the BDD world.
pub type WorldContext = CoreContext<RecordingInvoker, DefaultClock>;

/// A wired core with one run and one task in progress.
///
/// `task` is the task as it was after assignment; read the current status
/// through the task service.
pub struct Stage {
    _workspace: TempDir,
    pub invoker: Arc<RecordingInvoker>,
    pub context: WorldContext,
    pub run: Run,
    pub task: Task,
}

impl Stage {
    /// Builds the core over a fresh temporary workspace.
    pub fn open() -> eyre::Result<Self> {
        let (workspace, root) = temp_workspace()?;
        let settings = CoreSettings {
            policy: PolicySettings {
                mode: "default".to_owned(),
                allow: Vec::new(),
                deny: vec!["Read(.env*)".to_owned()],
            },
            ..CoreSettings::default()
        };
        let invoker = Arc::new(RecordingInvoker::new(root.clone()));
        let context = CoreContext::new(
            settings,
            &root,
            Arc::clone(&invoker),
            Arc::new(DefaultClock),
        )?;
        let run = context
            .runs()
            .create_run(CreateRunRequest::new("Release the crate", root.as_str()))?;
        let created = context
            .tasks()
            .create_task(CreateTaskRequest::new(run.id(), "Publish the release"))?;
        let task = context
            .tasks()
            .assign(created.id(), WorkerId::new("release-worker")?)?;
        Ok(Self {
            _workspace: workspace,
            invoker,
            context,
            run,
            task,
        })
    }
}

/// Scenario world for approval workflow behaviour tests.
#[derive(Default)]
pub struct ApprovalWorld {
    pub stage: Option<Stage>,
    pub last_outcome: Option<ToolCallOutcome>,
}

impl ApprovalWorld {
    /// Returns the wired core, failing when no run was set up.
    pub fn stage(&self) -> eyre::Result<&Stage> {
        self.stage
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing run in scenario world"))
    }

    /// Returns the outcome of the last tool call.
    pub fn outcome(&self) -> eyre::Result<&ToolCallOutcome> {
        self.last_outcome
            .as_ref()
            .ok_or_else(|| eyre::eyre!("no tool call was made in this scenario"))
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> ApprovalWorld {
    ApprovalWorld::default()
}
