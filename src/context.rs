//! Explicit wiring of every core component.
//!
//! There are no process-wide singletons: a [`CoreContext`] owns one
//! instance of each repository and service, and everything that needs a
//! collaborator is handed it here.

use crate::approval::{
    adapters::memory::InMemoryApprovalRepository, services::ApprovalWorkflowService,
};
use crate::audit::{
    adapters::memory::InMemoryEventRepository,
    services::{EventLog, TimelineService},
};
use crate::checkpoint::{
    adapters::json_file::JsonFileCheckpointStore,
    services::{CheckpointManager, CheckpointResult, CheckpointSettings},
};
use crate::gateway::{ports::ToolInvoker, services::ToolGateway};
use crate::policy::services::{PolicyEngine, PolicySettings};
use crate::run::{
    adapters::memory::{InMemoryRunRepository, InMemoryTaskRepository},
    services::{RunLifecycleService, TaskLifecycleService},
};
use camino::Utf8Path;
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Top-level configuration for a [`CoreContext`].
///
/// # Examples
///
/// ```
/// use parapet::context::CoreSettings;
///
/// let settings: CoreSettings = serde_json::from_str(
///     r#"{"policy": {"mode": "plan"}, "checkpoint": {"keep_last": 5}}"#,
/// ).expect("valid settings");
/// assert_eq!(settings.policy.mode, "plan");
/// assert_eq!(settings.checkpoint.keep_last, 5);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreSettings {
    /// Permission mode and rules.
    pub policy: PolicySettings,
    /// Checkpoint storage.
    pub checkpoint: CheckpointSettings,
}

/// Event log over the in-memory repository.
pub type CoreEventLog<C> = EventLog<InMemoryEventRepository, C>;
/// Run service over the in-memory repositories.
pub type CoreRunService<C> = RunLifecycleService<InMemoryRunRepository, InMemoryEventRepository, C>;
/// Task service over the in-memory repositories.
pub type CoreTaskService<C> = TaskLifecycleService<
    InMemoryTaskRepository,
    InMemoryRunRepository,
    InMemoryEventRepository,
    C,
>;
/// Approval service over the in-memory repositories.
pub type CoreApprovalService<C> =
    ApprovalWorkflowService<InMemoryApprovalRepository, InMemoryEventRepository, C>;
/// Checkpoint manager over the JSON-file store.
pub type CoreCheckpointManager<C> = CheckpointManager<JsonFileCheckpointStore, C>;
/// Timeline reader over the in-memory repositories.
pub type CoreTimelineService = TimelineService<InMemoryRunRepository, InMemoryEventRepository>;
/// Gateway over the in-memory repositories.
pub type CoreGateway<I, C> = ToolGateway<
    I,
    InMemoryApprovalRepository,
    InMemoryTaskRepository,
    InMemoryRunRepository,
    InMemoryEventRepository,
    JsonFileCheckpointStore,
    C,
>;

/// One fully wired instance of the core.
///
/// Runs, tasks, approvals and events live in memory for the lifetime of the
/// context. Checkpoints are written as JSON below the workspace so they
/// survive it.
pub struct CoreContext<I, C>
where
    I: ToolInvoker,
    C: Clock + Send + Sync,
{
    settings: CoreSettings,
    policy: Arc<PolicyEngine>,
    events: Arc<CoreEventLog<C>>,
    runs: CoreRunService<C>,
    tasks: CoreTaskService<C>,
    approvals: Arc<CoreApprovalService<C>>,
    checkpoints: Arc<CoreCheckpointManager<C>>,
    timeline: CoreTimelineService,
    gateway: CoreGateway<I, C>,
}

impl<I, C> CoreContext<I, C>
where
    I: ToolInvoker,
    C: Clock + Send + Sync,
{
    /// Builds every component for the workspace at `workspace_root`.
    ///
    /// A relative checkpoint storage directory is resolved against the
    /// workspace root.
    ///
    /// # Errors
    ///
    /// Returns [`crate::checkpoint::services::CheckpointError`] when the
    /// workspace or the checkpoint directory cannot be opened.
    pub fn new(
        settings: CoreSettings,
        workspace_root: &Utf8Path,
        invoker: Arc<I>,
        clock: Arc<C>,
    ) -> CheckpointResult<Self> {
        let policy = Arc::new(PolicyEngine::from_settings(&settings.policy));

        let event_repository = Arc::new(InMemoryEventRepository::new());
        let events = Arc::new(EventLog::new(
            Arc::clone(&event_repository),
            Arc::clone(&clock),
        ));

        let run_repository = Arc::new(InMemoryRunRepository::new());
        let runs = RunLifecycleService::new(
            Arc::clone(&run_repository),
            Arc::clone(&events),
            Arc::clone(&clock),
        );
        let tasks = TaskLifecycleService::new(
            Arc::new(InMemoryTaskRepository::new()),
            Arc::clone(&run_repository),
            Arc::clone(&events),
            Arc::clone(&clock),
        );
        let approvals = Arc::new(ApprovalWorkflowService::new(
            Arc::new(InMemoryApprovalRepository::new()),
            Arc::clone(&events),
            Arc::clone(&clock),
        ));

        let storage_dir = workspace_root.join(&settings.checkpoint.storage_dir);
        let store = Arc::new(JsonFileCheckpointStore::open(storage_dir)?);
        let checkpoints = Arc::new(CheckpointManager::open(workspace_root, store, clock)?);

        let timeline = TimelineService::new(run_repository, event_repository);
        let gateway = ToolGateway::new(
            Arc::clone(&policy),
            invoker,
            Arc::clone(&approvals),
            tasks.clone(),
            Arc::clone(&checkpoints),
            Arc::clone(&events),
        );

        tracing::info!(
            workspace = %checkpoints.root(),
            mode = %policy.mode(),
            "core context ready"
        );
        Ok(Self {
            settings,
            policy,
            events,
            runs,
            tasks,
            approvals,
            checkpoints,
            timeline,
            gateway,
        })
    }

    /// Returns the settings the context was built from.
    #[must_use]
    pub const fn settings(&self) -> &CoreSettings {
        &self.settings
    }

    /// Returns the policy engine.
    #[must_use]
    pub fn policy(&self) -> &PolicyEngine {
        &self.policy
    }

    /// Returns the event log; subscribe here for live notifications.
    #[must_use]
    pub fn events(&self) -> &CoreEventLog<C> {
        &self.events
    }

    /// Returns the run service.
    #[must_use]
    pub const fn runs(&self) -> &CoreRunService<C> {
        &self.runs
    }

    /// Returns the task service.
    #[must_use]
    pub const fn tasks(&self) -> &CoreTaskService<C> {
        &self.tasks
    }

    /// Returns the approval service.
    #[must_use]
    pub fn approvals(&self) -> &CoreApprovalService<C> {
        &self.approvals
    }

    /// Returns the checkpoint manager.
    #[must_use]
    pub fn checkpoints(&self) -> &CoreCheckpointManager<C> {
        &self.checkpoints
    }

    /// Returns the timeline reader.
    #[must_use]
    pub const fn timeline(&self) -> &CoreTimelineService {
        &self.timeline
    }

    /// Returns the tool gateway.
    #[must_use]
    pub const fn gateway(&self) -> &CoreGateway<I, C> {
        &self.gateway
    }

    /// Prunes checkpoints down to the configured retention.
    ///
    /// # Errors
    ///
    /// Returns [`crate::checkpoint::services::CheckpointError`] when the
    /// checkpoints cannot be listed.
    pub fn prune_checkpoints(&self) -> CheckpointResult<usize> {
        self.checkpoints
            .prune_older_than(self.settings.checkpoint.keep_last)
    }
}
