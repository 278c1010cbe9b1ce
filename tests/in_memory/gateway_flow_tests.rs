//! Tool calls routed through a fully wired core.

use super::helpers::core;
use crate::test_helpers::args;
use eyre::{bail, ensure};
use parapet::approval::domain::{ApprovalType, Resolution};
use parapet::audit::domain::{Event, EventType};
use parapet::gateway::domain::{ToolCallOutcome, ToolCallRequest};
use parapet::run::{domain::TaskStatus, domain::WorkerId, services::CreateTaskRequest};
use rstest::rstest;
use serde_json::json;
use std::fs;
use std::sync::{Arc, Mutex, PoisonError};

#[rstest]
fn allowed_edit_is_applied_and_can_be_rolled_back() -> eyre::Result<()> {
    let core = core()?;
    fs::create_dir_all(core.root.join("src"))?;
    fs::write(core.root.join("src/lib.rs"), "pub fn old() {}\n")?;

    let outcome = core.context.gateway().handle(ToolCallRequest::new(
        core.run.id(),
        "Edit",
        args(json!({"file_path": "src/lib.rs", "content": "pub fn new() {}\n"})),
    ))?;
    ensure!(matches!(outcome, ToolCallOutcome::Executed { .. }));
    ensure!(fs::read_to_string(core.root.join("src/lib.rs"))? == "pub fn new() {}\n");

    let checkpoints = core.context.checkpoints().list_checkpoints(10)?;
    let Some(checkpoint) = checkpoints.first() else {
        bail!("no checkpoint was created");
    };
    core.context.gateway().rollback(core.run.id(), checkpoint.id())?;
    ensure!(fs::read_to_string(core.root.join("src/lib.rs"))? == "pub fn old() {}\n");
    Ok(())
}

#[rstest]
fn checkpoints_land_in_the_configured_directory() -> eyre::Result<()> {
    let core = core()?;
    core.context.gateway().handle(ToolCallRequest::new(
        core.run.id(),
        "Edit",
        args(json!({"file_path": "src/new.rs", "content": "// new\n"})),
    ))?;
    let storage = core.root.join(".parapet/checkpoints");
    let records = fs::read_dir(&storage)?
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_string_lossy().ends_with(".json"))
        .count();
    ensure!(records == 1);
    ensure!(core.context.prune_checkpoints()? == 0);
    Ok(())
}

#[rstest]
fn risky_command_waits_for_a_human() -> eyre::Result<()> {
    let core = core()?;
    let task = core
        .context
        .tasks()
        .create_task(CreateTaskRequest::new(core.run.id(), "Publish"))?;
    core.context
        .tasks()
        .assign(task.id(), WorkerId::new("worker-7")?)?;

    let outcome = core.context.gateway().handle(
        ToolCallRequest::new(
            core.run.id(),
            "Bash",
            args(json!({"command": "git push origin main"})),
        )
        .for_task(task.id())
        .by_worker(WorkerId::new("worker-7")?),
    )?;
    let ToolCallOutcome::AwaitingApproval { approval_id, .. } = outcome else {
        bail!("expected a parked call, got {outcome:?}");
    };
    ensure!(core.invoker.calls().is_empty());

    let pending = core.context.approvals().pending_for_run(core.run.id())?;
    ensure!(pending.len() == 1);
    ensure!(
        pending.first().map(|approval| approval.approval_type()) == Some(ApprovalType::GitPush)
    );

    let resolved = core
        .context
        .gateway()
        .resolve(approval_id, Resolution::approve("user").with_comment("ship it"))?;
    ensure!(matches!(resolved, ToolCallOutcome::Executed { .. }));
    ensure!(core.invoker.calls() == ["Bash"]);
    let status = core
        .context
        .tasks()
        .find(task.id())?
        .map(|found| found.status());
    ensure!(status == Some(TaskStatus::InProgress));
    Ok(())
}

#[rstest]
fn deny_rules_stop_destructive_commands() -> eyre::Result<()> {
    let core = core()?;
    let outcome = core.context.gateway().handle(ToolCallRequest::new(
        core.run.id(),
        "bash_tool",
        args(json!({"command": "rm -rf /"})),
    ))?;
    ensure!(matches!(outcome, ToolCallOutcome::Denied { .. }));
    ensure!(core.invoker.calls().is_empty());
    Ok(())
}

#[rstest]
fn listeners_observe_gateway_events() -> eyre::Result<()> {
    let core = core()?;
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    core.context.events().subscribe(move |event: &Event| {
        sink.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.event_type());
    });

    core.context.gateway().handle(ToolCallRequest::new(
        core.run.id(),
        "Bash",
        args(json!({"command": "npm run build"})),
    ))?;
    let recorded = seen.lock().unwrap_or_else(PoisonError::into_inner).clone();
    ensure!(recorded == [EventType::ToolCalled, EventType::ToolResult]);
    Ok(())
}
