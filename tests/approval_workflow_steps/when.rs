//! When steps for approval workflow BDD scenarios.

use super::world::ApprovalWorld;
use crate::test_helpers::args;
use eyre::WrapErr;
use parapet::approval::domain::Resolution;
use parapet::gateway::domain::{ToolCallOutcome, ToolCallRequest};
use parapet::run::domain::WorkerId;
use rstest_bdd_macros::when;
use serde_json::{Value, json};

fn submit(world: &mut ApprovalWorld, tool: &str, arguments: Value) -> Result<(), eyre::Report> {
    let stage = world.stage()?;
    let request = ToolCallRequest::new(stage.run.id(), tool, args(arguments))
        .for_task(stage.task.id())
        .by_worker(WorkerId::new("release-worker")?);
    let outcome = stage
        .context
        .gateway()
        .handle(request)
        .wrap_err("route tool call through the gateway")?;
    world.last_outcome = Some(outcome);
    Ok(())
}

#[when(r#"the worker runs the shell command "{command}""#)]
fn runs_shell_command(world: &mut ApprovalWorld, command: String) -> Result<(), eyre::Report> {
    submit(world, "Bash", json!({ "command": command }))
}

#[when(r#"the worker reads the file "{path}""#)]
fn reads_file(world: &mut ApprovalWorld, path: String) -> Result<(), eyre::Report> {
    submit(world, "Read", json!({ "file_path": path }))
}

#[when(r#"the approval is resolved as "{decision}" by "{reviewer}""#)]
fn approval_resolved(
    world: &mut ApprovalWorld,
    decision: String,
    reviewer: String,
) -> Result<(), eyre::Report> {
    let Some(ToolCallOutcome::AwaitingApproval { approval_id, .. }) = world.last_outcome else {
        return Err(eyre::eyre!("no call is awaiting approval"));
    };
    let resolution = match decision.as_str() {
        "approve" => Resolution::approve(reviewer),
        "reject" => Resolution::reject(reviewer),
        other => return Err(eyre::eyre!("unknown decision in scenario: {other}")),
    };
    let outcome = world
        .stage()?
        .context
        .gateway()
        .resolve(approval_id, resolution)
        .wrap_err("resolve parked call")?;
    world.last_outcome = Some(outcome);
    Ok(())
}
