//! Then steps for approval workflow BDD scenarios.

use super::world::ApprovalWorld;
use parapet::approval::domain::ApprovalType;
use parapet::gateway::domain::ToolCallOutcome;
use parapet::run::domain::TaskStatus;
use rstest_bdd_macros::then;

#[then(r#"the call awaits approval of type "{kind}""#)]
fn awaits_approval(world: &ApprovalWorld, kind: String) -> Result<(), eyre::Report> {
    let expected = ApprovalType::try_from(kind.as_str())
        .map_err(|err| eyre::eyre!("invalid approval type in scenario: {err}"))?;
    let outcome = world.outcome()?;
    let ToolCallOutcome::AwaitingApproval { approval_id, .. } = outcome else {
        return Err(eyre::eyre!("expected a parked call, got {outcome:?}"));
    };
    let approval = world
        .stage()?
        .context
        .approvals()
        .find(*approval_id)?
        .ok_or_else(|| eyre::eyre!("approval {approval_id} was not stored"))?;
    if approval.approval_type() != expected || !approval.is_pending() {
        return Err(eyre::eyre!(
            "expected pending {expected} approval, found {} {}",
            approval.status(),
            approval.approval_type()
        ));
    }
    Ok(())
}

#[then("the call was executed")]
fn call_executed(world: &ApprovalWorld) -> Result<(), eyre::Report> {
    let outcome = world.outcome()?;
    if !matches!(outcome, ToolCallOutcome::Executed { .. }) {
        return Err(eyre::eyre!("expected an executed call, got {outcome:?}"));
    }
    Ok(())
}

#[then(r#"the call is denied with "{reason}""#)]
fn call_denied(world: &ApprovalWorld, reason: String) -> Result<(), eyre::Report> {
    match world.outcome()? {
        ToolCallOutcome::Denied { reason: actual } if *actual == reason => Ok(()),
        other => Err(eyre::eyre!("expected denial '{reason}', got {other:?}")),
    }
}

#[then(r#"the task is "{status}""#)]
fn task_status_is(world: &ApprovalWorld, status: String) -> Result<(), eyre::Report> {
    let expected = TaskStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid task status in scenario: {err}"))?;
    let stage = world.stage()?;
    let task = stage
        .context
        .tasks()
        .find(stage.task.id())?
        .ok_or_else(|| eyre::eyre!("task disappeared"))?;
    if task.status() != expected {
        return Err(eyre::eyre!(
            "expected task status {expected}, found {}",
            task.status()
        ));
    }
    Ok(())
}

#[then("the tool has not been invoked")]
fn tool_not_invoked(world: &ApprovalWorld) -> Result<(), eyre::Report> {
    let calls = world.stage()?.invoker.calls();
    if !calls.is_empty() {
        return Err(eyre::eyre!("expected no invocations, got {calls:?}"));
    }
    Ok(())
}

#[then("the tool has been invoked {count:usize} times")]
fn tool_invoked(world: &ApprovalWorld, count: usize) -> Result<(), eyre::Report> {
    let calls = world.stage()?.invoker.calls();
    if calls.len() != count {
        return Err(eyre::eyre!("expected {count} invocations, got {calls:?}"));
    }
    Ok(())
}
