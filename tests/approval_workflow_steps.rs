//! Behaviour tests for parking risky tool calls behind human approval.

#[path = "approval_workflow_steps/mod.rs"]
mod approval_workflow_steps_defs;
#[expect(dead_code, reason = "the argument builder is only used by in-memory tests")]
mod test_helpers;

use approval_workflow_steps_defs::world::{ApprovalWorld, world};
use rstest_bdd_macros::scenario;

#[scenario(
    path = "tests/features/approval_workflow.feature",
    name = "A risky shell command waits for approval"
)]
fn risky_command_waits_for_approval(world: ApprovalWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/approval_workflow.feature",
    name = "Approving a parked command runs it"
)]
fn approving_runs_the_command(world: ApprovalWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/approval_workflow.feature",
    name = "Rejecting a parked command denies it"
)]
fn rejecting_denies_the_command(world: ApprovalWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/approval_workflow.feature",
    name = "Reading a secret never reaches the tool"
)]
fn secret_read_is_denied(world: ApprovalWorld) {
    let _ = world;
}
