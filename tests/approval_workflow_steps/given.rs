//! Given steps for approval workflow BDD scenarios.

use super::world::{ApprovalWorld, Stage};
use eyre::WrapErr;
use rstest_bdd_macros::given;

#[given("a run with a task in progress")]
fn run_with_task(world: &mut ApprovalWorld) -> Result<(), eyre::Report> {
    let stage = Stage::open().wrap_err("wire core for approval scenario")?;
    world.stage = Some(stage);
    Ok(())
}
