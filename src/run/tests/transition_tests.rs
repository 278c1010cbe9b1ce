//! Transition tables for runs and tasks.

use crate::run::domain::{RunStatus, TaskStatus, TaskTransition};
use eyre::{bail, ensure};
use rstest::rstest;

const ALL_RUN_STATUSES: [RunStatus; 5] = [
    RunStatus::Pending,
    RunStatus::Running,
    RunStatus::Completed,
    RunStatus::Failed,
    RunStatus::Cancelled,
];

#[rstest]
#[case(RunStatus::Pending, RunStatus::Running, true)]
#[case(RunStatus::Pending, RunStatus::Cancelled, true)]
#[case(RunStatus::Pending, RunStatus::Completed, false)]
#[case(RunStatus::Pending, RunStatus::Failed, false)]
#[case(RunStatus::Running, RunStatus::Completed, true)]
#[case(RunStatus::Running, RunStatus::Failed, true)]
#[case(RunStatus::Running, RunStatus::Cancelled, true)]
#[case(RunStatus::Running, RunStatus::Pending, false)]
#[case(RunStatus::Running, RunStatus::Running, false)]
fn run_transition_table(
    #[case] from: RunStatus,
    #[case] to: RunStatus,
    #[case] allowed: bool,
) -> eyre::Result<()> {
    ensure!(from.can_transition_to(to) == allowed);
    match from.apply(to) {
        Ok(status) => ensure!(allowed && status == to),
        Err(err) => ensure!(!allowed && err.from == from && err.to == to),
    }
    Ok(())
}

#[rstest]
#[case(RunStatus::Completed)]
#[case(RunStatus::Failed)]
#[case(RunStatus::Cancelled)]
fn terminal_runs_never_move(#[case] terminal: RunStatus) -> eyre::Result<()> {
    ensure!(terminal.is_terminal());
    for target in ALL_RUN_STATUSES {
        if terminal.apply(target).is_ok() {
            bail!("{terminal} moved to {target}");
        }
    }
    Ok(())
}

#[rstest]
#[case(TaskStatus::Pending, TaskTransition::Assign, Some(TaskStatus::InProgress))]
#[case(TaskStatus::InProgress, TaskTransition::Block, Some(TaskStatus::Blocked))]
#[case(TaskStatus::Blocked, TaskTransition::Unblock, Some(TaskStatus::InProgress))]
#[case(TaskStatus::InProgress, TaskTransition::Complete, Some(TaskStatus::Completed))]
#[case(TaskStatus::InProgress, TaskTransition::Fail, Some(TaskStatus::Failed))]
#[case(TaskStatus::Pending, TaskTransition::Complete, None)]
#[case(TaskStatus::Pending, TaskTransition::Block, None)]
#[case(TaskStatus::Blocked, TaskTransition::Complete, None)]
#[case(TaskStatus::Blocked, TaskTransition::Fail, None)]
#[case(TaskStatus::InProgress, TaskTransition::Assign, None)]
#[case(TaskStatus::Completed, TaskTransition::Fail, None)]
#[case(TaskStatus::Failed, TaskTransition::Unblock, None)]
fn task_transition_table(
    #[case] from: TaskStatus,
    #[case] transition: TaskTransition,
    #[case] expected: Option<TaskStatus>,
) {
    assert_eq!(from.apply(transition).ok(), expected);
}

#[rstest]
#[case("running", RunStatus::Running)]
#[case("CANCELLED", RunStatus::Cancelled)]
fn run_status_parses_case_insensitively(#[case] raw: &str, #[case] expected: RunStatus) {
    assert_eq!(RunStatus::try_from(raw).ok(), Some(expected));
}

#[rstest]
fn task_status_round_trips_storage_names() -> eyre::Result<()> {
    for status in [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Completed,
        TaskStatus::Failed,
        TaskStatus::Blocked,
    ] {
        ensure!(TaskStatus::try_from(status.as_str()).ok() == Some(status));
    }
    ensure!(TaskStatus::try_from("paused").is_err());
    Ok(())
}
