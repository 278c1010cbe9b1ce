//! Service orchestration tests for runs and tasks.

use crate::audit::{
    adapters::memory::InMemoryEventRepository, domain::EventType, ports::EventRepository,
    services::EventLog,
};
use crate::run::{
    adapters::memory::{InMemoryRunRepository, InMemoryTaskRepository},
    domain::{Run, RunId, RunStatus, TaskStatus, WorkerId},
    services::{
        CreateRunRequest, CreateTaskRequest, RunLifecycleError, RunLifecycleService,
        TaskLifecycleError, TaskLifecycleService,
    },
};
use eyre::{bail, ensure};
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use serde_json::Value;
use std::sync::Arc;
use std::thread;

type Runs = RunLifecycleService<InMemoryRunRepository, InMemoryEventRepository, DefaultClock>;
type Tasks = TaskLifecycleService<
    InMemoryTaskRepository,
    InMemoryRunRepository,
    InMemoryEventRepository,
    DefaultClock,
>;

struct Harness {
    events: Arc<InMemoryEventRepository>,
    runs: Runs,
    tasks: Tasks,
}

impl Harness {
    fn recorded_types(&self, run_id: RunId) -> eyre::Result<Vec<EventType>> {
        Ok(self
            .events
            .find_by_run(run_id, None, 100)?
            .iter()
            .map(|event| event.event_type())
            .collect())
    }

    fn start_run(&self) -> eyre::Result<Run> {
        Ok(self
            .runs
            .create_run(CreateRunRequest::new("Refactor the parser", "/work/repo"))?)
    }
}

#[fixture]
fn harness() -> Harness {
    let clock = Arc::new(DefaultClock);
    let events = Arc::new(InMemoryEventRepository::new());
    let log = Arc::new(EventLog::new(Arc::clone(&events), Arc::clone(&clock)));
    let run_repository = Arc::new(InMemoryRunRepository::new());
    Harness {
        events,
        runs: RunLifecycleService::new(
            Arc::clone(&run_repository),
            Arc::clone(&log),
            Arc::clone(&clock),
        ),
        tasks: TaskLifecycleService::new(
            Arc::new(InMemoryTaskRepository::new()),
            run_repository,
            log,
            clock,
        ),
    }
}

#[rstest]
fn create_run_starts_it_and_records_the_goal(harness: Harness) -> eyre::Result<()> {
    let request = CreateRunRequest::new("Refactor the parser", "/work/repo").with_branch("feat/x");
    let run = harness.runs.create_run(request)?;
    ensure!(run.status() == RunStatus::Running);
    ensure!(run.branch() == Some("feat/x"));

    let events = harness.events.find_by_run(run.id(), None, 10)?;
    let Some(started) = events.first() else {
        bail!("run.started was not recorded");
    };
    ensure!(started.event_type() == EventType::RunStarted);
    let goal = started.data().get("goal").and_then(Value::as_str);
    ensure!(goal == Some("Refactor the parser"));
    Ok(())
}

#[rstest]
fn run_completion_and_failure_are_recorded(harness: Harness) -> eyre::Result<()> {
    let completed = harness.start_run()?;
    harness.runs.complete(completed.id())?;
    ensure!(
        harness.recorded_types(completed.id())?
            == [EventType::RunStarted, EventType::RunCompleted]
    );

    let failed = harness.start_run()?;
    let run = harness.runs.fail(failed.id(), "out of budget")?;
    ensure!(run.status() == RunStatus::Failed);
    ensure!(harness.recorded_types(failed.id())? == [EventType::RunStarted, EventType::RunFailed]);
    Ok(())
}

#[rstest]
fn finished_run_rejects_second_completion(harness: Harness) -> eyre::Result<()> {
    let run = harness.start_run()?;
    harness.runs.cancel(run.id())?;
    match harness.runs.complete(run.id()) {
        Err(RunLifecycleError::Domain(_)) => {}
        other => bail!("expected domain error, got {other:?}"),
    }
    ensure!(harness.recorded_types(run.id())?.len() == 2);
    Ok(())
}

#[rstest]
fn unknown_run_is_reported(harness: Harness) -> eyre::Result<()> {
    let missing = RunId::new();
    match harness.runs.complete(missing) {
        Err(RunLifecycleError::NotFound(id)) => ensure!(id == missing),
        other => bail!("expected not found, got {other:?}"),
    }
    Ok(())
}

#[rstest]
fn listing_separates_active_and_recent(harness: Harness) -> eyre::Result<()> {
    let first = harness.start_run()?;
    let second = harness.start_run()?;
    harness.runs.complete(first.id())?;

    let active = harness.runs.list_active()?;
    ensure!(active.iter().map(Run::id).collect::<Vec<_>>() == [second.id()]);
    ensure!(harness.runs.list_recent(10)?.len() == 2);
    ensure!(harness.runs.list_recent(1)?.len() == 1);
    Ok(())
}

#[rstest]
fn task_needs_an_active_run(harness: Harness) -> eyre::Result<()> {
    let missing = RunId::new();
    match harness.tasks.create_task(CreateTaskRequest::new(missing, "Orphan")) {
        Err(TaskLifecycleError::RunNotFound(id)) => ensure!(id == missing),
        other => bail!("expected run not found, got {other:?}"),
    }

    let run = harness.start_run()?;
    harness.runs.complete(run.id())?;
    match harness.tasks.create_task(CreateTaskRequest::new(run.id(), "Late")) {
        Err(TaskLifecycleError::RunNotActive(id)) => ensure!(id == run.id()),
        other => bail!("expected run not active, got {other:?}"),
    }
    Ok(())
}

#[rstest]
fn task_lifecycle_records_each_step(harness: Harness) -> eyre::Result<()> {
    let run = harness.start_run()?;
    let task = harness.tasks.create_task(
        CreateTaskRequest::new(run.id(), "Edit lexer").with_description("Split tokens"),
    )?;
    ensure!(task.description() == "Split tokens");

    harness.tasks.assign(task.id(), WorkerId::new("worker-1")?)?;
    harness.tasks.block(task.id(), "awaiting approval")?;
    harness.tasks.unblock(task.id())?;
    let done = harness
        .tasks
        .complete(task.id(), &["lexer.rs".to_owned()])?;
    ensure!(done.status() == TaskStatus::Completed);
    ensure!(done.output_refs() == ["lexer.rs"]);

    ensure!(
        harness.recorded_types(run.id())?
            == [
                EventType::RunStarted,
                EventType::TaskCreated,
                EventType::TaskAssigned,
                EventType::TaskBlocked,
                EventType::TaskUnblocked,
                EventType::TaskCompleted,
            ]
    );
    Ok(())
}

#[rstest]
fn illegal_task_transition_records_nothing(harness: Harness) -> eyre::Result<()> {
    let run = harness.start_run()?;
    let task = harness
        .tasks
        .create_task(CreateTaskRequest::new(run.id(), "Edit lexer"))?;
    match harness.tasks.fail(task.id(), "boom") {
        Err(TaskLifecycleError::Domain(_)) => {}
        other => bail!("expected domain error, got {other:?}"),
    }
    ensure!(harness.recorded_types(run.id())?.len() == 2);
    let stored = harness.tasks.find(task.id())?;
    ensure!(stored.map(|found| found.status()) == Some(TaskStatus::Pending));
    Ok(())
}

#[rstest]
fn tasks_are_listed_by_priority(harness: Harness) -> eyre::Result<()> {
    let run = harness.start_run()?;
    for (title, priority) in [("low", 1), ("high", 5), ("also low", 1)] {
        harness
            .tasks
            .create_task(CreateTaskRequest::new(run.id(), title).with_priority(priority))?;
    }
    let titles: Vec<String> = harness
        .tasks
        .list_for_run(run.id())?
        .iter()
        .map(|task| task.title().to_owned())
        .collect();
    ensure!(titles == ["high", "low", "also low"]);
    Ok(())
}

#[rstest]
fn concurrent_completions_have_one_winner(harness: Harness) -> eyre::Result<()> {
    let run = harness.start_run()?;
    let task = harness
        .tasks
        .create_task(CreateTaskRequest::new(run.id(), "Race"))?;
    harness.tasks.assign(task.id(), WorkerId::new("worker-1")?)?;

    let task_id = task.id();
    let handles: Vec<_> = (0..8)
        .map(|index| {
            let tasks = harness.tasks.clone();
            thread::spawn(move || {
                if index < 4 {
                    tasks.complete(task_id, &[]).is_ok()
                } else {
                    tasks.fail(task_id, "lost the race").is_ok()
                }
            })
        })
        .collect();

    let mut winners = 0_usize;
    for handle in handles {
        match handle.join() {
            Ok(true) => winners += 1,
            Ok(false) => {}
            Err(_) => bail!("transition thread panicked"),
        }
    }
    ensure!(winners == 1);

    let terminal = harness
        .recorded_types(run.id())?
        .into_iter()
        .filter(|event_type| {
            matches!(event_type, EventType::TaskCompleted | EventType::TaskFailed)
        })
        .count();
    ensure!(terminal == 1);
    Ok(())
}
