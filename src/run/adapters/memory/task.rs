//! In-memory task repository.

use super::lock_error;
use crate::run::{
    domain::{RunId, Task, TaskId},
    ports::{RunRepositoryError, RunRepositoryResult, TaskRepository},
};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Thread-safe in-memory task repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, Task>,
    run_index: HashMap<RunId, Vec<TaskId>>,
}

impl InMemoryTaskRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TaskRepository for InMemoryTaskRepository {
    fn store(&self, task: &Task) -> RunRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| lock_error(&err))?;
        if state.tasks.contains_key(&task.id()) {
            return Err(RunRepositoryError::DuplicateTask(task.id()));
        }
        state
            .run_index
            .entry(task.run_id())
            .or_default()
            .push(task.id());
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    fn update(&self, task: &Task) -> RunRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| lock_error(&err))?;
        let slot = state
            .tasks
            .get_mut(&task.id())
            .ok_or(RunRepositoryError::TaskNotFound(task.id()))?;
        *slot = task.clone();
        Ok(())
    }

    fn find_by_id(&self, id: TaskId) -> RunRepositoryResult<Option<Task>> {
        let state = self.state.read().map_err(|err| lock_error(&err))?;
        Ok(state.tasks.get(&id).cloned())
    }

    fn find_by_run(&self, run_id: RunId) -> RunRepositoryResult<Vec<Task>> {
        let state = self.state.read().map_err(|err| lock_error(&err))?;
        let tasks = state
            .run_index
            .get(&run_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| state.tasks.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default();
        Ok(tasks)
    }
}
