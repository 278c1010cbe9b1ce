//! In-memory run repository.

use super::lock_error;
use crate::run::{
    domain::{Run, RunId},
    ports::{RunRepository, RunRepositoryError, RunRepositoryResult},
};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Thread-safe in-memory run repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRunRepository {
    state: Arc<RwLock<HashMap<RunId, Run>>>,
}

impl InMemoryRunRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RunRepository for InMemoryRunRepository {
    fn store(&self, run: &Run) -> RunRepositoryResult<()> {
        let mut runs = self.state.write().map_err(|err| lock_error(&err))?;
        if runs.contains_key(&run.id()) {
            return Err(RunRepositoryError::DuplicateRun(run.id()));
        }
        runs.insert(run.id(), run.clone());
        Ok(())
    }

    fn update(&self, run: &Run) -> RunRepositoryResult<()> {
        let mut runs = self.state.write().map_err(|err| lock_error(&err))?;
        let slot = runs
            .get_mut(&run.id())
            .ok_or(RunRepositoryError::RunNotFound(run.id()))?;
        *slot = run.clone();
        Ok(())
    }

    fn find_by_id(&self, id: RunId) -> RunRepositoryResult<Option<Run>> {
        let runs = self.state.read().map_err(|err| lock_error(&err))?;
        Ok(runs.get(&id).cloned())
    }

    fn find_active(&self) -> RunRepositoryResult<Vec<Run>> {
        let runs = self.state.read().map_err(|err| lock_error(&err))?;
        let mut active: Vec<Run> = runs.values().filter(|run| run.is_active()).cloned().collect();
        active.sort_by_key(Run::created_at);
        Ok(active)
    }

    fn list_recent(&self, limit: usize) -> RunRepositoryResult<Vec<Run>> {
        let runs = self.state.read().map_err(|err| lock_error(&err))?;
        let mut recent: Vec<Run> = runs.values().cloned().collect();
        recent.sort_by_key(|run| std::cmp::Reverse(run.created_at()));
        recent.truncate(limit);
        Ok(recent)
    }
}
