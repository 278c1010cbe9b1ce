//! Map-backed approval store.

use crate::approval::{
    domain::{Approval, ApprovalId},
    ports::{ApprovalRepository, ApprovalRepositoryError, ApprovalRepositoryResult},
};
use crate::run::domain::RunId;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Thread-safe in-memory approval repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryApprovalRepository {
    state: Arc<RwLock<InMemoryApprovalState>>,
}

#[derive(Debug, Default)]
struct InMemoryApprovalState {
    approvals: HashMap<ApprovalId, Approval>,
    run_index: HashMap<RunId, Vec<ApprovalId>>,
}

impl InMemoryApprovalState {
    fn for_run(&self, run_id: RunId) -> impl Iterator<Item = &Approval> {
        self.run_index
            .get(&run_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.approvals.get(id))
    }
}

impl InMemoryApprovalRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error<T>(err: &PoisonError<T>) -> ApprovalRepositoryError {
    ApprovalRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

impl ApprovalRepository for InMemoryApprovalRepository {
    fn store(&self, approval: &Approval) -> ApprovalRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| lock_error(&err))?;
        if state.approvals.contains_key(&approval.id()) {
            return Err(ApprovalRepositoryError::DuplicateApproval(approval.id()));
        }
        state
            .run_index
            .entry(approval.run_id())
            .or_default()
            .push(approval.id());
        state.approvals.insert(approval.id(), approval.clone());
        Ok(())
    }

    fn update(&self, approval: &Approval) -> ApprovalRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| lock_error(&err))?;
        let slot = state
            .approvals
            .get_mut(&approval.id())
            .ok_or(ApprovalRepositoryError::NotFound(approval.id()))?;
        *slot = approval.clone();
        Ok(())
    }

    fn find_by_id(&self, id: ApprovalId) -> ApprovalRepositoryResult<Option<Approval>> {
        let state = self.state.read().map_err(|err| lock_error(&err))?;
        Ok(state.approvals.get(&id).cloned())
    }

    fn find_by_run(&self, run_id: RunId) -> ApprovalRepositoryResult<Vec<Approval>> {
        let state = self.state.read().map_err(|err| lock_error(&err))?;
        Ok(state.for_run(run_id).cloned().collect())
    }

    fn find_pending_by_run(&self, run_id: RunId) -> ApprovalRepositoryResult<Vec<Approval>> {
        let state = self.state.read().map_err(|err| lock_error(&err))?;
        Ok(state
            .for_run(run_id)
            .filter(|approval| approval.is_pending())
            .cloned()
            .collect())
    }

    fn count_pending(&self, run_id: RunId) -> ApprovalRepositoryResult<usize> {
        let state = self.state.read().map_err(|err| lock_error(&err))?;
        Ok(state
            .for_run(run_id)
            .filter(|approval| approval.is_pending())
            .count())
    }
}
