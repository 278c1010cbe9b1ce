//! Repository port for approvals.

use crate::approval::domain::{Approval, ApprovalId};
use crate::run::domain::RunId;
use std::sync::Arc;
use thiserror::Error;

/// Result type for approval repository operations.
pub type ApprovalRepositoryResult<T> = Result<T, ApprovalRepositoryError>;

/// Approval persistence contract.
pub trait ApprovalRepository: Send + Sync {
    /// Stores a new approval.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalRepositoryError::DuplicateApproval`] when the
    /// identifier already exists.
    fn store(&self, approval: &Approval) -> ApprovalRepositoryResult<()>;

    /// Persists the resolution of an existing approval.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalRepositoryError::NotFound`] when the approval does
    /// not exist.
    fn update(&self, approval: &Approval) -> ApprovalRepositoryResult<()>;

    /// Finds an approval by identifier.
    fn find_by_id(&self, id: ApprovalId) -> ApprovalRepositoryResult<Option<Approval>>;

    /// Returns every approval of a run, oldest first.
    fn find_by_run(&self, run_id: RunId) -> ApprovalRepositoryResult<Vec<Approval>>;

    /// Returns the pending approvals of a run, oldest first.
    fn find_pending_by_run(&self, run_id: RunId) -> ApprovalRepositoryResult<Vec<Approval>>;

    /// Counts the pending approvals of a run.
    fn count_pending(&self, run_id: RunId) -> ApprovalRepositoryResult<usize>;
}

/// Errors returned by approval repository implementations.
#[derive(Debug, Clone, Error)]
pub enum ApprovalRepositoryError {
    /// An approval with the same identifier already exists.
    #[error("duplicate approval identifier: {0}")]
    DuplicateApproval(ApprovalId),

    /// The approval was not found.
    #[error("approval not found: {0}")]
    NotFound(ApprovalId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ApprovalRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
