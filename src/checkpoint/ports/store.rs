//! Storage port for checkpoint records.

use crate::checkpoint::domain::{Checkpoint, CheckpointId};
use std::sync::Arc;
use thiserror::Error;

/// Result type for checkpoint store operations.
pub type CheckpointStoreResult<T> = Result<T, CheckpointStoreError>;

/// Checkpoint persistence contract.
///
/// Records must round-trip exactly: `load(save(c).id) == c`.
pub trait CheckpointStore: Send + Sync {
    /// Persists a checkpoint.
    ///
    /// # Errors
    ///
    /// Returns [`CheckpointStoreError::Persistence`] when the record cannot
    /// be written.
    fn save(&self, checkpoint: &Checkpoint) -> CheckpointStoreResult<()>;

    /// Loads a checkpoint by identifier.
    ///
    /// Returns `None` when no readable record exists.
    fn load(&self, id: CheckpointId) -> CheckpointStoreResult<Option<Checkpoint>>;

    /// Returns every readable checkpoint in no particular order.
    fn list(&self) -> CheckpointStoreResult<Vec<Checkpoint>>;

    /// Deletes a checkpoint, returning whether it existed.
    fn delete(&self, id: CheckpointId) -> CheckpointStoreResult<bool>;
}

/// Errors returned by checkpoint store implementations.
#[derive(Debug, Clone, Error)]
pub enum CheckpointStoreError {
    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl CheckpointStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
