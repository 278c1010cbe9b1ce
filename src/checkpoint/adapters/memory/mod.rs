//! In-memory checkpoint store.

use crate::checkpoint::{
    domain::{Checkpoint, CheckpointId},
    ports::{CheckpointStore, CheckpointStoreError, CheckpointStoreResult},
};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Thread-safe in-memory checkpoint store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCheckpointStore {
    state: Arc<RwLock<HashMap<CheckpointId, Checkpoint>>>,
}

impl InMemoryCheckpointStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error<T>(err: &PoisonError<T>) -> CheckpointStoreError {
    CheckpointStoreError::persistence(std::io::Error::other(err.to_string()))
}

impl CheckpointStore for InMemoryCheckpointStore {
    fn save(&self, checkpoint: &Checkpoint) -> CheckpointStoreResult<()> {
        let mut checkpoints = self.state.write().map_err(|err| lock_error(&err))?;
        checkpoints.insert(checkpoint.id(), checkpoint.clone());
        Ok(())
    }

    fn load(&self, id: CheckpointId) -> CheckpointStoreResult<Option<Checkpoint>> {
        let checkpoints = self.state.read().map_err(|err| lock_error(&err))?;
        Ok(checkpoints.get(&id).cloned())
    }

    fn list(&self) -> CheckpointStoreResult<Vec<Checkpoint>> {
        let checkpoints = self.state.read().map_err(|err| lock_error(&err))?;
        Ok(checkpoints.values().cloned().collect())
    }

    fn delete(&self, id: CheckpointId) -> CheckpointStoreResult<bool> {
        let mut checkpoints = self.state.write().map_err(|err| lock_error(&err))?;
        Ok(checkpoints.remove(&id).is_some())
    }
}
