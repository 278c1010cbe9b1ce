//! JSON-file checkpoint store.
//!
//! Each checkpoint is written to `<id>.json` in the storage directory. The
//! directory is opened once through `cap-std`, so record names can never
//! escape it. Writes go to a temporary name first and are renamed into
//! place.

use crate::checkpoint::{
    domain::{Checkpoint, CheckpointId},
    ports::{CheckpointStore, CheckpointStoreError, CheckpointStoreResult},
};
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use std::io::ErrorKind;

const RECORD_EXTENSION: &str = ".json";

/// Checkpoint store backed by a directory of JSON files.
#[derive(Debug)]
pub struct JsonFileCheckpointStore {
    root: Utf8PathBuf,
    dir: Dir,
}

impl JsonFileCheckpointStore {
    /// Opens the storage directory, creating it when missing.
    ///
    /// # Errors
    ///
    /// Returns [`CheckpointStoreError::Persistence`] when the directory
    /// cannot be created or opened.
    pub fn open(root: impl Into<Utf8PathBuf>) -> CheckpointStoreResult<Self> {
        let root_path = root.into();
        Dir::create_ambient_dir_all(&root_path, ambient_authority())
            .map_err(CheckpointStoreError::persistence)?;
        let dir = Dir::open_ambient_dir(&root_path, ambient_authority())
            .map_err(CheckpointStoreError::persistence)?;
        Ok(Self {
            root: root_path,
            dir,
        })
    }

    /// Returns the storage directory path.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    fn read_record(&self, name: &str) -> Option<Checkpoint> {
        let contents = match self.dir.read_to_string(name) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return None,
            Err(err) => {
                tracing::warn!(record = name, error = %err, "unreadable checkpoint record skipped");
                return None;
            }
        };
        match serde_json::from_str(&contents) {
            Ok(checkpoint) => Some(checkpoint),
            Err(err) => {
                tracing::warn!(record = name, error = %err, "invalid checkpoint record skipped");
                None
            }
        }
    }
}

fn record_name(id: CheckpointId) -> String {
    format!("{id}{RECORD_EXTENSION}")
}

impl CheckpointStore for JsonFileCheckpointStore {
    fn save(&self, checkpoint: &Checkpoint) -> CheckpointStoreResult<()> {
        let name = record_name(checkpoint.id());
        let staging = format!(".{name}.tmp");
        let body =
            serde_json::to_string_pretty(checkpoint).map_err(CheckpointStoreError::persistence)?;
        self.dir
            .write(&staging, body)
            .map_err(CheckpointStoreError::persistence)?;
        self.dir
            .rename(&staging, &self.dir, &name)
            .map_err(CheckpointStoreError::persistence)?;
        Ok(())
    }

    fn load(&self, id: CheckpointId) -> CheckpointStoreResult<Option<Checkpoint>> {
        Ok(self.read_record(&record_name(id)))
    }

    fn list(&self) -> CheckpointStoreResult<Vec<Checkpoint>> {
        let entries = self
            .dir
            .entries()
            .map_err(CheckpointStoreError::persistence)?;
        let mut checkpoints = Vec::new();
        for entry in entries {
            let Ok(name) = entry.and_then(|item| item.file_name()) else {
                continue;
            };
            if name.starts_with('.') || !name.ends_with(RECORD_EXTENSION) {
                continue;
            }
            if let Some(checkpoint) = self.read_record(&name) {
                checkpoints.push(checkpoint);
            }
        }
        Ok(checkpoints)
    }

    fn delete(&self, id: CheckpointId) -> CheckpointStoreResult<bool> {
        match self.dir.remove_file(record_name(id)) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(CheckpointStoreError::persistence(err)),
        }
    }
}
