//! Tracking epochs, checkpoint creation and restoration.

use super::workspace::relative_to_root;
use crate::checkpoint::{
    domain::{Checkpoint, CheckpointId, FileSnapshot},
    ports::{CheckpointStore, CheckpointStoreError},
};
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::cmp::Reverse;
use std::io::ErrorKind;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

/// Errors returned by checkpoint operations.
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// The workspace root could not be opened.
    #[error("cannot open workspace {path}: {source}")]
    Workspace {
        /// Root that failed to open.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// A file inside the workspace could not be written.
    #[error("cannot write {path}: {source}")]
    Io {
        /// File that failed.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The path resolves outside the workspace root.
    #[error("path is outside the workspace: {0}")]
    OutsideWorkspace(Utf8PathBuf),
    /// No checkpoint has the identifier.
    #[error("checkpoint not found: {0}")]
    NotFound(CheckpointId),
    /// The checkpoint store failed.
    #[error(transparent)]
    Store(#[from] CheckpointStoreError),
}

/// Result type for checkpoint operations.
pub type CheckpointResult<T> = Result<T, CheckpointError>;

#[derive(Debug, Default)]
struct TrackingEpoch {
    turn: u64,
    tracked: Vec<(Utf8PathBuf, Option<FileSnapshot>)>,
}

impl TrackingEpoch {
    fn is_tracked(&self, path: &Utf8Path) -> bool {
        self.tracked.iter().any(|(tracked, _)| tracked == path)
    }
}

/// Captures pre-mutation snapshots inside one workspace and restores them.
///
/// All paths are resolved against the workspace root, which is opened once
/// as a capability: files outside it can be neither read nor written.
pub struct CheckpointManager<S, C>
where
    S: CheckpointStore,
    C: Clock + Send + Sync,
{
    root: Utf8PathBuf,
    workspace: Dir,
    store: Arc<S>,
    clock: Arc<C>,
    epoch: Mutex<TrackingEpoch>,
}

impl<S, C> CheckpointManager<S, C>
where
    S: CheckpointStore,
    C: Clock + Send + Sync,
{
    /// Opens a manager for the workspace at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`CheckpointError::Workspace`] when the root cannot be
    /// canonicalized or opened.
    pub fn open(root: &Utf8Path, store: Arc<S>, clock: Arc<C>) -> CheckpointResult<Self> {
        let workspace_error = |source| CheckpointError::Workspace {
            path: root.to_owned(),
            source,
        };
        let canonical = root.canonicalize_utf8().map_err(workspace_error)?;
        let workspace =
            Dir::open_ambient_dir(&canonical, ambient_authority()).map_err(workspace_error)?;
        Ok(Self {
            root: canonical,
            workspace,
            store,
            clock,
            epoch: Mutex::new(TrackingEpoch::default()),
        })
    }

    /// Returns the canonical workspace root.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Returns the current conversation turn.
    #[must_use]
    pub fn turn(&self) -> u64 {
        self.epoch().turn
    }

    /// Advances the conversation turn and returns the new value.
    #[must_use]
    pub fn increment_turn(&self) -> u64 {
        let mut epoch = self.epoch();
        epoch.turn = epoch.turn.saturating_add(1);
        epoch.turn
    }

    /// Captures the current content of a file before it is mutated.
    ///
    /// The first call for a path in an epoch wins; later calls are no-ops.
    /// Content is captured as raw bytes. Missing and unreadable files are
    /// recorded without a snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`CheckpointError::OutsideWorkspace`] when the path leaves
    /// the workspace root.
    pub fn track(&self, path: &Utf8Path) -> CheckpointResult<()> {
        let relative = self.resolve(path)?;
        let absolute = self.root.join(&relative);

        let mut epoch = self.epoch();
        if epoch.is_tracked(&absolute) {
            return Ok(());
        }

        let snapshot = match self.workspace.read(&relative) {
            Ok(content) => {
                let modified_at = self.modified_at(&relative);
                Some(FileSnapshot::new(absolute.clone(), content, modified_at))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %absolute, "tracking missing file as new");
                None
            }
            Err(err) => {
                tracing::warn!(
                    path = %absolute,
                    error = %err,
                    "unreadable file tracked without snapshot"
                );
                None
            }
        };
        epoch.tracked.push((absolute, snapshot));
        Ok(())
    }

    /// Returns whether a file exists at the path.
    ///
    /// # Errors
    ///
    /// Returns [`CheckpointError::OutsideWorkspace`] when the path leaves
    /// the workspace root.
    pub fn exists(&self, path: &Utf8Path) -> CheckpointResult<bool> {
        let relative = self.resolve(path)?;
        Ok(self.workspace.exists(&relative))
    }

    /// Returns the absolute paths tracked in the current epoch.
    #[must_use]
    pub fn tracked_paths(&self) -> Vec<Utf8PathBuf> {
        self.epoch()
            .tracked
            .iter()
            .map(|(path, _)| path.clone())
            .collect()
    }

    /// Drops the current epoch without creating a checkpoint.
    pub fn clear_tracked(&self) {
        self.epoch().tracked.clear();
    }

    /// Persists the tracked snapshots as a checkpoint and starts a new epoch.
    ///
    /// Paths tracked as new contribute no snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`CheckpointError::Store`] when the checkpoint cannot be
    /// saved; the epoch is kept in that case.
    pub fn checkpoint(&self, message: &str) -> CheckpointResult<Checkpoint> {
        let mut epoch = self.epoch();
        let snapshots: Vec<FileSnapshot> = epoch
            .tracked
            .iter()
            .filter_map(|(_, snapshot)| snapshot.clone())
            .collect();
        let checkpoint = Checkpoint::new(epoch.turn, message, snapshots, &*self.clock);
        self.store.save(&checkpoint)?;
        epoch.tracked.clear();

        tracing::info!(
            checkpoint_id = %checkpoint.id(),
            turn = checkpoint.turn(),
            snapshots = checkpoint.snapshots().len(),
            "checkpoint created"
        );
        Ok(checkpoint)
    }

    /// Writes every snapshot of a checkpoint back to its path.
    ///
    /// Missing parent directories are created. A file that cannot be
    /// restored is logged and skipped; only restored paths are returned.
    ///
    /// # Errors
    ///
    /// Returns [`CheckpointError::NotFound`] for an unknown checkpoint.
    pub fn restore(&self, checkpoint_id: CheckpointId) -> CheckpointResult<Vec<Utf8PathBuf>> {
        let checkpoint = self
            .store
            .load(checkpoint_id)?
            .ok_or(CheckpointError::NotFound(checkpoint_id))?;

        let mut restored = Vec::with_capacity(checkpoint.snapshots().len());
        for snapshot in checkpoint.snapshots() {
            match self.write_snapshot(snapshot) {
                Ok(()) => restored.push(snapshot.path().to_owned()),
                Err(err) => {
                    tracing::warn!(
                        checkpoint_id = %checkpoint_id,
                        path = %snapshot.path(),
                        error = %err,
                        "snapshot restore skipped"
                    );
                }
            }
        }

        tracing::info!(
            checkpoint_id = %checkpoint_id,
            restored = restored.len(),
            "checkpoint restored"
        );
        Ok(restored)
    }

    /// Returns up to `limit` checkpoints, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`CheckpointError::Store`] when listing fails.
    pub fn list_checkpoints(&self, limit: usize) -> CheckpointResult<Vec<Checkpoint>> {
        let mut checkpoints = self.newest_first()?;
        checkpoints.truncate(limit);
        Ok(checkpoints)
    }

    /// Deletes all but the `keep_last` newest checkpoints.
    ///
    /// Returns how many were deleted. Individual delete failures are logged
    /// and not counted.
    ///
    /// # Errors
    ///
    /// Returns [`CheckpointError::Store`] when listing fails.
    pub fn prune_older_than(&self, keep_last: usize) -> CheckpointResult<usize> {
        let mut deleted = 0_usize;
        for checkpoint in self.newest_first()?.into_iter().skip(keep_last) {
            match self.store.delete(checkpoint.id()) {
                Ok(true) => deleted = deleted.saturating_add(1),
                Ok(false) => {}
                Err(err) => {
                    tracing::warn!(checkpoint_id = %checkpoint.id(), error = %err, "prune skipped");
                }
            }
        }
        Ok(deleted)
    }

    fn newest_first(&self) -> CheckpointResult<Vec<Checkpoint>> {
        let mut checkpoints = self.store.list()?;
        checkpoints.sort_by_key(|checkpoint| Reverse(checkpoint.created_at()));
        Ok(checkpoints)
    }

    fn write_snapshot(&self, snapshot: &FileSnapshot) -> CheckpointResult<()> {
        let relative = self.resolve(snapshot.path())?;
        let io_error = |source| CheckpointError::Io {
            path: snapshot.path().to_owned(),
            source,
        };
        if let Some(parent) = relative.parent().filter(|dir| !dir.as_str().is_empty()) {
            self.workspace.create_dir_all(parent).map_err(io_error)?;
        }
        self.workspace
            .write(&relative, snapshot.content())
            .map_err(io_error)
    }

    fn resolve(&self, path: &Utf8Path) -> CheckpointResult<Utf8PathBuf> {
        relative_to_root(&self.root, path)
            .ok_or_else(|| CheckpointError::OutsideWorkspace(path.to_owned()))
    }

    fn modified_at(&self, relative: &Utf8Path) -> DateTime<Utc> {
        self.workspace
            .metadata(relative)
            .and_then(|metadata| metadata.modified())
            .map_or_else(
                |_| self.clock.utc(),
                |modified| DateTime::<Utc>::from(modified.into_std()),
            )
    }

    fn epoch(&self) -> MutexGuard<'_, TrackingEpoch> {
        self.epoch.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
