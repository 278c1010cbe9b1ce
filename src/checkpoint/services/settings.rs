//! Configuration values for checkpoint storage.

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Checkpoint settings as they appear in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckpointSettings {
    /// Directory holding one JSON record per checkpoint.
    pub storage_dir: Utf8PathBuf,
    /// How many of the newest checkpoints pruning keeps.
    pub keep_last: usize,
}

impl Default for CheckpointSettings {
    fn default() -> Self {
        Self {
            storage_dir: Utf8PathBuf::from(".parapet/checkpoints"),
            keep_last: 50,
        }
    }
}
