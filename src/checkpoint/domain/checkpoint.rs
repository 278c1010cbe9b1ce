//! Checkpoint records.

use super::CheckpointId;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Content of one file as it was before a mutation.
///
/// Content is kept as raw bytes and stored base64-encoded, so binary files
/// restore byte for byte.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSnapshot {
    path: Utf8PathBuf,
    #[serde(
        serialize_with = "serialize_content",
        deserialize_with = "deserialize_content"
    )]
    content: Vec<u8>,
    modified_at: DateTime<Utc>,
}

impl FileSnapshot {
    /// Creates a snapshot of `content` at an absolute `path`.
    #[must_use]
    pub fn new(
        path: impl Into<Utf8PathBuf>,
        content: impl Into<Vec<u8>>,
        modified_at: DateTime<Utc>,
    ) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            modified_at,
        }
    }

    /// Returns the absolute path of the file.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Returns the captured content.
    #[must_use]
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Returns the file's modification time at capture.
    #[must_use]
    pub const fn modified_at(&self) -> DateTime<Utc> {
        self.modified_at
    }
}

fn serialize_content<S>(content: &[u8], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&STANDARD.encode(content))
}

fn deserialize_content<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let encoded = String::deserialize(deserializer)?;
    STANDARD
        .decode(encoded.as_bytes())
        .map_err(serde::de::Error::custom)
}

/// Immutable bundle of snapshots taken in one tracking epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    id: CheckpointId,
    turn: u64,
    created_at: DateTime<Utc>,
    message: String,
    snapshots: Vec<FileSnapshot>,
}

impl Checkpoint {
    /// Creates a checkpoint stamped with the current clock time.
    #[must_use]
    pub fn new(
        turn: u64,
        message: impl Into<String>,
        snapshots: Vec<FileSnapshot>,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: CheckpointId::new(),
            turn,
            created_at: clock.utc(),
            message: message.into(),
            snapshots,
        }
    }

    /// Returns the checkpoint identifier.
    #[must_use]
    pub const fn id(&self) -> CheckpointId {
        self.id
    }

    /// Returns the conversation turn the checkpoint was taken in.
    #[must_use]
    pub const fn turn(&self) -> u64 {
        self.turn
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the description.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the snapshots in tracking order.
    #[must_use]
    pub fn snapshots(&self) -> &[FileSnapshot] {
        &self.snapshots
    }
}
