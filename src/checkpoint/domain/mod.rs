//! Domain model for checkpoints.

mod checkpoint;
mod ids;

pub use checkpoint::{Checkpoint, FileSnapshot};
pub use ids::CheckpointId;
