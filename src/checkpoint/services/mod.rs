//! Application services for capturing and restoring checkpoints.

mod manager;
mod settings;
mod workspace;

pub use manager::{CheckpointError, CheckpointManager, CheckpointResult};
pub use settings::CheckpointSettings;
