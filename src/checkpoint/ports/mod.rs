//! Port contracts for checkpoint persistence.

pub mod store;

pub use store::{CheckpointStore, CheckpointStoreError, CheckpointStoreResult};
