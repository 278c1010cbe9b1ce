//! Adapter implementations for the checkpoint store port.
//!
//! - [`memory::InMemoryCheckpointStore`]: map-backed store for tests
//! - [`json_file::JsonFileCheckpointStore`]: one pretty-printed JSON file per
//!   checkpoint in a storage directory

pub mod json_file;
pub mod memory;
