//! File snapshots and rollback.
//!
//! Before a file is mutated it is tracked: its current content is captured
//! once per tracking epoch, or it is noted as new when it does not exist
//! yet. Turning the epoch into a checkpoint persists the captured snapshots
//! and starts a new epoch. Restoring a checkpoint writes every snapshot back
//! to its path, best effort per file.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
