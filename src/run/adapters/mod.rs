//! Adapter implementations for run and task ports.

pub mod memory;
