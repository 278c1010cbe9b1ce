//! Adapter implementations for approval ports.

pub mod memory;
