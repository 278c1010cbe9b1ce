//! Adapter implementations for the audit ports.

pub mod memory;
