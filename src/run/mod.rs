//! Run and task lifecycles.
//!
//! A run is one agent execution session working toward a goal; tasks are the
//! units of work inside it. Both are guarded by fixed transition tables so
//! that terminal states stay terminal. The module follows the same layout as
//! every other context:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
