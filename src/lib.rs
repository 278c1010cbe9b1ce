//! Parapet: a safety gate between AI coding agents and a workspace.
//!
//! Every tool call an agent attempts is recorded, checked against a
//! permission policy and then executed, refused or parked until a human
//! decides. Files are snapshotted before they are changed so a turn can be
//! rolled back, and every step of a run lands in an append-only event log.
//!
//! # Architecture
//!
//! Parapet follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for storage and tool execution
//! - **Adapters**: Concrete implementations of ports (in-memory, JSON files)
//!
//! # Modules
//!
//! - [`policy`]: Permission modes, allow/deny rules and decisions
//! - [`run`]: Run and task lifecycles
//! - [`audit`]: Append-only event log and run timelines
//! - [`approval`]: Human approval workflow with risk scoring
//! - [`checkpoint`]: File snapshots and rollback
//! - [`gateway`]: Policy-gated tool execution
//! - [`context`]: Explicit wiring of all of the above

pub mod approval;
pub mod audit;
pub mod checkpoint;
pub mod context;
pub mod gateway;
pub mod policy;
pub mod run;
