//! Port contracts for approval persistence.

pub mod repository;

pub use repository::{ApprovalRepository, ApprovalRepositoryError, ApprovalRepositoryResult};
