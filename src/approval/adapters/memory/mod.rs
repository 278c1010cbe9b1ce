//! In-memory approval repository.

mod approvals;

pub use approvals::InMemoryApprovalRepository;
