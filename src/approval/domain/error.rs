//! Error types for approval validation and transitions.

use super::{ApprovalId, ApprovalStatus};
use thiserror::Error;

/// Errors returned while creating or resolving approvals.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApprovalDomainError {
    /// The approval target is empty after trimming.
    #[error("approval target must not be empty")]
    EmptyTarget,

    /// The resolver name is empty after trimming.
    #[error("approval resolver must not be empty")]
    EmptyResolver,

    /// The status change is not allowed from the current status.
    #[error("cannot move approval {approval_id} from {from} to {to}")]
    InvalidTransition {
        /// Approval whose transition was rejected.
        approval_id: ApprovalId,
        /// Status at the time of the attempt.
        from: ApprovalStatus,
        /// Requested status.
        to: ApprovalStatus,
    },

    /// The approval passed its expiry instant before being resolved.
    #[error("cannot resolve expired approval {0}")]
    Expired(ApprovalId),
}

/// Error returned while parsing approval statuses.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown approval status: {0}")]
pub struct ParseApprovalStatusError(pub String);

/// Error returned while parsing approval types.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown approval type: {0}")]
pub struct ParseApprovalTypeError(pub String);
