//! Approval status machine.

use super::ParseApprovalStatusError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Approval lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    /// Waiting for a human decision.
    Pending,
    /// The action was allowed.
    Approved,
    /// The action was refused.
    Rejected,
    /// Nobody decided in time.
    Expired,
}

/// Status-level rejection of an approval transition.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("cannot move approval from {from} to {to}")]
pub struct ApprovalTransitionError {
    /// Status at the time of the attempt.
    pub from: ApprovalStatus,
    /// Requested status.
    pub to: ApprovalStatus,
}

impl ApprovalStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Expired => "expired",
        }
    }

    /// Applies a transition, returning the new status.
    ///
    /// Only pending approvals move, and only to a final status.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalTransitionError`] for every other combination.
    pub const fn apply(self, target: Self) -> Result<Self, ApprovalTransitionError> {
        match (self, target) {
            (Self::Pending, Self::Approved | Self::Rejected | Self::Expired) => Ok(target),
            _ => Err(ApprovalTransitionError {
                from: self,
                to: target,
            }),
        }
    }

    /// Returns `true` for approved and rejected approvals.
    #[must_use]
    pub const fn is_resolved(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

impl TryFrom<&str> for ApprovalStatus {
    type Error = ParseApprovalStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "expired" => Ok(Self::Expired),
            _ => Err(ParseApprovalStatusError(value.to_owned())),
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
