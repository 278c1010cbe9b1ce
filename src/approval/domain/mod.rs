//! Domain model for approvals.

mod approval;
mod error;
mod ids;
mod kind;
mod risk;
mod status;

pub use approval::{Approval, ApprovalDecision, Resolution};
pub use error::{ApprovalDomainError, ParseApprovalStatusError, ParseApprovalTypeError};
pub use ids::ApprovalId;
pub use kind::ApprovalType;
pub use risk::{MAX_RISK_SCORE, RiskAssessment, assess_risk};
pub use status::{ApprovalStatus, ApprovalTransitionError};
