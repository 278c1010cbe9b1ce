//! Application services for the approval workflow.

mod workflow;

pub use workflow::{
    ApprovalRequest, ApprovalWorkflowError, ApprovalWorkflowResult, ApprovalWorkflowService,
};
