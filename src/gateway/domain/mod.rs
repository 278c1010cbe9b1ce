//! Request and outcome types for gated tool calls.

mod call;
mod classify;

pub use call::{ToolCallOutcome, ToolCallRequest};
pub use classify::approval_subject;
