//! Port contracts for the tool gateway.

mod invoker;

#[cfg(test)]
pub use invoker::MockToolInvoker;
pub use invoker::{ToolInvocationError, ToolInvoker};
