//! Application services for gated tool execution.

mod gateway;

pub use gateway::{GatewayError, GatewayResult, ToolGateway};
