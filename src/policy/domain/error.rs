//! Error types for policy domain parsing.

use thiserror::Error;

/// Error returned while strictly parsing a persisted permission mode.
///
/// Configuration input goes through [`super::PolicyMode::parse`] instead,
/// which falls back to the default mode rather than failing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown permission mode: {0}")]
pub struct ParsePolicyModeError(pub String);

/// Error returned while parsing a persisted policy decision.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown policy decision: {0}")]
pub struct ParsePolicyDecisionError(pub String);
