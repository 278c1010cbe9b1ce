//! Tool permission policy for Parapet.
//!
//! Every tool invocation an agent attempts is evaluated here before it is
//! allowed anywhere near the filesystem or shell. Evaluation is a pure
//! function of the configured mode and the parsed allow/deny rules:
//!
//! 1. a matching deny rule always wins,
//! 2. otherwise a matching allow rule wins,
//! 3. otherwise the mode default for the tool applies.
//!
//! The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - The evaluation service in [`services`]

pub mod domain;
pub mod services;

#[cfg(test)]
mod tests;
