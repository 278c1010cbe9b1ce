//! Human approval gate for risky actions.
//!
//! An approval wraps one action the policy engine could not decide on its
//! own. It starts pending, carries a heuristic risk score computed when it is
//! created, and is resolved exactly once: approved, rejected, or expired.
//! Resolved approvals never change again.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
