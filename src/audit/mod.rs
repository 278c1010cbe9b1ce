//! Append-only audit trail.
//!
//! Every decision the gateway takes and every lifecycle change is recorded as
//! an [`domain::Event`]. Event identities are assigned by the repository,
//! start at 1 and increase by one per append across all runs, so identity
//! order is the single source of ordering truth. Events are never updated or
//! deleted; the ports expose no operation that could do so.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
