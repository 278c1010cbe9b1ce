//! Composition point between an agent's tool calls and the real tools.
//!
//! Every call is recorded, checked against the policy engine and then
//! executed, refused, or parked behind an approval. Mutating calls are
//! snapshotted before they run so they can be rolled back.

pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
