//! Event identity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Log-global, strictly increasing event identity.
///
/// # Examples
///
/// ```
/// use parapet::audit::domain::EventId;
///
/// let id = EventId::FIRST;
/// assert_eq!(id.value(), 1);
/// assert_eq!(id.next().map(EventId::value), Some(2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(u64);

impl EventId {
    /// Identity of the first event appended to a log.
    pub const FIRST: Self = Self(1);

    /// Creates an event identity from a value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the underlying value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Returns the following identity, or `None` when the space is spent.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl From<u64> for EventId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
