//! Domain model for audit events.

mod event;
mod event_type;
mod ids;

pub use event::{Event, EventData, NewEvent, event_data};
pub use event_type::{EventType, ParseEventTypeError};
pub use ids::EventId;
