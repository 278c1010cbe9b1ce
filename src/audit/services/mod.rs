//! Application services for recording and reading the audit trail.

mod log;
mod timeline;

pub use log::{EventListener, EventLog};
pub use timeline::{
    Timeline, TimelineEntry, TimelineError, TimelineQuery, TimelineResult, TimelineService,
};
