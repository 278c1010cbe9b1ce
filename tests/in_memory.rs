//! In-memory integration tests for the wired core.
//!
//! Tests are organized into modules by functionality:
//! - `gateway_flow_tests`: Tool calls from policy decision to event log
//! - `timeline_tests`: Timeline pages built from a real run

mod test_helpers;

mod in_memory {
    pub mod helpers;

    mod gateway_flow_tests;
    mod timeline_tests;
}
