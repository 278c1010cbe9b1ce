//! Unit tests for runs and tasks.

mod service_tests;
mod transition_tests;
