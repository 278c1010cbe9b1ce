//! Unit tests for the approval workflow.
