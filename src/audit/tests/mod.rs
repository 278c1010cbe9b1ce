//! Unit tests for the audit event log.
