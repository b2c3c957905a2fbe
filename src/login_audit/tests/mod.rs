//! Unit tests for the login audit trail.

mod auditor_tests;
