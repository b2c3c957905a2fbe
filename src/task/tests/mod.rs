//! Unit tests for task lifecycle and time tracking.

mod timer_tests;
