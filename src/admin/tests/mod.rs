//! Unit tests for administrative reporting and moderation.
