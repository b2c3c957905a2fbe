//! Unit tests for accounts and authentication.
