//! In-memory adapters for the login audit trail.

mod repository;

pub use repository::InMemoryLoginAttemptRepository;
