//! In-memory adapters for user accounts.

mod repository;

pub use repository::InMemoryUserRepository;
