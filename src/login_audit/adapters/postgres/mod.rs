//! `PostgreSQL` adapters for the login audit trail.

mod models;
mod repository;
mod schema;

pub use repository::PostgresLoginAttemptRepository;
