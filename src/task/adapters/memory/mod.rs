//! In-memory adapters for task lifecycle tests and embedding.

mod task;

pub use task::InMemoryTaskRepository;
