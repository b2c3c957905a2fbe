//! Administrative reporting and account moderation.
//!
//! The admin context owns no storage of its own; it reads and moderates
//! through the user, task and login audit ports.

pub mod domain;
pub mod services;

#[cfg(test)]
mod tests;
