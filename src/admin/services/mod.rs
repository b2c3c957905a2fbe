//! Application services for administrators.

mod admin;

pub use admin::{AdminError, AdminResult, AdminService};
