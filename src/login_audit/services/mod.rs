//! Application services for the login audit trail.

mod auditor;

pub use auditor::LoginAuditor;
