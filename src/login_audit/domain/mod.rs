//! Domain model for the append-only login audit trail.

mod attempt;
mod error;

pub use attempt::{
    ClientInfo, LoginAttempt, LoginAttemptId, LoginAttemptQuery, LoginMethod, LoginStats,
    NewLoginAttempt,
};
pub use error::LoginAuditDomainError;
