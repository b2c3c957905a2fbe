//! Best-effort recording of authentication attempts.

use crate::login_audit::{
    domain::{LoginAttempt, NewLoginAttempt},
    ports::LoginAttemptRepository,
};
use mockable::Clock;
use std::sync::Arc;
use tracing::{debug, warn};

/// Records login attempts without letting audit failures reach the caller.
#[derive(Clone)]
pub struct LoginAuditor<R, C>
where
    R: LoginAttemptRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> LoginAuditor<R, C>
where
    R: LoginAttemptRepository,
    C: Clock + Send + Sync,
{
    /// Creates an auditor over `repository`.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Appends `attempt` to the audit trail.
    ///
    /// Returns the stored record, or `None` when it could not be built or
    /// persisted. Failures are logged and otherwise ignored.
    pub async fn record_best_effort(&self, attempt: NewLoginAttempt) -> Option<LoginAttempt> {
        let success = attempt.success;
        let method = attempt.method;
        let record = match LoginAttempt::record(attempt, self.clock.utc()) {
            Ok(record) => record,
            Err(err) => {
                warn!(error = %err, %method, "login attempt not recorded");
                return None;
            }
        };
        if let Err(err) = self.repository.record(&record).await {
            warn!(
                error = %err,
                attempt_id = %record.id(),
                %method,
                "failed to persist login attempt"
            );
            return None;
        }
        debug!(attempt_id = %record.id(), %method, success, "login attempt recorded");
        Some(record)
    }
}
