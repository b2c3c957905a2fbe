//! Login attempt records and their aggregate statistics.

use super::LoginAuditDomainError;
use crate::rates::percentage;
use crate::user::domain::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a login attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoginAttemptId(Uuid);

impl LoginAttemptId {
    /// Creates a new random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for LoginAttemptId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LoginAttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How the attempt authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoginMethod {
    /// Identifier and password.
    #[default]
    Email,
    /// Account creation through Google.
    GoogleSignup,
    /// Sign-in through Google.
    GoogleSignin,
}

impl LoginMethod {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::GoogleSignup => "google-signup",
            Self::GoogleSignin => "google-signin",
        }
    }
}

impl TryFrom<&str> for LoginMethod {
    type Error = LoginAuditDomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "email" => Ok(Self::Email),
            "google-signup" => Ok(Self::GoogleSignup),
            "google-signin" => Ok(Self::GoogleSignin),
            _ => Err(LoginAuditDomainError::UnknownLoginMethod(value.to_owned())),
        }
    }
}

impl fmt::Display for LoginMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Network origin of a request. Blank values are stored as `unknown`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientInfo {
    /// Remote address.
    pub ip_address: String,
    /// `User-Agent` header.
    pub user_agent: String,
}

impl ClientInfo {
    const UNKNOWN: &'static str = "unknown";

    /// Creates client details, substituting `unknown` for blanks.
    #[must_use]
    pub fn new(ip_address: impl Into<String>, user_agent: impl Into<String>) -> Self {
        let or_unknown = |value: String| {
            if value.trim().is_empty() {
                Self::UNKNOWN.to_owned()
            } else {
                value
            }
        };
        Self {
            ip_address: or_unknown(ip_address.into()),
            user_agent: or_unknown(user_agent.into()),
        }
    }

    /// Client details for requests whose origin is not known.
    #[must_use]
    pub fn unknown() -> Self {
        Self::new(Self::UNKNOWN, Self::UNKNOWN)
    }
}

/// Parameter object for recording an attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLoginAttempt {
    /// Identifier the caller tried, or the account email once resolved.
    pub email: String,
    /// Whether authentication succeeded.
    pub success: bool,
    /// Request origin.
    pub client: ClientInfo,
    /// Authentication method.
    pub method: LoginMethod,
    /// Resolved account, when known.
    pub user_id: Option<UserId>,
    /// Reason for failure.
    pub failure_reason: Option<String>,
}

impl NewLoginAttempt {
    /// Describes a successful attempt.
    #[must_use]
    pub fn succeeded(
        email: impl Into<String>,
        user_id: UserId,
        method: LoginMethod,
        client: ClientInfo,
    ) -> Self {
        Self {
            email: email.into(),
            success: true,
            client,
            method,
            user_id: Some(user_id),
            failure_reason: None,
        }
    }

    /// Describes a failed attempt.
    #[must_use]
    pub fn failed(
        email: impl Into<String>,
        user_id: Option<UserId>,
        reason: impl Into<String>,
        method: LoginMethod,
        client: ClientInfo,
    ) -> Self {
        Self {
            email: email.into(),
            success: false,
            client,
            method,
            user_id,
            failure_reason: Some(reason.into()),
        }
    }
}

/// Immutable record of one authentication attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginAttempt {
    id: LoginAttemptId,
    email: String,
    success: bool,
    client: ClientInfo,
    method: LoginMethod,
    user_id: Option<UserId>,
    failure_reason: Option<String>,
    created_at: DateTime<Utc>,
}

impl LoginAttempt {
    /// Records an attempt made at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`LoginAuditDomainError::EmptyEmail`] when the identifier is
    /// blank.
    pub fn record(
        attempt: NewLoginAttempt,
        now: DateTime<Utc>,
    ) -> Result<Self, LoginAuditDomainError> {
        Self::restore(LoginAttemptId::new(), attempt, now)
    }

    /// Reconstructs a stored attempt.
    ///
    /// # Errors
    ///
    /// Returns [`LoginAuditDomainError::EmptyEmail`] when the identifier is
    /// blank.
    pub fn restore(
        id: LoginAttemptId,
        attempt: NewLoginAttempt,
        created_at: DateTime<Utc>,
    ) -> Result<Self, LoginAuditDomainError> {
        let email = attempt.email.trim();
        if email.is_empty() {
            return Err(LoginAuditDomainError::EmptyEmail);
        }
        Ok(Self {
            id,
            email: email.to_owned(),
            success: attempt.success,
            client: attempt.client,
            method: attempt.method,
            user_id: attempt.user_id,
            failure_reason: attempt.failure_reason,
            created_at,
        })
    }

    /// Returns the attempt identifier.
    #[must_use]
    pub const fn id(&self) -> LoginAttemptId {
        self.id
    }

    /// Returns the attempted identifier.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns `true` for successful attempts.
    #[must_use]
    pub const fn success(&self) -> bool {
        self.success
    }

    /// Returns the request origin.
    #[must_use]
    pub const fn client(&self) -> &ClientInfo {
        &self.client
    }

    /// Returns the authentication method.
    #[must_use]
    pub const fn method(&self) -> LoginMethod {
        self.method
    }

    /// Returns the resolved account.
    #[must_use]
    pub const fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    /// Returns the failure reason.
    #[must_use]
    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    /// Returns when the attempt happened.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Filters for login attempt listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginAttemptQuery {
    /// Only successful or only failed attempts.
    pub success: Option<bool>,
    /// Case-insensitive substring of the attempted identifier.
    pub email: Option<String>,
    /// Only attempts at or after this instant.
    pub since: Option<DateTime<Utc>>,
    /// Only attempts resolved to this account.
    pub user: Option<UserId>,
}

impl LoginAttemptQuery {
    /// Creates an unfiltered query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to one account.
    #[must_use]
    pub const fn for_user(mut self, user: UserId) -> Self {
        self.user = Some(user);
        self
    }

    /// Returns `true` when `attempt` passes every filter.
    #[must_use]
    pub fn matches(&self, attempt: &LoginAttempt) -> bool {
        self.success.is_none_or(|success| attempt.success() == success)
            && self.email.as_deref().is_none_or(|needle| {
                attempt
                    .email()
                    .to_lowercase()
                    .contains(&needle.to_lowercase())
            })
            && self.since.is_none_or(|since| attempt.created_at() >= since)
            && self.user.is_none_or(|user| attempt.user_id() == Some(user))
    }
}

/// Aggregate login figures over a window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LoginStats {
    /// All attempts.
    pub total_attempts: u64,
    /// Successful attempts.
    pub successful: u64,
    /// Failed attempts.
    pub failed: u64,
    /// Distinct identifiers tried.
    pub unique_emails: u64,
    /// Successful share in percent, zero without attempts.
    pub success_rate: f64,
}

impl LoginStats {
    /// Builds statistics from raw counts.
    #[must_use]
    pub fn from_counts(total_attempts: u64, successful: u64, unique_emails: u64) -> Self {
        Self {
            total_attempts,
            successful,
            failed: total_attempts.saturating_sub(successful),
            unique_emails,
            success_rate: percentage(successful, total_attempts),
        }
    }
}
