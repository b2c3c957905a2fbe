//! User aggregate root.

use super::{
    AuthProvider, EmailAddress, GoogleSubject, PasswordDigest, Role, UserDomainError, UserId,
    Username,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Identity claims extracted from a verified Google or Firebase ID token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    /// Provider subject identifier.
    pub subject: GoogleSubject,
    /// Verified email address.
    pub email: EmailAddress,
    /// Display name, when the token carries one.
    pub name: Option<String>,
    /// Profile picture URL, when the token carries one.
    pub picture: Option<String>,
}

impl VerifiedIdentity {
    /// Returns the display name, falling back to the email's local part.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| self.email.local_part())
    }
}

/// Parameter object for registering a password account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalRegistration {
    /// Chosen username.
    pub username: Username,
    /// Account email.
    pub email: EmailAddress,
    /// Hashed password.
    pub password: PasswordDigest,
    /// Optional display name.
    pub name: Option<String>,
}

/// User account aggregate.
///
/// Local accounts always carry a username and password digest; Google
/// accounts always carry a subject identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    id: UserId,
    username: Option<Username>,
    email: EmailAddress,
    #[serde(skip)]
    password: Option<PasswordDigest>,
    google_subject: Option<GoogleSubject>,
    name: Option<String>,
    picture: Option<String>,
    provider: AuthProvider,
    role: Role,
    is_active: bool,
    last_login: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted user aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedUserData {
    /// Persisted identifier.
    pub id: UserId,
    /// Persisted username.
    pub username: Option<Username>,
    /// Persisted email.
    pub email: EmailAddress,
    /// Persisted password digest.
    pub password: Option<PasswordDigest>,
    /// Persisted Google subject.
    pub google_subject: Option<GoogleSubject>,
    /// Persisted display name.
    pub name: Option<String>,
    /// Persisted picture URL.
    pub picture: Option<String>,
    /// Persisted provider.
    pub provider: AuthProvider,
    /// Persisted role.
    pub role: Role,
    /// Persisted activation flag.
    pub is_active: bool,
    /// Persisted last login.
    pub last_login: Option<DateTime<Utc>>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Registers a password account at `now`.
    #[must_use]
    pub fn register_local(registration: LocalRegistration, now: DateTime<Utc>) -> Self {
        let LocalRegistration {
            username,
            email,
            password,
            name,
        } = registration;
        Self {
            id: UserId::new(),
            username: Some(username),
            email,
            password: Some(password),
            google_subject: None,
            name,
            picture: None,
            provider: AuthProvider::Local,
            role: Role::User,
            is_active: true,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Registers a Google account at `now`; the sign-up counts as a login.
    #[must_use]
    pub fn register_google(
        identity: VerifiedIdentity,
        username: Username,
        now: DateTime<Utc>,
    ) -> Self {
        let name = identity.display_name().to_owned();
        let VerifiedIdentity {
            subject,
            email,
            picture,
            ..
        } = identity;
        Self {
            id: UserId::new(),
            username: Some(username),
            email,
            password: None,
            google_subject: Some(subject),
            name: Some(name),
            picture,
            provider: AuthProvider::Google,
            role: Role::User,
            is_active: true,
            last_login: Some(now),
            created_at: now,
            updated_at: now,
        }
    }

    /// Reconstructs a user from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns [`UserDomainError::MissingCredentials`] when a local account
    /// lacks a username or digest, or a Google account lacks its subject.
    pub fn from_persisted(data: PersistedUserData) -> Result<Self, UserDomainError> {
        let missing = match data.provider {
            AuthProvider::Local if data.username.is_none() => Some("username"),
            AuthProvider::Local if data.password.is_none() => Some("password"),
            AuthProvider::Google if data.google_subject.is_none() => Some("google subject"),
            _ => None,
        };
        if let Some(credential) = missing {
            return Err(UserDomainError::MissingCredentials {
                provider: data.provider.as_str(),
                missing: credential,
            });
        }

        Ok(Self {
            id: data.id,
            username: data.username,
            email: data.email,
            password: data.password,
            google_subject: data.google_subject,
            name: data.name,
            picture: data.picture,
            provider: data.provider,
            role: data.role,
            is_active: data.is_active,
            last_login: data.last_login,
            created_at: data.created_at,
            updated_at: data.updated_at,
        })
    }

    /// Returns the user identifier.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Returns the username, if any.
    #[must_use]
    pub const fn username(&self) -> Option<&Username> {
        self.username.as_ref()
    }

    /// Returns the email address.
    #[must_use]
    pub const fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Returns the password digest of a local account.
    #[must_use]
    pub const fn password(&self) -> Option<&PasswordDigest> {
        self.password.as_ref()
    }

    /// Returns the Google subject of a Google account.
    #[must_use]
    pub const fn google_subject(&self) -> Option<&GoogleSubject> {
        self.google_subject.as_ref()
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the picture URL.
    #[must_use]
    pub fn picture(&self) -> Option<&str> {
        self.picture.as_deref()
    }

    /// Returns the authentication provider.
    #[must_use]
    pub const fn provider(&self) -> AuthProvider {
        self.provider
    }

    /// Returns the role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Returns `true` for administrators.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }

    /// Returns `true` while the account may sign in.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.is_active
    }

    /// Returns the most recent successful login.
    #[must_use]
    pub const fn last_login(&self) -> Option<DateTime<Utc>> {
        self.last_login
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest mutation timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Records a successful login at `now`.
    pub const fn record_login(&mut self, now: DateTime<Utc>) {
        self.last_login = Some(now);
        self.updated_at = now;
    }

    /// Records a Google sign-in, refreshing the picture when one is supplied.
    pub fn record_google_login(&mut self, picture: Option<String>, now: DateTime<Utc>) {
        if picture.is_some() {
            self.picture = picture;
        }
        self.record_login(now);
    }

    /// Activates or deactivates the account. Returns `true` on change.
    pub const fn set_active(&mut self, active: bool, now: DateTime<Utc>) -> bool {
        if self.is_active == active {
            return false;
        }
        self.is_active = active;
        self.updated_at = now;
        true
    }

    /// Replaces username and email.
    pub fn update_profile(&mut self, username: Username, email: EmailAddress, now: DateTime<Utc>) {
        self.username = Some(username);
        self.email = email;
        self.updated_at = now;
    }

    /// Grants the administrator role with a fresh local password.
    pub fn promote_to_admin(
        &mut self,
        username: Username,
        password: PasswordDigest,
        name: Option<String>,
        now: DateTime<Utc>,
    ) {
        self.username = Some(username);
        self.password = Some(password);
        if name.is_some() {
            self.name = name;
        }
        self.role = Role::Admin;
        self.is_active = true;
        self.updated_at = now;
    }

    /// Makes a fresh account an administrator.
    #[must_use]
    pub const fn into_admin(mut self) -> Self {
        self.role = Role::Admin;
        self
    }
}
