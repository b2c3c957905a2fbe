//! Account registration, sign-in and token authentication.

use crate::login_audit::{
    domain::{ClientInfo, LoginMethod, NewLoginAttempt},
    ports::LoginAttemptRepository,
    services::LoginAuditor,
};
use crate::user::{
    domain::{
        AuthProvider, EmailAddress, LocalRegistration, PlainPassword, User, UserDomainError,
        UserId, Username, VerifiedIdentity,
    },
    ports::{
        AccessToken, CredentialHashError, CredentialHasher, IdentityError, IdentityVerifier,
        TokenError, TokenIssuer, UserRepository, UserRepositoryError,
    },
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

const USER_NOT_FOUND: &str = "User not found";
const ACCOUNT_DEACTIVATED: &str = "Account deactivated";
const INVALID_PASSWORD: &str = "Invalid password";
const ACCOUNT_EXISTS: &str = "User already exists";
const ACCOUNT_NOT_FOUND: &str = "Account not found";
const USERNAME_SUFFIX_LEN: usize = 5;

/// Request payload for registering a password account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpRequest {
    username: String,
    email: String,
    password: String,
    name: Option<String>,
}

impl SignUpRequest {
    /// Creates a request with the required credentials.
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
            name: None,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Request payload for creating or promoting the administrator account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminBootstrap {
    /// Administrator email; an existing account with it is promoted.
    pub email: String,
    /// Administrator username.
    pub username: String,
    /// Administrator password.
    pub password: String,
    /// Display name.
    pub name: Option<String>,
}

/// A signed-in account and its bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    /// The account, with `last_login` refreshed.
    pub user: User,
    /// Token for subsequent requests.
    pub token: AccessToken,
}

/// Service-level errors for authentication flows.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Input validation failed.
    #[error(transparent)]
    Domain(#[from] UserDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] UserRepositoryError),
    /// Unknown identifier, wrong password or unusable token.
    #[error("invalid credentials")]
    InvalidCredentials,
    /// The account exists but is deactivated.
    #[error("account is deactivated, please contact support")]
    AccountDeactivated,
    /// The email or username belongs to another account.
    #[error("user with this {field} already exists")]
    AlreadyExists {
        /// Conflicting field name.
        field: &'static str,
    },
    /// Google sign-up for an identity that already has an account.
    #[error("user already exists, please sign in instead")]
    GoogleAccountExists,
    /// Google sign-in for an identity without an account.
    #[error("account not found, please sign up first")]
    GoogleAccountNotFound,
    /// The account does not exist.
    #[error("user not found: {0}")]
    NotFound(UserId),
    /// Token issuing or verification failed.
    #[error(transparent)]
    Token(#[from] TokenError),
    /// Password hashing failed.
    #[error(transparent)]
    Hash(#[from] CredentialHashError),
    /// The identity token was rejected.
    #[error(transparent)]
    Identity(#[from] IdentityError),
}

/// Result type for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Authentication orchestration service.
///
/// Every sign-in attempt is recorded through the [`LoginAuditor`]; audit
/// failures never change the outcome of the attempt.
#[derive(Clone)]
pub struct AuthService<U, L, H, T, V, C>
where
    U: UserRepository,
    L: LoginAttemptRepository,
    H: CredentialHasher,
    T: TokenIssuer,
    V: IdentityVerifier,
    C: Clock + Send + Sync,
{
    users: Arc<U>,
    auditor: LoginAuditor<L, C>,
    hasher: Arc<H>,
    tokens: Arc<T>,
    identities: Arc<V>,
    clock: Arc<C>,
}

impl<U, L, H, T, V, C> AuthService<U, L, H, T, V, C>
where
    U: UserRepository,
    L: LoginAttemptRepository,
    H: CredentialHasher,
    T: TokenIssuer,
    V: IdentityVerifier,
    C: Clock + Send + Sync,
{
    /// Creates a new authentication service.
    #[must_use]
    pub const fn new(
        users: Arc<U>,
        auditor: LoginAuditor<L, C>,
        hasher: Arc<H>,
        tokens: Arc<T>,
        identities: Arc<V>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            users,
            auditor,
            hasher,
            tokens,
            identities,
            clock,
        }
    }

    /// Registers a password account and signs it in.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::AlreadyExists`] when the email or username is
    /// taken, or [`AuthError::Domain`] when a field is invalid.
    pub async fn sign_up(&self, request: SignUpRequest) -> AuthResult<AuthSession> {
        let now = self.clock.utc();
        let username = Username::new(&request.username)?;
        let email = EmailAddress::new(&request.email)?;
        let password = PlainPassword::new(request.password)?;

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AuthError::AlreadyExists { field: "email" });
        }
        if self.users.find_by_username(&username).await?.is_some() {
            return Err(AuthError::AlreadyExists { field: "username" });
        }

        let registration = LocalRegistration {
            username,
            email,
            password: self.hasher.hash(&password)?,
            name: request.name.filter(|name| !name.trim().is_empty()),
        };
        let mut user = User::register_local(registration, now);
        user.record_login(now);
        self.users.store(&user).await.map_err(conflict)?;

        let token = self.tokens.issue(user.id(), now)?;
        info!(user_id = %user.id(), "account registered");
        Ok(AuthSession { user, token })
    }

    /// Signs in with an email or username and password.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown identifier or
    /// a wrong password and [`AuthError::AccountDeactivated`] for a disabled
    /// account.
    pub async fn login(
        &self,
        identifier: &str,
        password: &str,
        client: ClientInfo,
    ) -> AuthResult<AuthSession> {
        let now = self.clock.utc();
        let Some(mut user) = self.users.find_by_identifier(identifier).await? else {
            warn!(reason = USER_NOT_FOUND, "login rejected");
            self.audit_failure(identifier, None, USER_NOT_FOUND, LoginMethod::Email, client)
                .await;
            return Err(AuthError::InvalidCredentials);
        };

        if !user.is_active() {
            warn!(user_id = %user.id(), reason = ACCOUNT_DEACTIVATED, "login rejected");
            self.audit_failure(
                user.email().as_str(),
                Some(user.id()),
                ACCOUNT_DEACTIVATED,
                LoginMethod::Email,
                client,
            )
            .await;
            return Err(AuthError::AccountDeactivated);
        }

        let candidate = PlainPassword::candidate(password);
        let verified = match user.password() {
            Some(digest) => self.hasher.verify(digest, &candidate)?,
            None => false,
        };
        if !verified {
            warn!(user_id = %user.id(), reason = INVALID_PASSWORD, "login rejected");
            self.audit_failure(
                user.email().as_str(),
                Some(user.id()),
                INVALID_PASSWORD,
                LoginMethod::Email,
                client,
            )
            .await;
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.issue(user.id(), now)?;
        user.record_login(now);
        self.users.update(&user).await?;
        self.auditor
            .record_best_effort(NewLoginAttempt::succeeded(
                user.email().as_str(),
                user.id(),
                LoginMethod::Email,
                client,
            ))
            .await;
        info!(user_id = %user.id(), "login succeeded");
        Ok(AuthSession { user, token })
    }

    /// Creates an account from a verified Google identity.
    ///
    /// The username is derived from the display name plus a random suffix.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Identity`] for a rejected token and
    /// [`AuthError::GoogleAccountExists`] when the subject or email already
    /// has an account.
    pub async fn google_sign_up(
        &self,
        id_token: &str,
        client: ClientInfo,
    ) -> AuthResult<AuthSession> {
        let identity = self.identities.verify(id_token).await?;
        let now = self.clock.utc();

        let existing = match self.users.find_by_google_subject(&identity.subject).await? {
            Some(user) => Some(user),
            None => self.users.find_by_email(&identity.email).await?,
        };
        if let Some(user) = existing {
            warn!(user_id = %user.id(), "google sign-up for existing account");
            self.audit_failure(
                identity.email.as_str(),
                Some(user.id()),
                ACCOUNT_EXISTS,
                LoginMethod::GoogleSignup,
                client,
            )
            .await;
            return Err(AuthError::GoogleAccountExists);
        }

        let username = Username::derive(identity.display_name(), &username_suffix())?;
        let user = User::register_google(identity, username, now);
        self.users.store(&user).await.map_err(conflict)?;

        let token = self.tokens.issue(user.id(), now)?;
        self.auditor
            .record_best_effort(NewLoginAttempt::succeeded(
                user.email().as_str(),
                user.id(),
                LoginMethod::GoogleSignup,
                client,
            ))
            .await;
        info!(user_id = %user.id(), "google account registered");
        Ok(AuthSession { user, token })
    }

    /// Signs in an existing account with a verified Google identity.
    ///
    /// Accounts are matched by Google subject first, then by email among
    /// Google accounts.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::GoogleAccountNotFound`] when no account matches
    /// and [`AuthError::AccountDeactivated`] for a disabled account.
    pub async fn google_sign_in(
        &self,
        id_token: &str,
        client: ClientInfo,
    ) -> AuthResult<AuthSession> {
        let identity = self.identities.verify(id_token).await?;
        let now = self.clock.utc();

        let Some(mut user) = self.find_google_account(&identity).await? else {
            warn!(reason = ACCOUNT_NOT_FOUND, "google sign-in rejected");
            self.audit_failure(
                identity.email.as_str(),
                None,
                ACCOUNT_NOT_FOUND,
                LoginMethod::GoogleSignin,
                client,
            )
            .await;
            return Err(AuthError::GoogleAccountNotFound);
        };
        if !user.is_active() {
            warn!(user_id = %user.id(), reason = ACCOUNT_DEACTIVATED, "google sign-in rejected");
            self.audit_failure(
                user.email().as_str(),
                Some(user.id()),
                ACCOUNT_DEACTIVATED,
                LoginMethod::GoogleSignin,
                client,
            )
            .await;
            return Err(AuthError::AccountDeactivated);
        }

        let token = self.tokens.issue(user.id(), now)?;
        user.record_google_login(identity.picture, now);
        self.users.update(&user).await?;
        self.auditor
            .record_best_effort(NewLoginAttempt::succeeded(
                user.email().as_str(),
                user.id(),
                LoginMethod::GoogleSignin,
                client,
            ))
            .await;
        info!(user_id = %user.id(), "google sign-in succeeded");
        Ok(AuthSession { user, token })
    }

    /// Returns the account of `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotFound`] when the account does not exist.
    pub async fn profile(&self, user_id: UserId) -> AuthResult<User> {
        debug!(%user_id, "loading profile");
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::NotFound(user_id))
    }

    /// Replaces the username and email of `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::AlreadyExists`] when another account uses the
    /// email or username.
    pub async fn update_profile(
        &self,
        user_id: UserId,
        username: &str,
        email: &str,
    ) -> AuthResult<User> {
        let now = self.clock.utc();
        let new_username = Username::new(username)?;
        let new_email = EmailAddress::new(email)?;
        let mut user = self.profile(user_id).await?;

        let taken_by_other = |found: Option<User>| found.is_some_and(|other| other.id() != user_id);
        if taken_by_other(self.users.find_by_email(&new_email).await?) {
            return Err(AuthError::AlreadyExists { field: "email" });
        }
        if taken_by_other(self.users.find_by_username(&new_username).await?) {
            return Err(AuthError::AlreadyExists { field: "username" });
        }

        user.update_profile(new_username, new_email, now);
        self.users.update(&user).await.map_err(conflict)?;
        info!(%user_id, "profile updated");
        Ok(user)
    }

    /// Resolves a bearer token to its active account.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Token`] for an invalid or expired token,
    /// [`AuthError::InvalidCredentials`] when the account no longer exists
    /// and [`AuthError::AccountDeactivated`] for a disabled account.
    pub async fn authenticate(&self, token: &str) -> AuthResult<User> {
        let user_id = self.tokens.verify(token, self.clock.utc())?;
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        if !user.is_active() {
            return Err(AuthError::AccountDeactivated);
        }
        Ok(user)
    }

    /// Creates the administrator account, or promotes the account that
    /// already owns the email.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Domain`] for invalid input and
    /// [`AuthError::AlreadyExists`] when the username belongs to another
    /// account.
    pub async fn bootstrap_admin(&self, request: AdminBootstrap) -> AuthResult<User> {
        let now = self.clock.utc();
        let username = Username::new(&request.username)?;
        let email = EmailAddress::new(&request.email)?;
        let digest = self.hasher.hash(&PlainPassword::new(request.password)?)?;
        let name = request.name.filter(|value| !value.trim().is_empty());

        if let Some(mut existing) = self.users.find_by_email(&email).await? {
            existing.promote_to_admin(username, digest, name, now);
            self.users.update(&existing).await.map_err(conflict)?;
            info!(user_id = %existing.id(), "administrator promoted");
            return Ok(existing);
        }

        let registration = LocalRegistration {
            username,
            email,
            password: digest,
            name,
        };
        let admin = User::register_local(registration, now).into_admin();
        self.users.store(&admin).await.map_err(conflict)?;
        info!(user_id = %admin.id(), "administrator created");
        Ok(admin)
    }

    async fn find_google_account(
        &self,
        identity: &VerifiedIdentity,
    ) -> AuthResult<Option<User>> {
        if let Some(user) = self.users.find_by_google_subject(&identity.subject).await? {
            return Ok(Some(user));
        }
        let by_email = self.users.find_by_email(&identity.email).await?;
        Ok(by_email.filter(|user| user.provider() == AuthProvider::Google))
    }

    async fn audit_failure(
        &self,
        email: &str,
        user_id: Option<UserId>,
        reason: &str,
        method: LoginMethod,
        client: ClientInfo,
    ) {
        self.auditor
            .record_best_effort(NewLoginAttempt::failed(email, user_id, reason, method, client))
            .await;
    }
}

fn conflict(err: UserRepositoryError) -> AuthError {
    match err {
        UserRepositoryError::DuplicateEmail(_) => AuthError::AlreadyExists { field: "email" },
        UserRepositoryError::DuplicateUsername(_) => AuthError::AlreadyExists { field: "username" },
        UserRepositoryError::DuplicateGoogleSubject(_) => AuthError::GoogleAccountExists,
        other => AuthError::Repository(other),
    }
}

fn username_suffix() -> String {
    Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(USERNAME_SUFFIX_LEN)
        .collect()
}
