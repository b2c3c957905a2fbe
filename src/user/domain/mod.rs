//! Domain model for user accounts and credentials.

mod credentials;
mod error;
mod ids;
mod role;
mod user;

pub use credentials::{EmailAddress, GoogleSubject, PasswordDigest, PlainPassword, Username};
pub use error::{ParseAuthProviderError, ParseRoleError, UserDomainError};
pub use ids::UserId;
pub use role::{AuthProvider, Role};
pub use user::{LocalRegistration, PersistedUserData, User, VerifiedIdentity};
