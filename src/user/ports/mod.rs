//! Port contracts for accounts and authentication.

pub mod credentials;
pub mod repository;

pub use credentials::{
    AccessToken, CredentialHashError, CredentialHasher, IdentityError, IdentityVerifier,
    TokenError, TokenIssuer,
};
pub use repository::{
    UserCounts, UserQuery, UserRepository, UserRepositoryError, UserRepositoryResult,
};
