//! Argon2id password hashing.

use crate::user::{
    domain::{PasswordDigest, PlainPassword},
    ports::{CredentialHashError, CredentialHasher},
};
use argon2::{
    Argon2,
    password_hash::{
        self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

/// [`CredentialHasher`] backed by Argon2id with default parameters.
#[derive(Debug, Default, Clone)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl Argon2Hasher {
    /// Creates a hasher with the library's recommended parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, password: &PlainPassword) -> Result<PasswordDigest, CredentialHashError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.expose().as_bytes(), &salt)
            .map(|hash| PasswordDigest::from_encoded(hash.to_string()))
            .map_err(|err| CredentialHashError(err.to_string()))
    }

    fn verify(
        &self,
        digest: &PasswordDigest,
        candidate: &PlainPassword,
    ) -> Result<bool, CredentialHashError> {
        let parsed =
            PasswordHash::new(digest.as_str()).map_err(|err| CredentialHashError(err.to_string()))?;
        match self
            .argon2
            .verify_password(candidate.expose().as_bytes(), &parsed)
        {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(err) => Err(CredentialHashError(err.to_string())),
        }
    }
}
