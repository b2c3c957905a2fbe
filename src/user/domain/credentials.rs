//! Validated account identifiers and secrets.

use super::UserDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Login name of 3 to 20 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct Username(String);

impl TryFrom<String> for Username {
    type Error = UserDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl Username {
    /// Minimum username length in characters.
    pub const MIN_LEN: usize = 3;
    /// Maximum username length in characters.
    pub const MAX_LEN: usize = 20;

    /// Creates a validated username from trimmed input.
    ///
    /// # Errors
    ///
    /// Returns [`UserDomainError::InvalidUsername`] when the trimmed value is
    /// shorter than [`Self::MIN_LEN`] or longer than [`Self::MAX_LEN`].
    pub fn new(value: impl AsRef<str>) -> Result<Self, UserDomainError> {
        let trimmed = value.as_ref().trim();
        let length = trimmed.chars().count();
        if !(Self::MIN_LEN..=Self::MAX_LEN).contains(&length) {
            return Err(UserDomainError::InvalidUsername {
                min: Self::MIN_LEN,
                max: Self::MAX_LEN,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Derives a username from a display name plus a random suffix.
    ///
    /// Whitespace is removed and the name lowercased; the base is cut so that
    /// the result never exceeds [`Self::MAX_LEN`].
    ///
    /// # Errors
    ///
    /// Returns [`UserDomainError::InvalidUsername`] when the suffix alone
    /// cannot form a valid username.
    pub fn derive(display_name: &str, suffix: &str) -> Result<Self, UserDomainError> {
        let room = Self::MAX_LEN.saturating_sub(suffix.chars().count());
        let base: String = display_name
            .chars()
            .filter(|ch| !ch.is_whitespace())
            .flat_map(char::to_lowercase)
            .take(room)
            .collect();
        Self::new(format!("{base}{suffix}"))
    }

    /// Returns the username as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalised email address.
///
/// Input is trimmed and lowercased, so equality is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct EmailAddress(String);

impl TryFrom<String> for EmailAddress {
    type Error = UserDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl EmailAddress {
    /// Creates a validated email address.
    ///
    /// # Errors
    ///
    /// Returns [`UserDomainError::InvalidEmail`] when the value does not look
    /// like `local@domain.tld`.
    pub fn new(value: impl AsRef<str>) -> Result<Self, UserDomainError> {
        let normalized = value.as_ref().trim().to_lowercase();
        if !is_email_shaped(&normalized) {
            return Err(UserDomainError::InvalidEmail(value.as_ref().to_owned()));
        }
        Ok(Self(normalized))
    }

    /// Returns the part before `@`.
    #[must_use]
    pub fn local_part(&self) -> &str {
        self.0.split('@').next().unwrap_or_default()
    }

    /// Returns the address as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_email_shaped(candidate: &str) -> bool {
    let Some((local, domain)) = candidate.split_once('@') else {
        return false;
    };
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    let word = |part: &str| {
        !part.is_empty()
            && part
                .chars()
                .all(|ch| ch.is_alphanumeric() || matches!(ch, '_' | '.' | '-' | '+'))
    };
    word(local)
        && word(host)
        && !host.starts_with('.')
        && (2..=6).contains(&tld.chars().count())
        && tld.chars().all(char::is_alphabetic)
}

/// Cleartext password as supplied by a user.
///
/// The value never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct PlainPassword(String);

impl PlainPassword {
    /// Minimum password length in characters.
    pub const MIN_LEN: usize = 6;

    /// Creates a password, enforcing the minimum length.
    ///
    /// # Errors
    ///
    /// Returns [`UserDomainError::PasswordTooShort`] for short passwords.
    pub fn new(value: impl Into<String>) -> Result<Self, UserDomainError> {
        let password = value.into();
        if password.chars().count() < Self::MIN_LEN {
            return Err(UserDomainError::PasswordTooShort { min: Self::MIN_LEN });
        }
        Ok(Self(password))
    }

    /// Wraps a login candidate without length checks.
    ///
    /// Login compares against the stored digest, so a short candidate simply
    /// fails verification.
    #[must_use]
    pub fn candidate(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the cleartext bytes.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PlainPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PlainPassword(..)")
    }
}

/// Encoded password hash in PHC string format.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    /// Wraps an encoded hash produced by a credential hasher or storage.
    #[must_use]
    pub fn from_encoded(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Returns the encoded hash.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordDigest(..)")
    }
}

/// Stable subject identifier issued by Google or Firebase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct GoogleSubject(String);

impl TryFrom<String> for GoogleSubject {
    type Error = UserDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl GoogleSubject {
    /// Creates a subject identifier.
    ///
    /// # Errors
    ///
    /// Returns [`UserDomainError::EmptyGoogleSubject`] for blank input.
    pub fn new(value: impl AsRef<str>) -> Result<Self, UserDomainError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserDomainError::EmptyGoogleSubject);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the subject as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
