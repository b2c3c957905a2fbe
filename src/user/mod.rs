//! Accounts, credentials and authentication.
//!
//! Accounts sign up with a password or a Google identity. Passwords are
//! hashed with Argon2, sessions are HS256 bearer tokens, and Google ID
//! tokens are verified against a configured JWK set.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
