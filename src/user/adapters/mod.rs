//! Adapter implementations for account and credential ports.

pub mod google;
pub mod hashing;
pub mod jwt;
pub mod memory;
pub mod postgres;

pub use google::GoogleIdentityVerifier;
pub use hashing::Argon2Hasher;
pub use jwt::JwtTokenIssuer;
