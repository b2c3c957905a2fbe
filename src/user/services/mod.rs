//! Application services for accounts and authentication.

mod auth;

pub use auth::{AdminBootstrap, AuthError, AuthResult, AuthService, AuthSession, SignUpRequest};
