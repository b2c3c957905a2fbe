//! Append-only audit trail of authentication attempts.
//!
//! Every sign-in, Google sign-up and Google sign-in is recorded with its
//! outcome and request origin. Recording never fails the authentication
//! flow that triggered it.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
