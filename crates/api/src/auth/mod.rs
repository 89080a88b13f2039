//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- session token generation and validation.
//! - [`session`] -- session and OAuth-state cookies, token extraction.
//! - [`google`] -- Google OAuth 2.0 identity provider.

pub mod google;
pub mod jwt;
pub mod password;
pub mod session;
