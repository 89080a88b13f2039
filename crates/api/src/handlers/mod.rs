//! Request handlers.
//!
//! Each submodule provides async handler functions for one resource.
//! Handlers apply the rules from `campus_core`, persist through the
//! repositories in `campus_db`, and map errors via [`AppError`](crate::error::AppError).

pub mod applications;
pub mod auth;
pub mod events;
pub mod interests;
pub mod notification;
pub mod oauth;
pub mod universities;
