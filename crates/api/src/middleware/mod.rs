//! Request extractors for authentication and role checks, plus the request
//! deadline middleware.

pub mod auth;
pub mod rbac;
pub mod timeout;
