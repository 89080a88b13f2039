//! Domain types and pure business rules shared by the database and API crates.
//!
//! Nothing in this crate performs I/O. Everything that decides *whether* an
//! operation is allowed (role checks, status transitions, field validation)
//! or *what* a notification says lives here so it can be tested in isolation.

pub mod application;
pub mod error;
pub mod event;
pub mod ids;
pub mod notification;
pub mod pagination;
pub mod profile;
pub mod roles;
pub mod types;
