//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod account_repo;
pub mod application_repo;
pub mod event_repo;
pub mod interest_repo;
pub mod notification_repo;

pub use account_repo::AccountRepo;
pub use application_repo::ApplicationRepo;
pub use event_repo::EventRepo;
pub use interest_repo::InterestRepo;
pub use notification_repo::NotificationRepo;
