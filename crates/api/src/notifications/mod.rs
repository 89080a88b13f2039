//! Notification fan-out: persistence plus live delivery.

mod dispatcher;

pub use dispatcher::NotificationDispatcher;
