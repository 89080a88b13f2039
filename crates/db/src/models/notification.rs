//! Notification entity model.
//!
//! Inserts take a [`campus_core::notification::NotificationDraft`] directly.

use campus_core::notification::NotificationKind;
use campus_core::roles::Role;
use campus_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `notifications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub recipient_id: DbId,
    #[sqlx(try_from = "String")]
    pub recipient_kind: Role,
    #[sqlx(try_from = "String")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
    pub event_id: Option<DbId>,
    pub application_id: Option<DbId>,
    pub actor_id: Option<DbId>,
    pub created_at: Timestamp,
}
