//! Event entity model and DTOs.

use campus_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Event {
    pub id: DbId,
    pub university_id: DbId,
    pub title: String,
    pub description: String,
    pub event_date: Timestamp,
    pub location: String,
    pub media: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Event {
    pub fn summary(&self) -> campus_core::notification::EventSummary<'_> {
        campus_core::notification::EventSummary {
            id: self.id,
            title: &self.title,
            owner_id: self.university_id,
        }
    }
}

/// DTO for creating an event. `university_id` comes from the session, never
/// from the request body.
#[derive(Debug, Clone)]
pub struct CreateEvent {
    pub university_id: DbId,
    pub title: String,
    pub description: String,
    pub event_date: Timestamp,
    pub location: String,
    pub media: Vec<String>,
}

/// DTO for a partial event update. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateEvent {
    pub title: Option<String>,
    pub description: Option<String>,
    pub event_date: Option<Timestamp>,
    pub location: Option<String>,
    pub media: Option<Vec<String>>,
}
