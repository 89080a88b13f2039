//! Application entity model and DTOs.

use campus_core::application::ApplicationStatus;
use campus_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `applications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Application {
    pub id: DbId,
    pub student_id: DbId,
    pub event_id: DbId,
    #[sqlx(try_from = "String")]
    pub status: ApplicationStatus,
    pub message: Option<String>,
    pub decided_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An application joined with the applying student's public details, as
/// listed to the event owner.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ApplicationWithStudent {
    pub id: DbId,
    pub event_id: DbId,
    pub student_id: DbId,
    pub student_name: String,
    pub student_email: String,
    #[sqlx(try_from = "String")]
    pub status: ApplicationStatus,
    pub message: Option<String>,
    pub decided_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// DTO for submitting an application.
#[derive(Debug, Clone)]
pub struct CreateApplication {
    pub student_id: DbId,
    pub event_id: DbId,
    pub message: Option<String>,
}
