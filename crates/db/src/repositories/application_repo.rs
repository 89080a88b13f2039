//! Repository for the `applications` table.

use campus_core::application::ApplicationStatus;
use campus_core::types::DbId;
use sqlx::PgPool;

use crate::models::application::{Application, ApplicationWithStudent, CreateApplication};

/// Column list for `applications` queries.
const COLUMNS: &str =
    "id, student_id, event_id, status, message, decided_at, created_at, updated_at";

/// Provides CRUD operations for applications.
pub struct ApplicationRepo;

impl ApplicationRepo {
    /// Insert a pending application.
    ///
    /// A second application for the same (student, event) pair fails with a
    /// unique violation on `uq_applications_student_event`; no row is created.
    pub async fn create(
        pool: &PgPool,
        input: &CreateApplication,
    ) -> Result<Application, sqlx::Error> {
        let query = format!(
            "INSERT INTO applications (student_id, event_id, message)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Application>(&query)
            .bind(input.student_id)
            .bind(input.event_id)
            .bind(&input.message)
            .fetch_one(pool)
            .await
    }

    /// Find an application by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Application>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM applications WHERE id = $1");
        sqlx::query_as::<_, Application>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a student's applications, newest first.
    pub async fn list_for_student(
        pool: &PgPool,
        student_id: DbId,
    ) -> Result<Vec<Application>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM applications
             WHERE student_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Application>(&query)
            .bind(student_id)
            .fetch_all(pool)
            .await
    }

    /// List the applications for an event with the applicants' details.
    pub async fn list_for_event(
        pool: &PgPool,
        event_id: DbId,
    ) -> Result<Vec<ApplicationWithStudent>, sqlx::Error> {
        sqlx::query_as::<_, ApplicationWithStudent>(
            "SELECT a.id, a.event_id, a.student_id, s.name AS student_name,
                    s.email AS student_email, a.status, a.message, a.decided_at, a.created_at
             FROM applications a
             JOIN accounts s ON s.id = a.student_id
             WHERE a.event_id = $1
             ORDER BY a.created_at ASC, a.id ASC",
        )
        .bind(event_id)
        .fetch_all(pool)
        .await
    }

    /// Move a pending application to `status`.
    ///
    /// The `status = 'pending'` guard makes the transition atomic: of two
    /// concurrent decisions only one updates a row. Returns `None` when the
    /// application does not exist or has already been decided.
    pub async fn decide(
        pool: &PgPool,
        id: DbId,
        status: ApplicationStatus,
    ) -> Result<Option<Application>, sqlx::Error> {
        let query = format!(
            "UPDATE applications SET
                status = $2,
                decided_at = NOW()
             WHERE id = $1 AND status = 'pending'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Application>(&query)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Count applications for an event (used by tests and listings).
    pub async fn count_for_event(pool: &PgPool, event_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM applications WHERE event_id = $1")
            .bind(event_id)
            .fetch_one(pool)
            .await
    }
}
