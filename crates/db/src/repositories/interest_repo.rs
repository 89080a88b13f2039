//! Repository for the `student_interests` table (student -> followed universities).

use campus_core::types::DbId;
use sqlx::PgPool;

use crate::models::account::PublicProfile;

/// Provides membership operations on a student's interest set.
pub struct InterestRepo;

impl InterestRepo {
    /// Add a university to a student's interest set.
    ///
    /// Returns `true` if the membership was newly created, `false` if it
    /// already existed.
    pub async fn follow(
        pool: &PgPool,
        student_id: DbId,
        university_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO student_interests (student_id, university_id)
             VALUES ($1, $2)
             ON CONFLICT (student_id, university_id) DO NOTHING",
        )
        .bind(student_id)
        .bind(university_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove a university from a student's interest set.
    ///
    /// Returns `true` if a membership was removed.
    pub async fn unfollow(
        pool: &PgPool,
        student_id: DbId,
        university_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM student_interests WHERE student_id = $1 AND university_id = $2",
        )
        .bind(student_id)
        .bind(university_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// The universities a student follows.
    pub async fn list_for_student(
        pool: &PgPool,
        student_id: DbId,
    ) -> Result<Vec<PublicProfile>, sqlx::Error> {
        sqlx::query_as::<_, PublicProfile>(
            "SELECT u.id, u.name, u.bio, u.avatar_url, u.role
             FROM student_interests i
             JOIN accounts u ON u.id = i.university_id
             WHERE i.student_id = $1
             ORDER BY u.name ASC, u.id ASC",
        )
        .bind(student_id)
        .fetch_all(pool)
        .await
    }

    /// Ids of active students whose interest set contains `university_id`.
    pub async fn follower_ids(pool: &PgPool, university_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT i.student_id
             FROM student_interests i
             JOIN accounts s ON s.id = i.student_id
             WHERE i.university_id = $1 AND s.is_active = true AND s.role = 'student'
             ORDER BY i.student_id",
        )
        .bind(university_id)
        .fetch_all(pool)
        .await
    }
}
