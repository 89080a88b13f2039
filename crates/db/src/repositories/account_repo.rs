//! Repository for the `accounts` table.

use campus_core::roles::Role;
use campus_core::types::DbId;
use sqlx::PgPool;

use crate::models::account::{Account, CreateAccount, PublicProfile, UpdateProfile};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, email, password_hash, google_id, name, bio, avatar_url, role, \
                        is_active, last_login_at, created_at, updated_at";

/// Provides CRUD operations for accounts.
pub struct AccountRepo;

impl AccountRepo {
    /// Insert a new account, returning the created row.
    ///
    /// A duplicate email (in any letter case) violates `uq_accounts_email`.
    pub async fn create(pool: &PgPool, input: &CreateAccount) -> Result<Account, sqlx::Error> {
        let query = format!(
            "INSERT INTO accounts (email, password_hash, google_id, name, avatar_url, role)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Account>(&query)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.google_id)
            .bind(&input.name)
            .bind(&input.avatar_url)
            .bind(input.role.as_str())
            .fetch_one(pool)
            .await
    }

    /// Find an account by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Account>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM accounts WHERE id = $1");
        sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an account by email (case-insensitive).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Account>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM accounts WHERE LOWER(email) = LOWER($1)");
        sqlx::query_as::<_, Account>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Find an account by its Google subject id.
    pub async fn find_by_google_id(
        pool: &PgPool,
        google_id: &str,
    ) -> Result<Option<Account>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM accounts WHERE google_id = $1");
        sqlx::query_as::<_, Account>(&query)
            .bind(google_id)
            .fetch_optional(pool)
            .await
    }

    /// Attach a Google id to an existing account. The avatar is only filled
    /// in when the account has none yet.
    pub async fn link_google_id(
        pool: &PgPool,
        id: DbId,
        google_id: &str,
        avatar_url: Option<&str>,
    ) -> Result<Account, sqlx::Error> {
        let query = format!(
            "UPDATE accounts SET
                google_id = $2,
                avatar_url = COALESCE(avatar_url, $3)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .bind(google_id)
            .bind(avatar_url)
            .fetch_one(pool)
            .await
    }

    /// Apply a partial profile update. Only `name` and `bio` are editable.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update_profile(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProfile,
    ) -> Result<Option<Account>, sqlx::Error> {
        let query = format!(
            "UPDATE accounts SET
                name = COALESCE($2, name),
                bio = COALESCE($3, bio)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.bio)
            .fetch_optional(pool)
            .await
    }

    /// Set `last_login_at` to now.
    pub async fn record_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE accounts SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Soft-deactivate an account. Returns `true` if the row was updated.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE accounts SET is_active = false WHERE id = $1 AND is_active = true")
                .bind(id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List active accounts of a role, alphabetically.
    pub async fn list_public_by_role(
        pool: &PgPool,
        role: Role,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PublicProfile>, sqlx::Error> {
        sqlx::query_as::<_, PublicProfile>(
            "SELECT id, name, bio, avatar_url, role FROM accounts
             WHERE role = $1 AND is_active = true
             ORDER BY name ASC, id ASC
             LIMIT $2 OFFSET $3",
        )
        .bind(role.as_str())
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }
}
