//! Account entity model and DTOs.

use campus_core::roles::Role;
use campus_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Full row from the `accounts` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`AccountResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: DbId,
    pub email: String,
    pub password_hash: Option<String>,
    pub google_id: Option<String>,
    pub name: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub is_active: bool,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Safe account representation for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct AccountResponse {
    pub id: DbId,
    pub email: String,
    pub name: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Role,
    pub has_password: bool,
    pub google_linked: bool,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl From<&Account> for AccountResponse {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            email: account.email.clone(),
            name: account.name.clone(),
            bio: account.bio.clone(),
            avatar_url: account.avatar_url.clone(),
            role: account.role,
            has_password: account.password_hash.is_some(),
            google_linked: account.google_id.is_some(),
            last_login_at: account.last_login_at,
            created_at: account.created_at,
        }
    }
}

/// Public view of an account, used for the university directory and
/// interest listings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PublicProfile {
    pub id: DbId,
    pub name: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    #[sqlx(try_from = "String")]
    pub role: Role,
}

/// DTO for creating a new account. At least one credential must be set.
#[derive(Debug, Clone)]
pub struct CreateAccount {
    pub email: String,
    pub password_hash: Option<String>,
    pub google_id: Option<String>,
    pub name: String,
    pub avatar_url: Option<String>,
    pub role: Role,
}

/// Profile fields an account holder may edit.
#[derive(Debug, Clone, Default)]
pub struct UpdateProfile {
    pub name: Option<String>,
    pub bio: Option<String>,
}
