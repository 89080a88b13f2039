//! Handlers for the `/auth` resource (signup, login, logout, profile).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use campus_core::error::CoreError;
use campus_core::profile::{normalize_email, validate_bio, validate_name};
use campus_core::roles::Role;
use campus_db::models::account::{Account, AccountResponse, CreateAccount, UpdateProfile};
use campus_db::repositories::AccountRepo;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::jwt::generate_session_token;
use crate::auth::password::{
    hash_password, validate_password_strength, verify_dummy, verify_password, MIN_PASSWORD_LENGTH,
};
use crate::auth::session::{expired_session_cookie, session_cookie};
use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, ValidatedJson};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// The one message every failed login produces.
const INVALID_CREDENTIALS: &str = "Invalid email or password";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/signup`.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    /// Trimmed and lowercased before validation and storage.
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    pub password: String,
    #[validate(length(min = 1, max = 100, message = "Name must be 1 to 100 characters"))]
    pub name: String,
    /// `student` (default) or `university`.
    pub role: Option<String>,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `PUT /auth/profile`. Only `name` and `bio` are editable;
/// any other field is rejected.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub bio: Option<String>,
}

/// Returned by signup and login. The token is also set as the session cookie;
/// it is included in the body for API clients that use Bearer auth.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub account: AccountResponse,
    pub token: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/auth/signup
///
/// Create a password account and start a session. A duplicate email (in any
/// letter case) is rejected by `uq_accounts_email` and answered with 409.
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(input): ValidatedJson<SignupRequest>,
) -> AppResult<(StatusCode, CookieJar, Json<DataResponse<SessionResponse>>)> {
    let email = normalize_email(&input.email)?;
    let name = input.name.trim().to_string();
    validate_name(&name)?;
    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    let role = match input.role.as_deref() {
        Some(role) => Role::parse_signup(role)?,
        None => Role::Student,
    };

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let account = AccountRepo::create(
        &state.pool,
        &CreateAccount {
            email,
            password_hash: Some(password_hash),
            google_id: None,
            name,
            avatar_url: None,
            role,
        },
    )
    .await?;

    tracing::info!(account_id = account.id, role = %account.role, "Account created");

    let (jar, body) = start_session(&state, jar, &account)?;
    Ok((StatusCode::CREATED, jar, Json(DataResponse::new(body))))
}

/// POST /api/auth/login
///
/// Authenticate with email + password. Unknown email, deactivated account,
/// Google-only account and wrong password are indistinguishable to the
/// caller, and each costs one Argon2 verification.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(input): AppJson<LoginRequest>,
) -> AppResult<(CookieJar, Json<DataResponse<SessionResponse>>)> {
    let email = input.email.trim().to_lowercase();
    let account = AccountRepo::find_by_email(&state.pool, &email).await?;

    let verified = match account.as_ref() {
        Some(Account {
            is_active: true,
            password_hash: Some(hash),
            ..
        }) => verify_password(&input.password, hash)
            .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?,
        _ => {
            verify_dummy(&input.password);
            false
        }
    };

    let account = match account {
        Some(account) if verified => account,
        _ => {
            return Err(AppError::Core(CoreError::Unauthorized(
                INVALID_CREDENTIALS.into(),
            )))
        }
    };

    AccountRepo::record_login(&state.pool, account.id).await?;
    tracing::info!(account_id = account.id, "Password login");

    let (jar, body) = start_session(&state, jar, &account)?;
    Ok((jar, Json(DataResponse::new(body))))
}

/// POST /api/auth/logout
///
/// Always answers with an expired session cookie, whether or not the request
/// carried one. Tokens are stateless, so a copied Bearer token stays valid
/// until it expires.
pub async fn logout(
    auth: AuthUser,
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<DataResponse<serde_json::Value>>) {
    tracing::info!(account_id = auth.account_id, "Logout");
    let jar = jar.add(expired_session_cookie(state.config.secure_cookies()));
    (
        jar,
        Json(DataResponse::new(
            serde_json::json!({ "message": "Logged out" }),
        )),
    )
}

/// GET /api/auth/me
///
/// The caller's account. A session whose account was removed or deactivated
/// is treated as unauthenticated.
pub async fn me(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<AccountResponse>>> {
    let account = load_active_account(&state, auth).await?;
    Ok(Json(DataResponse::new(AccountResponse::from(&account))))
}

/// PUT /api/auth/profile
///
/// Partial update of the caller's `name` and `bio`.
pub async fn update_profile(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<UpdateProfileRequest>,
) -> AppResult<Json<DataResponse<AccountResponse>>> {
    let name = match input.name {
        Some(name) => {
            let name = name.trim().to_string();
            validate_name(&name)?;
            Some(name)
        }
        None => None,
    };
    if let Some(bio) = input.bio.as_deref() {
        validate_bio(bio)?;
    }

    load_active_account(&state, auth).await?;

    let account = AccountRepo::update_profile(
        &state.pool,
        auth.account_id,
        &UpdateProfile {
            name,
            bio: input.bio,
        },
    )
    .await?
    .ok_or_else(session_gone)?;

    Ok(Json(DataResponse::new(AccountResponse::from(&account))))
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Issue a session token for `account` and add it to the cookie jar.
pub(crate) fn start_session(
    state: &AppState,
    jar: CookieJar,
    account: &Account,
) -> AppResult<(CookieJar, SessionResponse)> {
    let token = generate_session_token(account.id, account.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let jar = jar.add(session_cookie(
        token.clone(),
        state.config.jwt.session_lifetime_secs(),
        state.config.secure_cookies(),
    ));

    Ok((
        jar,
        SessionResponse {
            account: AccountResponse::from(account),
            token,
        },
    ))
}

/// Load the caller's account, failing with 401 when it no longer exists or
/// has been deactivated.
pub(crate) async fn load_active_account(state: &AppState, auth: AuthUser) -> AppResult<Account> {
    match AccountRepo::find_by_id(&state.pool, auth.account_id).await? {
        Some(account) if account.is_active => Ok(account),
        _ => Err(session_gone()),
    }
}

fn session_gone() -> AppError {
    AppError::Core(CoreError::Unauthorized(
        "Session is no longer valid".into(),
    ))
}
