//! Session authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;
use campus_core::error::CoreError;
use campus_core::roles::Role;
use campus_core::types::DbId;

use crate::auth::jwt::validate_token;
use crate::auth::session::candidate_tokens;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated account resolved from the session cookie or a Bearer token.
///
/// Use this as an extractor parameter in any handler that requires authentication:
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(account_id = user.account_id, role = %user.role, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    /// The account's internal database id (from `claims.sub`).
    pub account_id: DbId,
    pub role: Role,
}

impl AuthUser {
    /// Resolve the identity carried by a raw session token.
    pub fn from_token(token: &str, state: &AppState) -> Result<Self, AppError> {
        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired session".into()))
        })?;

        Ok(AuthUser {
            account_id: claims.sub,
            role: claims.role,
        })
    }

    /// Resolve the first valid token among `tokens`.
    ///
    /// No tokens at all is "Authentication required"; tokens that all fail
    /// to verify are reported as an invalid session.
    pub fn from_candidates(tokens: &[String], state: &AppState) -> Result<Self, AppError> {
        let mut last_err = AppError::Core(CoreError::Unauthorized(
            "Authentication required".into(),
        ));
        for token in tokens {
            match AuthUser::from_token(token, state) {
                Ok(user) => return Ok(user),
                Err(err) => last_err = err,
            }
        }
        Err(last_err)
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        AuthUser::from_candidates(&candidate_tokens(&jar, &parts.headers), state)
    }
}
