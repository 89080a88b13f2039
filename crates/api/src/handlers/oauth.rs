//! Google sign-in: consent redirect and callback.

use axum::extract::State;
use axum::response::Redirect;
use axum_extra::extract::cookie::CookieJar;
use campus_core::error::CoreError;
use campus_core::profile::{normalize_email, MAX_NAME_LENGTH};
use campus_core::roles::Role;
use campus_db::models::account::{Account, CreateAccount};
use campus_db::repositories::AccountRepo;
use campus_db::DbPool;
use serde::Deserialize;

use crate::auth::google::{ExternalProfile, IdentityProvider};
use crate::auth::session::{
    oauth_state_cookie, oauth_state_removal_cookie, parse_oauth_state, OAUTH_STATE_COOKIE,
};
use crate::error::{AppError, AppResult};
use crate::extract::AppQuery;
use crate::handlers::auth::start_session;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GoogleStartQuery {
    /// Role for a newly created account: `student` (default) or `university`.
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GoogleCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Set by Google when the user denies consent.
    pub error: Option<String>,
}

fn provider(state: &AppState) -> AppResult<&dyn IdentityProvider> {
    state
        .identity_provider
        .as_deref()
        .ok_or_else(|| AppError::NotConfigured("Google sign-in is not configured".into()))
}

/// GET /api/auth/google
///
/// Redirect to the Google consent screen. The `state` nonce and the
/// requested signup role are remembered in a short-lived cookie.
pub async fn google_start(
    State(state): State<AppState>,
    jar: CookieJar,
    AppQuery(query): AppQuery<GoogleStartQuery>,
) -> AppResult<(CookieJar, Redirect)> {
    let provider = provider(&state)?;
    let role = match query.role.as_deref() {
        Some(role) => Role::parse_signup(role)?,
        None => Role::Student,
    };

    let nonce = uuid::Uuid::new_v4().simple().to_string();
    let url = provider
        .authorization_url(&nonce)
        .map_err(|e| AppError::InternalError(e.to_string()))?;

    let jar = jar.add(oauth_state_cookie(
        &nonce,
        role,
        state.config.secure_cookies(),
    ));
    Ok((jar, Redirect::to(&url)))
}

/// GET /api/auth/google/callback
///
/// Verify the `state` nonce, exchange the code for the caller's verified
/// Google profile, resolve or create the account, set the session cookie and
/// redirect to the client. Failures that the user can act on redirect to the
/// client's login page with an `error` query parameter.
pub async fn google_callback(
    State(state): State<AppState>,
    jar: CookieJar,
    AppQuery(query): AppQuery<GoogleCallbackQuery>,
) -> AppResult<(CookieJar, Redirect)> {
    let provider = provider(&state)?;

    let expected = jar
        .get(OAUTH_STATE_COOKIE)
        .map(|c| c.value().to_string())
        .unwrap_or_default();
    let jar = jar.remove(oauth_state_removal_cookie());

    if let Some(error) = query.error.as_deref() {
        tracing::warn!(error, "Google sign-in was not completed");
        return Ok((jar, login_failure(&state, "oauth_denied")));
    }

    let Some((nonce, role)) = parse_oauth_state(&expected) else {
        tracing::warn!("Google callback without a valid state cookie");
        return Ok((jar, login_failure(&state, "invalid_state")));
    };
    let (Some(code), Some(returned_state)) = (query.code.as_deref(), query.state.as_deref())
    else {
        return Ok((jar, login_failure(&state, "invalid_request")));
    };
    if returned_state != nonce {
        tracing::warn!("Google callback state mismatch");
        return Ok((jar, login_failure(&state, "invalid_state")));
    }

    let profile = match provider.exchange_code(code).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::warn!(error = %e, "Google profile rejected");
            return Ok((jar, login_failure(&state, "oauth_failed")));
        }
    };

    let account = match resolve_oauth_account(&state.pool, &profile, role).await {
        Ok(account) => account,
        Err(AppError::Core(CoreError::Unauthorized(_))) => {
            return Ok((jar, login_failure(&state, "account_disabled")));
        }
        Err(e) => return Err(e),
    };

    AccountRepo::record_login(&state.pool, account.id).await?;
    tracing::info!(account_id = account.id, "Google login");

    let (jar, _) = start_session(&state, jar, &account)?;
    Ok((jar, Redirect::to(&state.config.client_url)))
}

fn login_failure(state: &AppState, code: &str) -> Redirect {
    Redirect::to(&format!(
        "{}/login?error={code}",
        state.config.client_url.trim_end_matches('/')
    ))
}

/// Find the account for a verified Google profile.
///
/// Lookup order: linked Google id, then email (linking the Google id to the
/// existing account), then a new account with `role`.
pub(crate) async fn resolve_oauth_account(
    pool: &DbPool,
    profile: &ExternalProfile,
    role: Role,
) -> AppResult<Account> {
    if let Some(account) = AccountRepo::find_by_google_id(pool, &profile.provider_user_id).await? {
        return ensure_active(account);
    }

    let email = normalize_email(&profile.email)?;

    if let Some(account) = AccountRepo::find_by_email(pool, &email).await? {
        let account = ensure_active(account)?;
        let linked = AccountRepo::link_google_id(
            pool,
            account.id,
            &profile.provider_user_id,
            profile.picture.as_deref(),
        )
        .await?;
        tracing::info!(account_id = linked.id, "Linked Google identity to existing account");
        return Ok(linked);
    }

    let account = AccountRepo::create(
        pool,
        &CreateAccount {
            name: display_name(profile, &email),
            email,
            password_hash: None,
            google_id: Some(profile.provider_user_id.clone()),
            avatar_url: profile.picture.clone(),
            role,
        },
    )
    .await?;
    tracing::info!(account_id = account.id, role = %account.role, "Account created via Google");
    Ok(account)
}

fn ensure_active(account: Account) -> AppResult<Account> {
    if !account.is_active {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Account is deactivated".into(),
        )));
    }
    Ok(account)
}

/// The Google display name, falling back to the email's local part.
fn display_name(profile: &ExternalProfile, email: &str) -> String {
    let name = profile
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| email.split('@').next().unwrap_or(email));
    name.chars().take(MAX_NAME_LENGTH).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: Option<&str>) -> ExternalProfile {
        ExternalProfile {
            provider_user_id: "1101".into(),
            email: "ada@example.edu".into(),
            name: name.map(str::to_string),
            picture: None,
        }
    }

    #[test]
    fn display_name_prefers_google_name() {
        assert_eq!(display_name(&profile(Some(" Ada L. ")), "ada@example.edu"), "Ada L.");
    }

    #[test]
    fn display_name_falls_back_to_email_local_part() {
        assert_eq!(display_name(&profile(None), "ada@example.edu"), "ada");
        assert_eq!(display_name(&profile(Some("  ")), "ada@example.edu"), "ada");
    }

    #[test]
    fn display_name_is_truncated() {
        let long = "x".repeat(MAX_NAME_LENGTH + 20);
        assert_eq!(
            display_name(&profile(Some(&long)), "ada@example.edu")
                .chars()
                .count(),
            MAX_NAME_LENGTH
        );
    }
}
