//! Session cookie handling and token extraction.

use axum::http::{header, HeaderMap};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use campus_core::roles::Role;

/// Name of the HTTP-only cookie carrying the session token.
pub const SESSION_COOKIE: &str = "token";

/// Name of the short-lived cookie carrying the OAuth `state` nonce and the
/// requested signup role.
pub const OAUTH_STATE_COOKIE: &str = "oauth_state";

/// Lifetime of the OAuth state cookie (10 minutes).
const OAUTH_STATE_LIFETIME_SECS: i64 = 600;

/// Build the session cookie for a freshly issued token.
pub fn session_cookie(token: String, lifetime_secs: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::seconds(lifetime_secs))
        .build()
}

/// An already-expired session cookie. Added to the jar unconditionally so the
/// browser drops its copy even when the request authenticated with a Bearer
/// header and sent no cookie.
pub fn expired_session_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::ZERO)
        .build()
}

/// Build the OAuth state cookie. The value is `<nonce>:<role>`.
pub fn oauth_state_cookie(nonce: &str, role: Role, secure: bool) -> Cookie<'static> {
    Cookie::build((OAUTH_STATE_COOKIE, format!("{nonce}:{role}")))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/api/auth/google")
        .max_age(time::Duration::seconds(OAUTH_STATE_LIFETIME_SECS))
        .build()
}

pub fn oauth_state_removal_cookie() -> Cookie<'static> {
    Cookie::build((OAUTH_STATE_COOKIE, ""))
        .path("/api/auth/google")
        .build()
}

/// Split an OAuth state cookie value into its nonce and signup role.
///
/// Returns `None` for values that were not produced by [`oauth_state_cookie`]
/// or that name a role which cannot be self-assigned.
pub fn parse_oauth_state(value: &str) -> Option<(&str, Role)> {
    let (nonce, role) = value.rsplit_once(':')?;
    if nonce.is_empty() {
        return None;
    }
    let role = Role::parse_signup(role).ok()?;
    Some((nonce, role))
}

/// Session tokens presented by a request, in the order they are tried: the
/// session cookie first, then an `Authorization: Bearer <token>` header.
///
/// Both are returned so that a stale cookie left in the browser does not
/// shadow a valid Bearer token.
pub fn candidate_tokens(jar: &CookieJar, headers: &HeaderMap) -> Vec<String> {
    let cookie = jar
        .get(SESSION_COOKIE)
        .map(|c| c.value())
        .filter(|v| !v.is_empty());

    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    let mut tokens: Vec<String> = cookie.into_iter().map(str::to_string).collect();
    if let Some(bearer) = bearer {
        if !tokens.iter().any(|t| t == bearer) {
            tokens.push(bearer.to_string());
        }
    }
    tokens
}
