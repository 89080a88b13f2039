//! Google OAuth 2.0 identity provider.
//!
//! The callback handler talks to Google only through the [`IdentityProvider`]
//! trait, so the account resolution logic can be exercised with a fake
//! provider in tests.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

const AUTHORIZATION_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const USERINFO_ENDPOINT: &str = "https://openidconnect.googleapis.com/v1/userinfo";

/// Google OAuth client credentials.
#[derive(Debug, Clone)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Must match a redirect URI registered in the Google Cloud console.
    pub redirect_uri: String,
}

impl GoogleOAuthConfig {
    /// Load credentials from `GOOGLE_CLIENT_ID`, `GOOGLE_CLIENT_SECRET` and
    /// `GOOGLE_REDIRECT_URI`. Returns `None` unless all three are set.
    pub fn from_env() -> Option<Self> {
        let read = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());
        Some(Self {
            client_id: read("GOOGLE_CLIENT_ID")?,
            client_secret: read("GOOGLE_CLIENT_SECRET")?,
            redirect_uri: read("GOOGLE_REDIRECT_URI")?,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("OAuth token exchange failed: {0}")]
    TokenExchange(String),

    #[error("OAuth user info request failed: {0}")]
    UserInfo(String),

    #[error("Email address is not verified by the identity provider")]
    EmailNotVerified,

    #[error("Failed to build authorization URL: {0}")]
    AuthorizationUrl(String),
}

/// The verified profile returned by an identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalProfile {
    /// Stable provider-side identifier (Google `sub`).
    pub provider_user_id: String,
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// URL of the consent screen, carrying the given `state` nonce.
    fn authorization_url(&self, state: &str) -> Result<String, AuthError>;

    /// Exchange an authorization code for the caller's verified profile.
    async fn exchange_code(&self, code: &str) -> Result<ExternalProfile, AuthError>;
}

/// [`IdentityProvider`] backed by Google's OAuth and OpenID Connect endpoints.
#[derive(Debug, Clone)]
pub struct GoogleIdentityProvider {
    config: GoogleOAuthConfig,
    http_client: Client,
}

impl GoogleIdentityProvider {
    pub fn new(config: GoogleOAuthConfig) -> Self {
        Self {
            config,
            http_client: Client::new(),
        }
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentityProvider {
    fn authorization_url(&self, state: &str) -> Result<String, AuthError> {
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("response_type", "code"),
            ("scope", "openid email profile"),
            ("state", state),
            ("prompt", "select_account"),
        ];
        let query = serde_urlencoded::to_string(params)
            .map_err(|e| AuthError::AuthorizationUrl(e.to_string()))?;
        Ok(format!("{AUTHORIZATION_ENDPOINT}?{query}"))
    }

    async fn exchange_code(&self, code: &str) -> Result<ExternalProfile, AuthError> {
        let params = [
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ];

        let response = self
            .http_client
            .post(TOKEN_ENDPOINT)
            .form(&params)
            .send()
            .await
            .map_err(|e| AuthError::TokenExchange(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(%status, body = %body, "Google token exchange failed");
            return Err(AuthError::TokenExchange(format!("status {status}")));
        }

        let token: GoogleTokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::TokenExchange(e.to_string()))?;

        let response = self
            .http_client
            .get(USERINFO_ENDPOINT)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(|e| AuthError::UserInfo(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::error!(%status, "Google userinfo request failed");
            return Err(AuthError::UserInfo(format!("status {status}")));
        }

        let user: GoogleUserInfo = response
            .json()
            .await
            .map_err(|e| AuthError::UserInfo(e.to_string()))?;

        user.into_profile()
    }
}

#[derive(Debug, Deserialize)]
struct GoogleTokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    sub: String,
    email: Option<String>,
    #[serde(default)]
    email_verified: bool,
    name: Option<String>,
    picture: Option<String>,
}

impl GoogleUserInfo {
    fn into_profile(self) -> Result<ExternalProfile, AuthError> {
        let email = match self.email {
            Some(email) if self.email_verified => email,
            _ => {
                tracing::warn!(google_sub = %self.sub, "Rejected Google profile without a verified email");
                return Err(AuthError::EmailNotVerified);
            }
        };
        Ok(ExternalProfile {
            provider_user_id: self.sub,
            email,
            name: self.name,
            picture: self.picture,
        })
    }
}
