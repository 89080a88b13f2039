use crate::auth::google::GoogleOAuthConfig;
use crate::auth::jwt::JwtConfig;

/// Deployment environment. Controls cookie security and error verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Parse `APP_ENV`. Anything other than `production` (case-insensitive)
    /// is treated as development.
    pub fn from_value(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("production") {
            Environment::Production
        } else {
            Environment::Development
        }
    }

    pub fn is_development(self) -> bool {
        self == Environment::Development
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5000`).
    pub port: u16,
    /// Deployment environment (default: development).
    pub environment: Environment,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// Frontend URL the OAuth callback redirects to.
    pub client_url: String,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Session token configuration (secret, lifetime).
    pub jwt: JwtConfig,
    /// Google OAuth credentials. `None` disables the Google login routes.
    pub google: Option<GoogleOAuthConfig>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `5000`                     |
    /// | `APP_ENV`              | `development`              |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `CLIENT_URL`           | first CORS origin          |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "5000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let environment =
            Environment::from_value(&std::env::var("APP_ENV").unwrap_or_default());

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let client_url = std::env::var("CLIENT_URL")
            .ok()
            .filter(|s| !s.is_empty())
            .or_else(|| cors_origins.first().cloned())
            .unwrap_or_else(|| "http://localhost:5173".into());

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let jwt = JwtConfig::from_env();
        let google = GoogleOAuthConfig::from_env();

        Self {
            host,
            port,
            environment,
            cors_origins,
            client_url,
            request_timeout_secs,
            jwt,
            google,
        }
    }

    /// Whether cookies carry the `Secure` attribute (everywhere but development).
    pub fn secure_cookies(&self) -> bool {
        !self.environment.is_development()
    }
}
