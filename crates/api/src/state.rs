use std::sync::Arc;

use crate::auth::google::IdentityProvider;
use crate::config::ServerConfig;
use crate::notifications::NotificationDispatcher;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: campus_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Live connection registry.
    pub ws_manager: Arc<WsManager>,
    /// External identity provider. `None` when Google login is not configured.
    pub identity_provider: Option<Arc<dyn IdentityProvider>>,
}

impl AppState {
    pub fn dispatcher(&self) -> NotificationDispatcher {
        NotificationDispatcher::from_state(self)
    }
}
