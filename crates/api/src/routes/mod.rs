pub mod applications;
pub mod auth;
pub mod events;
pub mod health;
pub mod notification;
pub mod students;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /health                                          liveness + db reachability
/// /ws                                              live channel (WebSocket)
///
/// /auth/signup, /auth/login                        password auth (public)
/// /auth/google, /auth/google/callback              Google sign-in (public)
/// /auth/logout, /auth/me, /auth/profile            session
///
/// /notifications                                   list, unread-count, read-all
/// /notifications/{id}                              read, delete
///
/// /students/interests                              list followed universities
/// /students/interests/{university_id}              follow, unfollow
/// /universities                                    public directory
///
/// /events                                          list, create
/// /events/{id}                                     get, update, delete
/// /events/{id}/applications                        apply, list
///
/// /applications/mine                               caller's applications
/// /applications/{id}                               get
/// /applications/{id}/status                        accept / reject
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .route("/ws", get(ws::ws_handler))
        .nest("/auth", auth::router())
        .nest("/notifications", notification::router())
        .nest("/students", students::router())
        .nest("/universities", students::universities_router())
        .nest("/events", events::router())
        .nest("/applications", applications::router())
}
