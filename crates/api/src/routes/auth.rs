use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{auth, oauth};
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST   /signup                    -> signup (public)
/// POST   /login                     -> login (public)
/// GET    /google                    -> google_start (public)
/// GET    /google/callback           -> google_callback (public)
/// POST   /logout                    -> logout
/// GET    /me                        -> me
/// PUT    /profile                   -> update_profile
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/google", get(oauth::google_start))
        .route("/google/callback", get(oauth::google_callback))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        .route("/profile", put(auth::update_profile))
}
