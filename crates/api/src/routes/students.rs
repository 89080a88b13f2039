use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{interests, universities};
use crate::state::AppState;

/// Routes mounted at `/students`.
///
/// ```text
/// GET    /interests                      -> list_interests
/// POST   /interests/{university_id}      -> follow_university
/// DELETE /interests/{university_id}      -> unfollow_university
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/interests", get(interests::list_interests))
        .route(
            "/interests/{university_id}",
            post(interests::follow_university).delete(interests::unfollow_university),
        )
}

/// Routes mounted at `/universities`.
pub fn universities_router() -> Router<AppState> {
    Router::new().route("/", get(universities::list_universities))
}
