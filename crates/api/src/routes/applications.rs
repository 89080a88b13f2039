use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::applications;
use crate::state::AppState;

/// Routes mounted at `/applications`.
///
/// ```text
/// GET    /mine                      -> list_my_applications (student)
/// GET    /{id}                      -> get_application (applicant, owner or admin)
/// PATCH  /{id}/status               -> update_application_status (owner)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/mine", get(applications::list_my_applications))
        .route("/{id}", get(applications::get_application))
        .route(
            "/{id}/status",
            patch(applications::update_application_status),
        )
}
