use axum::routing::get;
use axum::Router;

use crate::handlers::{applications, events};
use crate::state::AppState;

/// Routes mounted at `/events`.
///
/// ```text
/// GET    /                          -> list_events (public)
/// POST   /                          -> create_event (university)
/// GET    /{id}                      -> get_event (public)
/// PUT    /{id}                      -> update_event (owner)
/// DELETE /{id}                      -> delete_event (owner or admin)
/// POST   /{id}/applications         -> apply_to_event (student)
/// GET    /{id}/applications         -> list_event_applications (owner or admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(events::list_events).post(events::create_event))
        .route(
            "/{id}",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        .route(
            "/{id}/applications",
            get(applications::list_event_applications).post(applications::apply_to_event),
        )
}
