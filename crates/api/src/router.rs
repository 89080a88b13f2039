//! HTTP surface assembly. `main.rs` and the integration tests both go
//! through [`build_app_router`], so tests exercise the production layers.

use std::time::Duration;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;
use crate::error::{attach_error_detail, method_not_allowed, panic_response, route_not_found};
use crate::middleware::timeout::enforce_timeout;
use crate::routes;
use crate::state::AppState;

/// The campus API under `/api`, wrapped in the standard layers.
pub fn build_app_router(state: AppState, config: &ServerConfig) -> Router {
    with_layers(Router::new().nest("/api", routes::api_routes()), state, config)
}

/// Wrap `routes` so that every response, including unmatched paths, wrong
/// methods, timeouts and panics, leaves as the JSON error envelope.
///
/// Layers run outermost first on the way in:
/// CORS, request id, tracing, deadline, development `detail`, panic guard.
/// The panic guard sits inside the detail layer so a caught panic's
/// description reaches development clients.
pub fn with_layers(routes: Router<AppState>, state: AppState, config: &ServerConfig) -> Router {
    let request_id = HeaderName::from_static("x-request-id");
    let deadline = Duration::from_secs(config.request_timeout_secs);

    routes
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(route_not_found)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            attach_error_detail,
        ))
        .layer(axum::middleware::from_fn_with_state(deadline, enforce_timeout))
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .layer(cors_layer(config))
        .with_state(state)
}

/// Credentialed CORS for the configured browser origins.
///
/// An origin that is not a valid header value aborts startup.
pub fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<_> = config
        .cors_origins
        .iter()
        .map(|o| {
            o.parse()
                .unwrap_or_else(|e| panic!("Invalid CORS origin '{o}': {e}"))
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}
