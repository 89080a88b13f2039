//! Request deadline enforcement.

use std::time::Duration;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::AppError;

/// Answer with the 408 error envelope when the inner service takes longer
/// than `limit`. Install with `from_fn_with_state(limit, enforce_timeout)`.
pub async fn enforce_timeout(
    State(limit): State<Duration>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    match tokio::time::timeout(limit, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!(%path, limit_ms = limit.as_millis() as u64, "Request timed out");
            AppError::Timeout.into_response()
        }
    }
}
