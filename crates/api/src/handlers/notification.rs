//! Handlers for the `/notifications` resource.
//!
//! All endpoints require authentication via [`AuthUser`] and only ever touch
//! the caller's own notifications.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use campus_core::error::CoreError;
use campus_core::ids::parse_id;
use campus_db::models::notification::Notification;
use campus_db::repositories::NotificationRepo;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::extract::AppQuery;
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

const ENTITY: &str = "Notification";

/// Query parameters for `GET /notifications`.
#[derive(Debug, Deserialize)]
pub struct NotificationQuery {
    /// If `true`, return only unread notifications. Defaults to `false`.
    pub unread_only: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct NotificationPage {
    pub items: Vec<Notification>,
    /// Number of notifications matching the filter.
    pub total: i64,
    /// Number of unread notifications, regardless of the filter.
    pub unread_count: i64,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct MarkAllReadResult {
    pub updated: u64,
}

/// GET /api/notifications
pub async fn list_notifications(
    auth: AuthUser,
    State(state): State<AppState>,
    AppQuery(params): AppQuery<NotificationQuery>,
) -> AppResult<Json<DataResponse<NotificationPage>>> {
    let (limit, offset) = PaginationParams {
        limit: params.limit,
        offset: params.offset,
    }
    .resolve();
    let unread_only = params.unread_only.unwrap_or(false);

    let items =
        NotificationRepo::list_for_recipient(&state.pool, auth.account_id, unread_only, limit, offset)
            .await?;
    let total =
        NotificationRepo::count_for_recipient(&state.pool, auth.account_id, unread_only).await?;
    let unread_count = NotificationRepo::unread_count(&state.pool, auth.account_id).await?;

    Ok(Json(DataResponse::new(NotificationPage {
        items,
        total,
        unread_count,
        limit,
        offset,
    })))
}

/// GET /api/notifications/unread-count
pub async fn unread_count(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<UnreadCount>>> {
    let count = NotificationRepo::unread_count(&state.pool, auth.account_id).await?;
    Ok(Json(DataResponse::new(UnreadCount { count })))
}

/// PATCH /api/notifications/{id}/read
///
/// Idempotent. Returns 404 if the notification does not belong to the caller.
pub async fn mark_read(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DataResponse<Notification>>> {
    let id = parse_id(ENTITY, &id)?;
    let notification = NotificationRepo::mark_read(&state.pool, id, auth.account_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: ENTITY, id }))?;

    state.dispatcher().push_unread_count(auth.account_id).await;
    Ok(Json(DataResponse::new(notification)))
}

/// PATCH /api/notifications/read-all
pub async fn mark_all_read(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<MarkAllReadResult>>> {
    let updated = NotificationRepo::mark_all_read(&state.pool, auth.account_id).await?;

    state.dispatcher().push_unread_count(auth.account_id).await;
    Ok(Json(DataResponse::new(MarkAllReadResult { updated })))
}

/// DELETE /api/notifications/{id}
pub async fn delete_notification(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_id(ENTITY, &id)?;
    if !NotificationRepo::delete(&state.pool, id, auth.account_id).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: ENTITY, id }));
    }

    state.dispatcher().push_unread_count(auth.account_id).await;
    Ok(StatusCode::NO_CONTENT)
}
