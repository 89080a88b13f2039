//! Handlers for the `/events` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use campus_core::error::CoreError;
use campus_core::event::{validate_description, validate_location, validate_media, validate_title};
use campus_core::ids::parse_id;
use campus_core::roles::Role;
use campus_core::types::{DbId, Timestamp};
use campus_db::models::event::{CreateEvent, Event, UpdateEvent};
use campus_db::repositories::{AccountRepo, EventRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppQuery};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireUniversity;
use crate::query::PaginationParams;
use crate::response::{DataResponse, Page};
use crate::state::AppState;

const ENTITY: &str = "Event";

/// Request body for `POST /events`.
#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub event_date: Timestamp,
    pub location: String,
    #[serde(default)]
    pub media: Vec<String>,
}

/// Query parameters for `GET /events`.
#[derive(Debug, Deserialize)]
pub struct EventListQuery {
    pub university_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Load an event by its raw path id. Malformed ids read as "not found".
pub(crate) async fn load_event(state: &AppState, raw_id: &str) -> AppResult<Event> {
    let id = parse_id(ENTITY, raw_id)?;
    EventRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: ENTITY, id }))
}

fn ensure_owner(event: &Event, auth: &AuthUser) -> AppResult<()> {
    if event.university_id != auth.account_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the university that owns this event can do that".into(),
        )));
    }
    Ok(())
}

fn validate_event_fields(input: &UpdateEvent) -> Result<(), CoreError> {
    if let Some(title) = input.title.as_deref() {
        validate_title(title)?;
    }
    if let Some(description) = input.description.as_deref() {
        validate_description(description)?;
    }
    if let Some(location) = input.location.as_deref() {
        validate_location(location)?;
    }
    if let Some(media) = input.media.as_deref() {
        validate_media(media)?;
    }
    Ok(())
}

/// GET /api/events
pub async fn list_events(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<EventListQuery>,
) -> AppResult<Json<DataResponse<Page<Event>>>> {
    let (limit, offset) = PaginationParams {
        limit: params.limit,
        offset: params.offset,
    }
    .resolve();
    let items = EventRepo::list(&state.pool, params.university_id, limit, offset).await?;
    let total = EventRepo::count(&state.pool, params.university_id).await?;

    Ok(Json(DataResponse::new(Page {
        items,
        total,
        limit,
        offset,
    })))
}

/// GET /api/events/{id}
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DataResponse<Event>>> {
    let event = load_event(&state, &id).await?;
    Ok(Json(DataResponse::new(event)))
}

/// POST /api/events
///
/// Publish an event owned by the calling university, then notify every
/// student following that university.
pub async fn create_event(
    RequireUniversity(auth): RequireUniversity,
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateEventRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Event>>)> {
    validate_title(&input.title)?;
    validate_description(&input.description)?;
    validate_location(&input.location)?;
    validate_media(&input.media)?;

    let university = AccountRepo::find_by_id(&state.pool, auth.account_id)
        .await?
        .filter(|a| a.is_active)
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Session is no longer valid".into()))
        })?;

    let event = EventRepo::create(
        &state.pool,
        &CreateEvent {
            university_id: university.id,
            title: input.title.trim().to_string(),
            description: input.description,
            event_date: input.event_date,
            location: input.location.trim().to_string(),
            media: input.media,
        },
    )
    .await?;

    tracing::info!(event_id = event.id, university_id = university.id, "Event created");

    state
        .dispatcher()
        .notify_new_event(&event, &university.name)
        .await;

    Ok((StatusCode::CREATED, Json(DataResponse::new(event))))
}

/// PUT /api/events/{id}
///
/// Partial update by the owning university.
pub async fn update_event(
    RequireUniversity(auth): RequireUniversity,
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(input): AppJson<UpdateEvent>,
) -> AppResult<Json<DataResponse<Event>>> {
    let event = load_event(&state, &id).await?;
    ensure_owner(&event, &auth)?;
    validate_event_fields(&input)?;

    let input = UpdateEvent {
        title: input.title.map(|t| t.trim().to_string()),
        location: input.location.map(|l| l.trim().to_string()),
        ..input
    };

    let updated = EventRepo::update(&state.pool, event.id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: ENTITY,
            id: event.id,
        }))?;

    Ok(Json(DataResponse::new(updated)))
}

/// DELETE /api/events/{id}
///
/// Allowed for the owning university and for admins. Applications are
/// removed with the event.
pub async fn delete_event(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let event = load_event(&state, &id).await?;
    if auth.role != Role::Admin {
        ensure_owner(&event, &auth)?;
    }

    if !EventRepo::delete(&state.pool, event.id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: ENTITY,
            id: event.id,
        }));
    }

    tracing::info!(event_id = event.id, deleted_by = auth.account_id, "Event deleted");
    Ok(StatusCode::NO_CONTENT)
}
