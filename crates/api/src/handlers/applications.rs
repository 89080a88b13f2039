//! Handlers for applications: applying to an event, listing, and decisions.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use campus_core::application::{
    validate_application_message, validate_transition, ApplicationStatus,
};
use campus_core::error::CoreError;
use campus_core::ids::parse_id;
use campus_core::roles::Role;
use campus_db::models::application::{Application, ApplicationWithStudent, CreateApplication};
use campus_db::models::event::Event;
use campus_db::repositories::{ApplicationRepo, EventRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::handlers::auth::load_active_account;
use crate::handlers::events::load_event;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireStudent, RequireUniversity};
use crate::response::DataResponse;
use crate::state::AppState;

const ENTITY: &str = "Application";

/// Optional body for `POST /events/{id}/applications`.
#[derive(Debug, Default, Deserialize)]
pub struct ApplyRequest {
    pub message: Option<String>,
}

/// Request body for `PATCH /applications/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

fn parse_apply_body(body: &[u8]) -> AppResult<ApplyRequest> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ApplyRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {e}")))
}

/// Parse the requested status. Anything other than a known status reads as
/// an illegal decision.
fn parse_decision(raw: &str) -> Result<ApplicationStatus, CoreError> {
    raw.trim()
        .to_lowercase()
        .parse()
        .map_err(|_| CoreError::Validation("Status must be 'accepted' or 'rejected'".into()))
}

async fn load_application(state: &AppState, raw_id: &str) -> AppResult<Application> {
    let id = parse_id(ENTITY, raw_id)?;
    ApplicationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: ENTITY, id }))
}

async fn event_of(state: &AppState, application: &Application) -> AppResult<Event> {
    EventRepo::find_by_id(&state.pool, application.event_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Event",
            id: application.event_id,
        }))
}

/// POST /api/events/{id}/applications
///
/// Apply to an event. Exactly one application per (student, event) pair:
/// the insert is attempted and a violation of
/// `uq_applications_student_event` is answered with 409.
pub async fn apply_to_event(
    RequireStudent(auth): RequireStudent,
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    body: Bytes,
) -> AppResult<(StatusCode, Json<DataResponse<Application>>)> {
    let input = parse_apply_body(&body)?;
    let message = input
        .message
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty());
    validate_application_message(message.as_deref())?;

    let event = load_event(&state, &event_id).await?;
    let student = load_active_account(&state, auth).await?;

    let application = ApplicationRepo::create(
        &state.pool,
        &CreateApplication {
            student_id: student.id,
            event_id: event.id,
            message,
        },
    )
    .await?;

    tracing::info!(
        application_id = application.id,
        event_id = event.id,
        student_id = student.id,
        "Application submitted"
    );

    state
        .dispatcher()
        .notify_new_application(&application, &event, &student.name)
        .await;

    Ok((StatusCode::CREATED, Json(DataResponse::new(application))))
}

/// GET /api/events/{id}/applications
///
/// Applications for an event, visible to the owning university and admins.
pub async fn list_event_applications(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> AppResult<Json<DataResponse<Vec<ApplicationWithStudent>>>> {
    let event = load_event(&state, &event_id).await?;
    let is_owner = auth.role == Role::University && event.university_id == auth.account_id;
    if !is_owner && auth.role != Role::Admin {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the university that owns this event can view its applications".into(),
        )));
    }

    let applications = ApplicationRepo::list_for_event(&state.pool, event.id).await?;
    Ok(Json(DataResponse::new(applications)))
}

/// GET /api/applications/mine
pub async fn list_my_applications(
    RequireStudent(auth): RequireStudent,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Application>>>> {
    let applications = ApplicationRepo::list_for_student(&state.pool, auth.account_id).await?;
    Ok(Json(DataResponse::new(applications)))
}

/// GET /api/applications/{id}
///
/// Visible to the applicant, the owning university and admins.
pub async fn get_application(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DataResponse<Application>>> {
    let application = load_application(&state, &id).await?;

    let allowed = match auth.role {
        Role::Admin => true,
        Role::Student => application.student_id == auth.account_id,
        Role::University => event_of(&state, &application).await?.university_id == auth.account_id,
    };
    if !allowed {
        return Err(AppError::Core(CoreError::Forbidden(
            "You cannot view this application".into(),
        )));
    }

    Ok(Json(DataResponse::new(application)))
}

/// PATCH /api/applications/{id}/status
///
/// Accept or reject a pending application of one of the caller's events.
/// The update only matches rows that are still pending, so concurrent
/// decisions cannot both succeed.
pub async fn update_application_status(
    RequireUniversity(auth): RequireUniversity,
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(input): AppJson<UpdateStatusRequest>,
) -> AppResult<Json<DataResponse<Application>>> {
    let application = load_application(&state, &id).await?;
    let event = event_of(&state, &application).await?;
    if event.university_id != auth.account_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the university that owns this event can decide on its applications".into(),
        )));
    }

    let next = parse_decision(&input.status)?;
    validate_transition(application.status, next)?;

    let decided = match ApplicationRepo::decide(&state.pool, application.id, next).await? {
        Some(decided) => decided,
        None => {
            // Decided concurrently between the read and the update.
            let current = ApplicationRepo::find_by_id(&state.pool, application.id)
                .await?
                .ok_or(AppError::Core(CoreError::NotFound {
                    entity: ENTITY,
                    id: application.id,
                }))?;
            validate_transition(current.status, next)?;
            return Err(AppError::Core(CoreError::Conflict(
                "Application was updated concurrently".into(),
            )));
        }
    };

    tracing::info!(
        application_id = decided.id,
        status = %decided.status,
        decided_by = auth.account_id,
        "Application decided"
    );

    state
        .dispatcher()
        .notify_application_status(&decided, &event)
        .await;

    Ok(Json(DataResponse::new(decided)))
}
