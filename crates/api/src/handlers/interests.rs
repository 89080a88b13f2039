//! Handlers for a student's interest set (followed universities).

use axum::extract::{Path, State};
use axum::Json;
use campus_core::error::CoreError;
use campus_core::ids::parse_id;
use campus_core::roles::Role;
use campus_core::types::DbId;
use campus_db::models::account::PublicProfile;
use campus_db::repositories::{AccountRepo, InterestRepo};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireStudent;
use crate::response::DataResponse;
use crate::state::AppState;

const ENTITY: &str = "University";

#[derive(Debug, Serialize)]
pub struct InterestChange {
    pub university_id: DbId,
    pub following: bool,
    /// `false` when the request did not change the interest set.
    pub changed: bool,
}

/// GET /api/students/interests
pub async fn list_interests(
    RequireStudent(auth): RequireStudent,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<PublicProfile>>>> {
    let universities = InterestRepo::list_for_student(&state.pool, auth.account_id).await?;
    Ok(Json(DataResponse::new(universities)))
}

/// POST /api/students/interests/{university_id}
///
/// Follow a university. Following twice is a no-op.
pub async fn follow_university(
    RequireStudent(auth): RequireStudent,
    State(state): State<AppState>,
    Path(university_id): Path<String>,
) -> AppResult<Json<DataResponse<InterestChange>>> {
    let university_id = parse_id(ENTITY, &university_id)?;

    let is_university = AccountRepo::find_by_id(&state.pool, university_id)
        .await?
        .is_some_and(|a| a.role == Role::University && a.is_active);
    if !is_university {
        return Err(AppError::Core(CoreError::NotFound {
            entity: ENTITY,
            id: university_id,
        }));
    }

    let changed = InterestRepo::follow(&state.pool, auth.account_id, university_id).await?;
    if changed {
        tracing::info!(student_id = auth.account_id, university_id, "University followed");
    }

    Ok(Json(DataResponse::new(InterestChange {
        university_id,
        following: true,
        changed,
    })))
}

/// DELETE /api/students/interests/{university_id}
///
/// Unfollow a university. Unfollowing one that is not followed is a no-op.
pub async fn unfollow_university(
    RequireStudent(auth): RequireStudent,
    State(state): State<AppState>,
    Path(university_id): Path<String>,
) -> AppResult<Json<DataResponse<InterestChange>>> {
    let university_id = parse_id(ENTITY, &university_id)?;
    let changed = InterestRepo::unfollow(&state.pool, auth.account_id, university_id).await?;

    Ok(Json(DataResponse::new(InterestChange {
        university_id,
        following: false,
        changed,
    })))
}
