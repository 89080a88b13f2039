//! Public university directory.

use axum::extract::State;
use axum::Json;
use campus_core::roles::Role;
use campus_db::models::account::PublicProfile;
use campus_db::repositories::AccountRepo;

use crate::error::AppResult;
use crate::extract::AppQuery;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/universities
pub async fn list_universities(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<PublicProfile>>>> {
    let (limit, offset) = params.resolve();
    let universities =
        AccountRepo::list_public_by_role(&state.pool, Role::University, limit, offset).await?;
    Ok(Json(DataResponse::new(universities)))
}
