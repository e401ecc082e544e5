//! Handlers for the `/users` resource.

use axum::extract::{Path, State};
use axum::Json;
use taskpulse_core::error::CoreError;
use taskpulse_core::types::DbId;
use taskpulse_db::models::user::{UserResponse, UserWithTaskCounts};
use taskpulse_db::repositories::UserRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/users
///
/// Admin directory of member users, each with pending / in-progress /
/// completed task counts. The counts come from one grouped aggregation
/// pass in the repository, not a query per user.
pub async fn list_users(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<UserWithTaskCounts>>>> {
    let users = UserRepo::list_members_with_counts(&state.pool).await?;
    Ok(Json(DataResponse { data: users }))
}

/// GET /api/v1/users/{id}
///
/// Get a single user by ID. Never exposes the password hash.
pub async fn get_user(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    Ok(Json(DataResponse { data: user.into() }))
}
