//! Handlers for the `/auth` resource (register, login, profile).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use taskpulse_core::error::CoreError;
use taskpulse_core::roles::{ROLE_ADMIN, ROLE_MEMBER};
use taskpulse_db::models::user::{CreateUser, UpdateProfile, UserResponse};
use taskpulse_db::repositories::UserRepo;

use crate::auth::jwt::generate_access_token;
use crate::auth::password::{check_password_length, hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub profile_image_url: Option<String>,
    /// Matching the configured invite token grants the admin role.
    pub admin_invite_token: Option<String>,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `PUT /auth/profile`.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Successful authentication response returned by register and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
///
/// Create an account. The role is `member` unless the request carries
/// the configured admin invite token.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<AuthResponse>>)> {
    // 1. Validate the plain fields before any store access.
    if input.name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "name must not be empty".into(),
        )));
    }
    if !input.email.contains('@') {
        return Err(AppError::Core(CoreError::Validation(
            "email is not valid".into(),
        )));
    }
    check_password_length(&input.password)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    // 2. Decide the role from the invite token in configuration.
    let role = match (&state.config.admin_invite_token, &input.admin_invite_token) {
        (Some(expected), Some(provided)) if expected == provided => ROLE_ADMIN,
        _ => ROLE_MEMBER,
    };

    // 3. Hash the password and insert. A duplicate email surfaces as a
    //    409 through the unique-constraint mapping in `error.rs`.
    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            name: input.name.trim().to_string(),
            email: input.email,
            password_hash,
            role: role.to_string(),
            profile_image_url: input.profile_image_url,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, role = %user.role, "User registered");

    // 4. Issue the access token.
    let response = auth_response(&state, user.into())?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: response })))
}

/// POST /api/v1/auth/login
///
/// Authenticate with email + password. Returns the user plus a token.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<DataResponse<AuthResponse>>> {
    // A missing user and a wrong password produce the same message, so
    // login failures do not reveal which emails are registered.
    let user = UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Invalid email or password".into()))
        })?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid email or password".into(),
        )));
    }

    tracing::info!(user_id = user.id, "User logged in");

    let response = auth_response(&state, user.into())?;
    Ok(Json(DataResponse { data: response }))
}

/// GET /api/v1/auth/profile
///
/// Return the authenticated user's own profile.
pub async fn get_profile(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "User",
                id: auth.user_id,
            })
        })?;

    Ok(Json(DataResponse { data: user.into() }))
}

/// PUT /api/v1/auth/profile
///
/// Update name, email, and/or password of the authenticated user.
pub async fn update_profile(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<UpdateProfileRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    if let Some(ref name) = input.name {
        if name.trim().is_empty() {
            return Err(AppError::Core(CoreError::Validation(
                "name must not be empty".into(),
            )));
        }
    }
    if let Some(ref email) = input.email {
        if !email.contains('@') {
            return Err(AppError::Core(CoreError::Validation(
                "email is not valid".into(),
            )));
        }
    }

    let password_hash = match input.password {
        Some(ref password) => {
            check_password_length(password)
                .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
            let hash = hash_password(password)
                .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
            Some(hash)
        }
        None => None,
    };

    let changes = UpdateProfile {
        name: input.name.map(|name| name.trim().to_string()),
        email: input.email,
        password_hash,
    };

    let user = UserRepo::update_profile(&state.pool, auth.user_id, &changes)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "User",
                id: auth.user_id,
            })
        })?;

    tracing::info!(user_id = user.id, "Profile updated");

    Ok(Json(DataResponse { data: user.into() }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Issue an access token for `user` and build the auth response body.
fn auth_response(state: &AppState, user: UserResponse) -> Result<AuthResponse, AppError> {
    let token = generate_access_token(user.id, &user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let expires_in = state.config.jwt.token_expiry_days * 24 * 60 * 60;

    Ok(AuthResponse {
        token,
        expires_in,
        user,
    })
}
