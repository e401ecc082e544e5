//! User entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use taskpulse_core::types::{DbId, Timestamp};

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses
/// directly. Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    /// Role name (`"admin"` or `"member"`).
    pub role: String,
    pub profile_image_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub role: String,
    pub profile_image_url: Option<String>,
    pub created_at: Timestamp,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            profile_image_url: user.profile_image_url,
            created_at: user.created_at,
        }
    }
}

/// DTO for creating a new user. The role is decided by the registration
/// path (admin invite token), not by the caller directly.
#[derive(Debug)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub profile_image_url: Option<String>,
}

/// DTO for profile updates. Only non-`None` fields are applied.
#[derive(Debug)]
pub struct UpdateProfile {
    pub name: Option<String>,
    pub email: Option<String>,
    /// Already-hashed replacement password.
    pub password_hash: Option<String>,
}

/// A member row joined with per-status task counts, for the admin user
/// directory. Counts come from one grouped aggregation pass.
#[derive(Debug, FromRow, Serialize)]
pub struct UserWithTaskCounts {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub role: String,
    pub profile_image_url: Option<String>,
    pub created_at: Timestamp,
    pub pending_tasks: i64,
    pub in_progress_tasks: i64,
    pub completed_tasks: i64,
}
