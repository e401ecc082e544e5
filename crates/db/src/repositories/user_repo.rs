//! Repository for the `users` table.

use sqlx::PgPool;
use taskpulse_core::roles::ROLE_MEMBER;
use taskpulse_core::status::TaskStatus;
use taskpulse_core::types::DbId;

use crate::models::user::{CreateUser, UpdateProfile, User, UserWithTaskCounts};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, name, email, password_hash, role, profile_image_url, created_at, updated_at";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (name, email, password_hash, role, profile_image_url)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.role)
            .bind(&input.profile_image_url)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email (case-sensitive).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Return the subset of `ids` that exist in the `users` table.
    ///
    /// Callers diff against the input to report which assignee id failed
    /// to resolve.
    pub async fn existing_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<DbId>, sqlx::Error> {
        let rows: Vec<(DbId,)> = sqlx::query_as("SELECT id FROM users WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// List all member users with per-status task counts, newest first.
    ///
    /// Counts come from a single grouped LEFT JOIN pass over the tasks
    /// table rather than one count query per user.
    pub async fn list_members_with_counts(
        pool: &PgPool,
    ) -> Result<Vec<UserWithTaskCounts>, sqlx::Error> {
        sqlx::query_as::<_, UserWithTaskCounts>(
            "SELECT \
                 u.id, u.name, u.email, u.role, u.profile_image_url, u.created_at, \
                 COUNT(t.id) FILTER (WHERE t.status_id = $1) AS pending_tasks, \
                 COUNT(t.id) FILTER (WHERE t.status_id = $2) AS in_progress_tasks, \
                 COUNT(t.id) FILTER (WHERE t.status_id = $3) AS completed_tasks \
             FROM users u \
             LEFT JOIN tasks t ON u.id = ANY(t.assigned_to) \
             WHERE u.role = $4 \
             GROUP BY u.id \
             ORDER BY u.created_at DESC, u.id DESC",
        )
        .bind(TaskStatus::Pending.id())
        .bind(TaskStatus::InProgress.id())
        .bind(TaskStatus::Completed.id())
        .bind(ROLE_MEMBER)
        .fetch_all(pool)
        .await
    }

    /// Update a user's profile. Only non-`None` fields in `input` are
    /// applied. Returns `None` if no row with the given `id` exists.
    pub async fn update_profile(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProfile,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                password_hash = COALESCE($4, password_hash),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.password_hash)
            .fetch_optional(pool)
            .await
    }
}
