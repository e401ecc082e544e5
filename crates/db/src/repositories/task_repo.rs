//! Repository for the `tasks` table.
//!
//! Mutations that depend on the current row state (`apply_update`,
//! `set_status`, `set_checklist`) run against a caller-provided
//! transaction connection after a `find_for_update` row lock, so each
//! task's read-modify-write cycle is serialized without blocking updates
//! to other tasks.

use sqlx::{PgConnection, PgPool};
use taskpulse_core::checklist::ChecklistItem;
use taskpulse_core::types::{DbId, Timestamp};

use crate::models::task::{CreateTask, Task, TaskChanges, TaskFilters};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, description, priority_id, status_id, due_date, assigned_to, \
                       created_by, checklist, attachments, created_at, updated_at, completed_at";

/// Provides CRUD operations for tasks.
pub struct TaskRepo;

impl TaskRepo {
    /// Insert a new task, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateTask) -> Result<Task, sqlx::Error> {
        let query = format!(
            "INSERT INTO tasks (title, description, priority_id, status_id, due_date, \
                                assigned_to, created_by, checklist, attachments)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.priority_id)
            .bind(input.status_id)
            .bind(input.due_date)
            .bind(&input.assigned_to)
            .bind(input.created_by)
            .bind(sqlx::types::Json(&input.checklist))
            .bind(&input.attachments)
            .fetch_one(pool)
            .await
    }

    /// Find a task by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE id = $1");
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a task by ID and lock its row for the rest of the transaction.
    pub async fn find_for_update(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// List tasks matching `filters`, newest first (stable: `created_at`
    /// DESC with an id tiebreak).
    pub async fn list(pool: &PgPool, filters: &TaskFilters) -> Result<Vec<Task>, sqlx::Error> {
        // Build the WHERE clause dynamically from the provided filters.
        let mut conditions: Vec<String> = Vec::new();
        let mut bind_idx: u32 = 1;

        if filters.status_id.is_some() {
            conditions.push(format!("status_id = ${bind_idx}"));
            bind_idx += 1;
        }
        if filters.priority_id.is_some() {
            conditions.push(format!("priority_id = ${bind_idx}"));
            bind_idx += 1;
        }
        if filters.search.is_some() {
            conditions.push(format!("title ILIKE '%' || ${bind_idx} || '%'"));
            bind_idx += 1;
        }
        if filters.assigned_to.is_some() {
            conditions.push(format!("${bind_idx} = ANY(assigned_to)"));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT {COLUMNS} FROM tasks {where_clause} ORDER BY created_at DESC, id DESC"
        );

        let mut q = sqlx::query_as::<_, Task>(&query);
        if let Some(status_id) = filters.status_id {
            q = q.bind(status_id);
        }
        if let Some(priority_id) = filters.priority_id {
            q = q.bind(priority_id);
        }
        if let Some(ref search) = filters.search {
            q = q.bind(search);
        }
        if let Some(user_id) = filters.assigned_to {
            q = q.bind(user_id);
        }

        q.fetch_all(pool).await
    }

    /// Write the complete next state of a task in one statement.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn apply_update(
        conn: &mut PgConnection,
        id: DbId,
        changes: &TaskChanges,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks SET
                title = $2,
                description = $3,
                priority_id = $4,
                status_id = $5,
                due_date = $6,
                assigned_to = $7,
                checklist = $8,
                attachments = $9,
                completed_at = $10,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(&changes.title)
            .bind(&changes.description)
            .bind(changes.priority_id)
            .bind(changes.status_id)
            .bind(changes.due_date)
            .bind(&changes.assigned_to)
            .bind(sqlx::types::Json(&changes.checklist))
            .bind(&changes.attachments)
            .bind(changes.completed_at)
            .fetch_optional(conn)
            .await
    }

    /// Update only the status and completion timestamp.
    pub async fn set_status(
        conn: &mut PgConnection,
        id: DbId,
        status_id: i16,
        completed_at: Option<Timestamp>,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks SET status_id = $2, completed_at = $3, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(status_id)
            .bind(completed_at)
            .fetch_optional(conn)
            .await
    }

    /// Update the checklist together with its derived status and
    /// completion timestamp.
    pub async fn set_checklist(
        conn: &mut PgConnection,
        id: DbId,
        checklist: &[ChecklistItem],
        status_id: i16,
        completed_at: Option<Timestamp>,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks SET checklist = $2, status_id = $3, completed_at = $4, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(sqlx::types::Json(checklist))
            .bind(status_id)
            .bind(completed_at)
            .fetch_optional(conn)
            .await
    }

    /// Delete a task. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
