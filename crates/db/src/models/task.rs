//! Task entity model and DTOs.

use sqlx::types::Json;
use sqlx::FromRow;
use taskpulse_core::checklist::ChecklistItem;
use taskpulse_core::types::{DbId, Timestamp};

/// Full task row from the `tasks` table.
///
/// `status_id` / `priority_id` map to the enums in
/// `taskpulse_core::status`; the checklist is stored as a JSONB array.
#[derive(Debug, Clone, FromRow)]
pub struct Task {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub priority_id: i16,
    pub status_id: i16,
    pub due_date: Timestamp,
    pub assigned_to: Vec<DbId>,
    pub created_by: DbId,
    pub checklist: Json<Vec<ChecklistItem>>,
    pub attachments: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

/// DTO for inserting a new task. Fields are already validated and
/// normalized (ids resolved, checklist items reset to not-done).
#[derive(Debug)]
pub struct CreateTask {
    pub title: String,
    pub description: String,
    pub priority_id: i16,
    pub status_id: i16,
    pub due_date: Timestamp,
    pub assigned_to: Vec<DbId>,
    pub created_by: DbId,
    pub checklist: Vec<ChecklistItem>,
    pub attachments: Vec<String>,
}

/// The complete next state of a task, written in one statement under a
/// row lock. The handler merges the patch and recomputes derived fields
/// before calling the repository, so a write is always all-or-nothing.
#[derive(Debug)]
pub struct TaskChanges {
    pub title: String,
    pub description: String,
    pub priority_id: i16,
    pub status_id: i16,
    pub due_date: Timestamp,
    pub assigned_to: Vec<DbId>,
    pub checklist: Vec<ChecklistItem>,
    pub attachments: Vec<String>,
    pub completed_at: Option<Timestamp>,
}

/// Filters for the task list operation. `assigned_to` scopes the listing
/// to one user (members always get their own id here).
#[derive(Debug, Default)]
pub struct TaskFilters {
    pub status_id: Option<i16>,
    pub priority_id: Option<i16>,
    /// Case-insensitive substring match over the title.
    pub search: Option<String>,
    pub assigned_to: Option<DbId>,
}
