//! Handlers for the `/tasks` resource: creation, listing, field updates,
//! status transitions, and checklist progress.
//!
//! Mutations that depend on the current row (update, status, checklist)
//! run as read-modify-write cycles inside one transaction with a row
//! lock, so concurrent updates to the same task serialize and a failed
//! validation never leaves a partial write behind.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use taskpulse_core::checklist::{
    check_status_override, completion_timestamp, derive_status, ChecklistItem,
};
use taskpulse_core::error::CoreError;
use taskpulse_core::permissions::{first_denied_field, is_owner_or_admin, TaskField};
use taskpulse_core::status::{TaskPriority, TaskStatus};
use taskpulse_core::types::{DbId, Timestamp};
use taskpulse_db::models::task::{CreateTask, Task, TaskChanges, TaskFilters};
use taskpulse_db::repositories::{TaskRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::TaskListQuery;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// A checklist item as accepted at task creation. Completion flags are
/// not accepted here; new checklists always start unchecked.
#[derive(Debug, Deserialize)]
pub struct NewChecklistItem {
    pub text: String,
}

/// Request body for `POST /tasks`.
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Priority label; defaults to Medium.
    pub priority: Option<String>,
    pub due_date: Timestamp,
    pub assigned_to: Vec<DbId>,
    #[serde(default)]
    pub checklist: Vec<NewChecklistItem>,
    #[serde(default)]
    pub attachments: Vec<String>,
}

/// A checklist item as accepted in the general update (admins may
/// replace the checklist wholesale, completion flags included).
#[derive(Debug, Deserialize)]
pub struct ChecklistItemPayload {
    pub text: String,
    #[serde(default)]
    pub done: bool,
}

/// Request body for `PUT /tasks/{id}`. All fields optional; which of
/// them a caller may send is decided by the per-field permission table.
#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub due_date: Option<Timestamp>,
    pub assigned_to: Option<Vec<DbId>>,
    pub checklist: Option<Vec<ChecklistItemPayload>>,
    pub attachments: Option<Vec<String>>,
    /// Raw status is never editable here; present means rejected.
    pub status: Option<String>,
}

impl UpdateTaskRequest {
    /// The task fields this patch carries, for the permission table.
    fn present_fields(&self) -> Vec<TaskField> {
        let mut fields = Vec::new();
        if self.title.is_some() {
            fields.push(TaskField::Title);
        }
        if self.description.is_some() {
            fields.push(TaskField::Description);
        }
        if self.priority.is_some() {
            fields.push(TaskField::Priority);
        }
        if self.due_date.is_some() {
            fields.push(TaskField::DueDate);
        }
        if self.assigned_to.is_some() {
            fields.push(TaskField::AssignedTo);
        }
        if self.checklist.is_some() {
            fields.push(TaskField::Checklist);
        }
        if self.attachments.is_some() {
            fields.push(TaskField::Attachments);
        }
        if self.status.is_some() {
            fields.push(TaskField::Status);
        }
        fields
    }
}

/// Request body for `PUT /tasks/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// One positional completion flag for `PUT /tasks/{id}/todo`.
#[derive(Debug, Deserialize)]
pub struct ChecklistFlag {
    pub done: bool,
}

/// Request body for `PUT /tasks/{id}/todo`. Item identity is positional;
/// the payload must carry exactly one flag per stored checklist item.
#[derive(Debug, Deserialize)]
pub struct UpdateChecklistRequest {
    pub checklist: Vec<ChecklistFlag>,
}

/// API-facing task representation: enum ids rendered as labels.
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub priority: String,
    pub status: String,
    pub due_date: Timestamp,
    pub assigned_to: Vec<DbId>,
    pub created_by: DbId,
    pub checklist: Vec<ChecklistItem>,
    pub attachments: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        TaskResponse {
            id: task.id,
            title: task.title,
            description: task.description,
            priority: priority_label(task.priority_id).to_string(),
            status: status_label(task.status_id).to_string(),
            due_date: task.due_date,
            assigned_to: task.assigned_to,
            created_by: task.created_by,
            checklist: task.checklist.0,
            attachments: task.attachments,
            created_at: task.created_at,
            updated_at: task.updated_at,
            completed_at: task.completed_at,
        }
    }
}

/// Map a stored status id to its label.
fn status_label(status_id: i16) -> &'static str {
    TaskStatus::from_id(status_id).map_or("Unknown", TaskStatus::label)
}

/// Map a stored priority id to its label.
fn priority_label(priority_id: i16) -> &'static str {
    TaskPriority::from_id(priority_id).map_or("Unknown", TaskPriority::label)
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

/// Parse a status label from a request, rejecting unknown values.
fn parse_status(label: &str) -> Result<TaskStatus, AppError> {
    TaskStatus::from_label(label).ok_or_else(|| {
        AppError::Core(CoreError::Validation(format!(
            "unknown status '{label}' (expected Pending, InProgress, or Completed)"
        )))
    })
}

/// Parse a priority label from a request, rejecting unknown values.
fn parse_priority(label: &str) -> Result<TaskPriority, AppError> {
    TaskPriority::from_label(label).ok_or_else(|| {
        AppError::Core(CoreError::Validation(format!(
            "unknown priority '{label}' (expected Low, Medium, or High)"
        )))
    })
}

/// Resolve the stored status id, treating an out-of-range value as a
/// data integrity failure.
fn stored_status(task: &Task) -> Result<TaskStatus, AppError> {
    TaskStatus::from_id(task.status_id).ok_or_else(|| {
        AppError::InternalError(format!(
            "task {} has invalid status_id {}",
            task.id, task.status_id
        ))
    })
}

/// Ownership gate: admin, or a member assigned to the task.
fn ensure_owner_or_admin(auth: &AuthUser, task: &Task) -> Result<(), AppError> {
    if is_owner_or_admin(&auth.role, auth.user_id, &task.assigned_to) {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Forbidden(
            "Not assigned to this task".into(),
        )))
    }
}

/// Validate an assignee set: non-empty, every id resolves to a user.
///
/// Assignees are not restricted by role; an admin may appear in the set.
async fn validate_assignees(state: &AppState, assigned_to: &[DbId]) -> Result<(), AppError> {
    if assigned_to.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "assigned_to must contain at least one user".into(),
        )));
    }
    let existing = UserRepo::existing_ids(&state.pool, assigned_to).await?;
    if let Some(&missing) = assigned_to.iter().find(|id| !existing.contains(id)) {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: missing,
        }));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/tasks
///
/// Create a task (admin only). Checklist items start unchecked and the
/// task starts Pending regardless of the due date.
pub async fn create_task(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateTaskRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<TaskResponse>>)> {
    let title = input.title.trim().to_string();
    if title.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "title must not be empty".into(),
        )));
    }

    let priority = match input.priority {
        Some(ref label) => parse_priority(label)?,
        None => TaskPriority::Medium,
    };

    validate_assignees(&state, &input.assigned_to).await?;

    let checklist: Vec<ChecklistItem> = input
        .checklist
        .into_iter()
        .map(|item| ChecklistItem {
            text: item.text,
            done: false,
        })
        .collect();

    let task = TaskRepo::create(
        &state.pool,
        &CreateTask {
            title,
            description: input.description,
            priority_id: priority.id(),
            status_id: TaskStatus::Pending.id(),
            due_date: input.due_date,
            assigned_to: input.assigned_to,
            created_by: admin.user_id,
            checklist,
            attachments: input.attachments,
        },
    )
    .await?;

    tracing::info!(
        task_id = task.id,
        created_by = admin.user_id,
        assignees = task.assigned_to.len(),
        "Task created"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse { data: task.into() }),
    ))
}

/// GET /api/v1/tasks
///
/// List tasks, newest first. Admins see everything; members see only
/// tasks assigned to them. Filters: `status`, `priority`, `search`.
pub async fn list_tasks(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<TaskListQuery>,
) -> AppResult<Json<DataResponse<Vec<TaskResponse>>>> {
    let filters = TaskFilters {
        status_id: params
            .status
            .as_deref()
            .map(parse_status)
            .transpose()?
            .map(TaskStatus::id),
        priority_id: params
            .priority
            .as_deref()
            .map(parse_priority)
            .transpose()?
            .map(TaskPriority::id),
        search: params.search,
        assigned_to: if auth.role == taskpulse_core::roles::ROLE_ADMIN {
            None
        } else {
            Some(auth.user_id)
        },
    };

    let tasks = TaskRepo::list(&state.pool, &filters).await?;
    let data: Vec<TaskResponse> = tasks.into_iter().map(TaskResponse::from).collect();

    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/tasks/{id}
///
/// Get a single task. A missing task is 404 before any ownership check.
pub async fn get_task(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<TaskResponse>>> {
    let task = TaskRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::NotFound { entity: "Task", id }))?;

    ensure_owner_or_admin(&auth, &task)?;

    Ok(Json(DataResponse { data: task.into() }))
}

/// PUT /api/v1/tasks/{id}
///
/// Patch task fields. The per-field permission table decides what the
/// caller's role may send; a single denied field rejects the whole patch
/// before anything is applied. Checklist replacement re-derives status.
pub async fn update_task(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTaskRequest>,
) -> AppResult<Json<DataResponse<TaskResponse>>> {
    let mut tx = state.pool.begin().await?;

    let task = TaskRepo::find_for_update(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::NotFound { entity: "Task", id }))?;

    ensure_owner_or_admin(&auth, &task)?;

    if let Some(denied) = first_denied_field(&auth.role, &input.present_fields()) {
        return Err(AppError::Core(CoreError::Forbidden(format!(
            "field '{}' is not editable by your role",
            denied.name()
        ))));
    }

    // Validate before merging so a bad patch applies nothing.
    let title = match input.title {
        Some(ref title) => {
            let trimmed = title.trim().to_string();
            if trimmed.is_empty() {
                return Err(AppError::Core(CoreError::Validation(
                    "title must not be empty".into(),
                )));
            }
            trimmed
        }
        None => task.title.clone(),
    };

    let priority = match input.priority {
        Some(ref label) => parse_priority(label)?,
        None => TaskPriority::from_id(task.priority_id).unwrap_or(TaskPriority::Medium),
    };

    let assigned_to = match input.assigned_to {
        Some(assignees) => {
            // Reassignment may not empty the set.
            validate_assignees(&state, &assignees).await?;
            assignees
        }
        None => task.assigned_to.clone(),
    };

    let checklist: Vec<ChecklistItem> = match input.checklist {
        Some(items) => items
            .into_iter()
            .map(|item| ChecklistItem {
                text: item.text,
                done: item.done,
            })
            .collect(),
        None => task.checklist.0.clone(),
    };

    let prior_status = stored_status(&task)?;
    let next_status = derive_status(&checklist, prior_status);
    let completed_at =
        completion_timestamp(prior_status, next_status, task.completed_at, Utc::now());

    let changes = TaskChanges {
        title,
        description: input.description.unwrap_or_else(|| task.description.clone()),
        priority_id: priority.id(),
        status_id: next_status.id(),
        due_date: input.due_date.unwrap_or(task.due_date),
        assigned_to,
        checklist,
        attachments: input.attachments.unwrap_or_else(|| task.attachments.clone()),
        completed_at,
    };

    let updated = TaskRepo::apply_update(&mut *tx, id, &changes)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::NotFound { entity: "Task", id }))?;

    tx.commit().await?;

    tracing::info!(task_id = id, user_id = auth.user_id, "Task updated");

    Ok(Json(DataResponse {
        data: updated.into(),
    }))
}

/// DELETE /api/v1/tasks/{id}
///
/// Remove a task (admin only).
pub async fn delete_task(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let removed = TaskRepo::delete(&state.pool, id).await?;
    if !removed {
        return Err(AppError::Core(CoreError::NotFound { entity: "Task", id }));
    }

    tracing::info!(task_id = id, user_id = admin.user_id, "Task deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/tasks/{id}/status
///
/// Direct status transition (owner or admin). Entering Completed is
/// guarded by the checklist; leaving Completed clears `completed_at`.
pub async fn update_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateStatusRequest>,
) -> AppResult<Json<DataResponse<TaskResponse>>> {
    let requested = parse_status(&input.status)?;

    let mut tx = state.pool.begin().await?;

    let task = TaskRepo::find_for_update(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::NotFound { entity: "Task", id }))?;

    ensure_owner_or_admin(&auth, &task)?;

    check_status_override(&task.checklist, requested).map_err(AppError::Core)?;

    let prior_status = stored_status(&task)?;
    let completed_at =
        completion_timestamp(prior_status, requested, task.completed_at, Utc::now());

    let updated = TaskRepo::set_status(&mut *tx, id, requested.id(), completed_at)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::NotFound { entity: "Task", id }))?;

    tx.commit().await?;

    tracing::info!(
        task_id = id,
        user_id = auth.user_id,
        status = requested.label(),
        "Task status updated"
    );

    Ok(Json(DataResponse {
        data: updated.into(),
    }))
}

/// PUT /api/v1/tasks/{id}/todo
///
/// Replace the checklist completion flags (owner or admin). Item text
/// and order are fixed here; only `done` moves. Status and
/// `completed_at` are re-derived from the result.
pub async fn update_checklist(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateChecklistRequest>,
) -> AppResult<Json<DataResponse<TaskResponse>>> {
    let mut tx = state.pool.begin().await?;

    let task = TaskRepo::find_for_update(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::NotFound { entity: "Task", id }))?;

    ensure_owner_or_admin(&auth, &task)?;

    if input.checklist.len() != task.checklist.len() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "checklist has {} items but {} flags were provided",
            task.checklist.len(),
            input.checklist.len()
        ))));
    }

    let checklist: Vec<ChecklistItem> = task
        .checklist
        .0
        .iter()
        .zip(input.checklist.iter())
        .map(|(item, flag)| ChecklistItem {
            text: item.text.clone(),
            done: flag.done,
        })
        .collect();

    let prior_status = stored_status(&task)?;
    let next_status = derive_status(&checklist, prior_status);
    let completed_at =
        completion_timestamp(prior_status, next_status, task.completed_at, Utc::now());

    let updated = TaskRepo::set_checklist(&mut *tx, id, &checklist, next_status.id(), completed_at)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::NotFound { entity: "Task", id }))?;

    tx.commit().await?;

    tracing::info!(
        task_id = id,
        user_id = auth.user_id,
        status = next_status.label(),
        "Task checklist updated"
    );

    Ok(Json(DataResponse {
        data: updated.into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn parse_status_accepts_known_labels() {
        assert_matches!(parse_status("Pending"), Ok(TaskStatus::Pending));
        assert_matches!(parse_status("InProgress"), Ok(TaskStatus::InProgress));
        assert_matches!(parse_status("Completed"), Ok(TaskStatus::Completed));
    }

    #[test]
    fn parse_status_rejects_unknown_labels() {
        let err = parse_status("Done").unwrap_err();
        assert_matches!(err, AppError::Core(CoreError::Validation(_)));
    }

    #[test]
    fn parse_priority_rejects_unknown_labels() {
        assert_matches!(parse_priority("High"), Ok(TaskPriority::High));
        let err = parse_priority("Critical").unwrap_err();
        assert_matches!(err, AppError::Core(CoreError::Validation(_)));
    }

    #[test]
    fn label_fallback_for_corrupt_ids() {
        assert_eq!(status_label(3), "Completed");
        assert_eq!(status_label(99), "Unknown");
        assert_eq!(priority_label(1), "Low");
        assert_eq!(priority_label(0), "Unknown");
    }

    #[test]
    fn present_fields_reflects_the_patch() {
        let patch = UpdateTaskRequest {
            title: Some("t".into()),
            description: None,
            priority: None,
            due_date: None,
            assigned_to: None,
            checklist: Some(vec![]),
            attachments: None,
            status: Some("Completed".into()),
        };
        assert_eq!(
            patch.present_fields(),
            vec![TaskField::Title, TaskField::Checklist, TaskField::Status]
        );
    }
}
