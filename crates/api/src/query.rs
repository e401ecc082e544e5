//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Query parameters for the task list endpoint
/// (`?status=&priority=&search=`).
///
/// `status` and `priority` are API-facing labels (e.g. `InProgress`,
/// `High`); unknown labels are rejected with a validation error rather
/// than silently matching nothing.
#[derive(Debug, Default, Deserialize)]
pub struct TaskListQuery {
    pub status: Option<String>,
    pub priority: Option<String>,
    /// Case-insensitive substring match over task titles.
    pub search: Option<String>,
}
