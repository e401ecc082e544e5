//! Route definitions for the `/tasks` resource.
//!
//! The dashboard routes live under `/tasks` and are registered before
//! the `/{id}` matcher so they resolve as literal segments.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::{dashboard, tasks};
use crate::state::AppState;

/// Task routes mounted at `/tasks`.
///
/// ```text
/// GET    /dashboard-data        -> dashboard_data (admin only)
/// GET    /user-dashboard-data   -> user_dashboard_data
/// GET    /                      -> list_tasks (role-scoped)
/// POST   /                      -> create_task (admin only)
/// GET    /{id}                  -> get_task (ownership-checked)
/// PUT    /{id}                  -> update_task (field scope by role)
/// DELETE /{id}                  -> delete_task (admin only)
/// PUT    /{id}/status           -> update_status (ownership-checked)
/// PUT    /{id}/todo             -> update_checklist (ownership-checked)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard-data", get(dashboard::dashboard_data))
        .route("/user-dashboard-data", get(dashboard::user_dashboard_data))
        .route("/", get(tasks::list_tasks).post(tasks::create_task))
        .route(
            "/{id}",
            get(tasks::get_task)
                .put(tasks::update_task)
                .delete(tasks::delete_task),
        )
        .route("/{id}/status", put(tasks::update_status))
        .route("/{id}/todo", put(tasks::update_checklist))
}
