pub mod auth;
pub mod health;
pub mod tasks;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                   register (public)
/// /auth/login                      login (public)
/// /auth/profile                    get, update own profile
///
/// /users                           member directory with task counts (admin)
/// /users/{id}                      get user
///
/// /tasks/dashboard-data            global dashboard (admin)
/// /tasks/user-dashboard-data       own dashboard (any role)
/// /tasks                           list (role-scoped), create (admin)
/// /tasks/{id}                      get, update, delete
/// /tasks/{id}/status               direct status transition
/// /tasks/{id}/todo                 checklist completion flags
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/tasks", tasks::router())
}
