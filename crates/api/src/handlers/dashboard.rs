//! Handlers for the dashboard endpoints.
//!
//! Both endpoints share one aggregation path: a single consistent
//! snapshot from the repository, zero-filled into typed count structs
//! here. Nothing is cached; every request reflects the latest writes.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use taskpulse_core::status::{TaskPriority, TaskStatus};
use taskpulse_db::repositories::dashboard_repo::DashboardSnapshot;
use taskpulse_db::repositories::DashboardRepo;

use crate::error::AppResult;
use crate::handlers::tasks::TaskResponse;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Number of tasks in the `recent_tasks` list.
const RECENT_TASKS_LIMIT: i64 = 10;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Task counts per status. Always carries all three statuses, so a
/// dashboard never has to guess whether a missing key means zero.
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: i64,
    pub in_progress: i64,
    pub completed: i64,
}

/// Task counts per priority, zero-filled like [`StatusCounts`].
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct PriorityCounts {
    pub low: i64,
    pub medium: i64,
    pub high: i64,
}

/// Dashboard summary payload shared by the global and per-user views.
#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    pub counts_by_status: StatusCounts,
    pub counts_by_priority: PriorityCounts,
    /// Tasks past due and not Completed.
    pub overdue_count: i64,
    /// Most recent tasks, newest first.
    pub recent_tasks: Vec<TaskResponse>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/tasks/dashboard-data
///
/// Global dashboard over every task in the store (admin only).
pub async fn dashboard_data(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<DashboardSummary>>> {
    let snapshot = DashboardRepo::summary(&state.pool, None, RECENT_TASKS_LIMIT).await?;
    Ok(Json(DataResponse {
        data: build_summary(snapshot),
    }))
}

/// GET /api/v1/tasks/user-dashboard-data
///
/// The caller's own dashboard: same shape, scoped to tasks assigned to
/// them. Any authenticated user.
pub async fn user_dashboard_data(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<DashboardSummary>>> {
    let snapshot =
        DashboardRepo::summary(&state.pool, Some(auth.user_id), RECENT_TASKS_LIMIT).await?;
    Ok(Json(DataResponse {
        data: build_summary(snapshot),
    }))
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// Zero-fill a raw aggregation snapshot into the response shape.
///
/// Rows with ids outside the known enums are dropped rather than
/// miscounted; the CHECK constraints make that unreachable in practice.
fn build_summary(snapshot: DashboardSnapshot) -> DashboardSummary {
    let mut counts_by_status = StatusCounts::default();
    for (status_id, count) in &snapshot.status_counts {
        match TaskStatus::from_id(*status_id) {
            Some(TaskStatus::Pending) => counts_by_status.pending = *count,
            Some(TaskStatus::InProgress) => counts_by_status.in_progress = *count,
            Some(TaskStatus::Completed) => counts_by_status.completed = *count,
            None => {}
        }
    }

    let mut counts_by_priority = PriorityCounts::default();
    for (priority_id, count) in &snapshot.priority_counts {
        match TaskPriority::from_id(*priority_id) {
            Some(TaskPriority::Low) => counts_by_priority.low = *count,
            Some(TaskPriority::Medium) => counts_by_priority.medium = *count,
            Some(TaskPriority::High) => counts_by_priority.high = *count,
            None => {}
        }
    }

    DashboardSummary {
        counts_by_status,
        counts_by_priority,
        overdue_count: snapshot.overdue_count,
        recent_tasks: snapshot
            .recent_tasks
            .into_iter()
            .map(TaskResponse::from)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(
        status_counts: Vec<(i16, i64)>,
        priority_counts: Vec<(i16, i64)>,
        overdue_count: i64,
    ) -> DashboardSnapshot {
        DashboardSnapshot {
            status_counts,
            priority_counts,
            overdue_count,
            recent_tasks: Vec::new(),
        }
    }

    #[test]
    fn empty_store_yields_all_zeroes() {
        let summary = build_summary(snapshot(vec![], vec![], 0));
        assert_eq!(summary.counts_by_status, StatusCounts::default());
        assert_eq!(summary.counts_by_priority, PriorityCounts::default());
        assert_eq!(summary.overdue_count, 0);
        assert!(summary.recent_tasks.is_empty());
    }

    #[test]
    fn partial_aggregation_rows_are_zero_filled() {
        // Only Pending and High have rows; the rest must read as zero.
        let summary = build_summary(snapshot(vec![(1, 4)], vec![(3, 2)], 1));
        assert_eq!(
            summary.counts_by_status,
            StatusCounts {
                pending: 4,
                in_progress: 0,
                completed: 0,
            }
        );
        assert_eq!(
            summary.counts_by_priority,
            PriorityCounts {
                low: 0,
                medium: 0,
                high: 2,
            }
        );
    }

    #[test]
    fn status_counts_sum_to_total() {
        let rows = vec![(1, 3), (2, 5), (3, 2)];
        let total: i64 = rows.iter().map(|(_, n)| n).sum();
        let summary = build_summary(snapshot(rows, vec![], 4));

        let counts = &summary.counts_by_status;
        assert_eq!(counts.pending + counts.in_progress + counts.completed, total);
        // Overdue tasks are never Completed, so overdue fits in the rest.
        assert!(summary.overdue_count <= total - counts.completed);
    }

    #[test]
    fn unknown_ids_are_dropped_not_miscounted() {
        let summary = build_summary(snapshot(vec![(9, 7), (2, 1)], vec![(0, 3)], 0));
        assert_eq!(
            summary.counts_by_status,
            StatusCounts {
                pending: 0,
                in_progress: 1,
                completed: 0,
            }
        );
        assert_eq!(summary.counts_by_priority, PriorityCounts::default());
    }
}
