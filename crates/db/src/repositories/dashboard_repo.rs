//! Dashboard aggregation queries.
//!
//! Each summary call runs inside a single REPEATABLE READ transaction so
//! all counts and the recent-task list come from one store snapshot.
//! Counts are computed with grouped aggregation passes, never with
//! per-user or per-status loops, and nothing is cached between calls.

use sqlx::PgPool;
use taskpulse_core::status::TaskStatus;
use taskpulse_core::types::DbId;

use crate::models::task::Task;

/// Raw aggregation output for one dashboard request. Absent statuses or
/// priorities simply have no row here; zero-filling happens at the API
/// layer.
#[derive(Debug)]
pub struct DashboardSnapshot {
    /// `(status_id, count)` pairs from a single GROUP BY pass.
    pub status_counts: Vec<(i16, i64)>,
    /// `(priority_id, count)` pairs from a single GROUP BY pass.
    pub priority_counts: Vec<(i16, i64)>,
    /// Tasks past due and not Completed.
    pub overdue_count: i64,
    /// Most recent tasks, newest first, bounded by the caller's limit.
    pub recent_tasks: Vec<Task>,
}

/// Column list shared with the task repository queries.
const COLUMNS: &str = "id, title, description, priority_id, status_id, due_date, assigned_to, \
                       created_by, checklist, attachments, created_at, updated_at, completed_at";

/// Computes dashboard summaries.
pub struct DashboardRepo;

impl DashboardRepo {
    /// Aggregate the store into a [`DashboardSnapshot`].
    ///
    /// `scope` limits the aggregation to tasks assigned to one user; the
    /// global (admin) dashboard passes `None`.
    pub async fn summary(
        pool: &PgPool,
        scope: Option<DbId>,
        recent_limit: i64,
    ) -> Result<DashboardSnapshot, sqlx::Error> {
        let scope_clause = match scope {
            Some(_) => "WHERE $1 = ANY(assigned_to)",
            None => "",
        };
        // The scoped variants bind the user id as $1; unscoped queries
        // bind nothing for the scope.
        let mut tx = pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
            .execute(&mut *tx)
            .await?;

        let status_query =
            format!("SELECT status_id, COUNT(*) FROM tasks {scope_clause} GROUP BY status_id");
        let mut q = sqlx::query_as::<_, (i16, i64)>(&status_query);
        if let Some(user_id) = scope {
            q = q.bind(user_id);
        }
        let status_counts = q.fetch_all(&mut *tx).await?;

        let priority_query =
            format!("SELECT priority_id, COUNT(*) FROM tasks {scope_clause} GROUP BY priority_id");
        let mut q = sqlx::query_as::<_, (i16, i64)>(&priority_query);
        if let Some(user_id) = scope {
            q = q.bind(user_id);
        }
        let priority_counts = q.fetch_all(&mut *tx).await?;

        let overdue_condition = "due_date < NOW() AND status_id <> ";
        let overdue_query = match scope {
            Some(_) => format!(
                "SELECT COUNT(*) FROM tasks WHERE $1 = ANY(assigned_to) AND {overdue_condition}$2"
            ),
            None => format!("SELECT COUNT(*) FROM tasks WHERE {overdue_condition}$1"),
        };
        let mut q = sqlx::query_as::<_, (i64,)>(&overdue_query);
        if let Some(user_id) = scope {
            q = q.bind(user_id);
        }
        let (overdue_count,) = q.bind(TaskStatus::Completed.id()).fetch_one(&mut *tx).await?;

        let recent_query = match scope {
            Some(_) => format!(
                "SELECT {COLUMNS} FROM tasks WHERE $1 = ANY(assigned_to) \
                 ORDER BY created_at DESC, id DESC LIMIT $2"
            ),
            None => format!(
                "SELECT {COLUMNS} FROM tasks ORDER BY created_at DESC, id DESC LIMIT $1"
            ),
        };
        let mut q = sqlx::query_as::<_, Task>(&recent_query);
        if let Some(user_id) = scope {
            q = q.bind(user_id);
        }
        let recent_tasks = q.bind(recent_limit).fetch_all(&mut *tx).await?;

        tx.commit().await?;

        Ok(DashboardSnapshot {
            status_counts,
            priority_counts,
            overdue_count,
            recent_tasks,
        })
    }
}
