//! Checklist-derived task status rules.
//!
//! A non-empty checklist is the source of truth for completion: the task
//! status and `completed_at` timestamp are recomputed from the checklist
//! whenever it changes, and a direct transition into Completed is only
//! allowed when the checklist permits it. All create/update paths funnel
//! through [`derive_status`] so the rule lives in exactly one place.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::status::TaskStatus;
use crate::types::Timestamp;

/// A single checklist entry on a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub text: String,
    pub done: bool,
}

/// True when the checklist is non-empty and every item is done.
pub fn all_done(checklist: &[ChecklistItem]) -> bool {
    !checklist.is_empty() && checklist.iter().all(|item| item.done)
}

/// Recompute a task's status from its checklist.
///
/// - Non-empty and fully done: Completed.
/// - Non-empty with open items: a previously Completed task falls back to
///   InProgress; otherwise the prior status is kept.
/// - Empty checklist: the prior status is kept (an explicit status change
///   is the only way to complete a checklist-less task).
pub fn derive_status(checklist: &[ChecklistItem], prior: TaskStatus) -> TaskStatus {
    if checklist.is_empty() {
        return prior;
    }
    if all_done(checklist) {
        TaskStatus::Completed
    } else if prior == TaskStatus::Completed {
        TaskStatus::InProgress
    } else {
        prior
    }
}

/// Compute the `completed_at` value for a status transition.
///
/// Set exactly once when entering Completed (a repeat application keeps
/// the original timestamp), cleared when leaving Completed.
pub fn completion_timestamp(
    prior: TaskStatus,
    next: TaskStatus,
    prior_completed_at: Option<Timestamp>,
    now: Timestamp,
) -> Option<Timestamp> {
    match next {
        TaskStatus::Completed if prior == TaskStatus::Completed => prior_completed_at,
        TaskStatus::Completed => Some(now),
        _ => None,
    }
}

/// Guard for a direct status change (the `/status` operation).
///
/// Entering Completed with a non-empty, not-fully-done checklist is
/// rejected; the checklist must be worked off first. Every other
/// transition among the three states is free-form.
pub fn check_status_override(
    checklist: &[ChecklistItem],
    requested: TaskStatus,
) -> Result<(), CoreError> {
    if requested == TaskStatus::Completed && !checklist.is_empty() && !all_done(checklist) {
        return Err(CoreError::Validation("checklist incomplete".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn item(text: &str, done: bool) -> ChecklistItem {
        ChecklistItem {
            text: text.into(),
            done,
        }
    }

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap()
    }

    #[test]
    fn all_items_done_completes_the_task() {
        let checklist = [item("write", true), item("review", true)];
        assert_eq!(
            derive_status(&checklist, TaskStatus::InProgress),
            TaskStatus::Completed
        );
        assert_eq!(
            derive_status(&checklist, TaskStatus::Pending),
            TaskStatus::Completed
        );
    }

    #[test]
    fn unchecking_an_item_reverts_completed_to_in_progress() {
        let checklist = [item("write", true), item("review", false)];
        assert_eq!(
            derive_status(&checklist, TaskStatus::Completed),
            TaskStatus::InProgress
        );
    }

    #[test]
    fn open_items_keep_a_non_completed_status() {
        let checklist = [item("write", false)];
        assert_eq!(
            derive_status(&checklist, TaskStatus::Pending),
            TaskStatus::Pending
        );
        assert_eq!(
            derive_status(&checklist, TaskStatus::InProgress),
            TaskStatus::InProgress
        );
    }

    #[test]
    fn empty_checklist_preserves_prior_status() {
        for prior in [
            TaskStatus::Pending,
            TaskStatus::InProgress,
            TaskStatus::Completed,
        ] {
            assert_eq!(derive_status(&[], prior), prior);
        }
    }

    #[test]
    fn completion_timestamp_is_set_once() {
        let first = completion_timestamp(TaskStatus::InProgress, TaskStatus::Completed, None, now());
        assert_eq!(first, Some(now()));

        // A second application of an already-complete state keeps the
        // original timestamp (idempotence).
        let later = now() + chrono::Duration::hours(2);
        let second =
            completion_timestamp(TaskStatus::Completed, TaskStatus::Completed, first, later);
        assert_eq!(second, first);
    }

    #[test]
    fn leaving_completed_clears_the_timestamp() {
        let cleared = completion_timestamp(
            TaskStatus::Completed,
            TaskStatus::InProgress,
            Some(now()),
            now(),
        );
        assert_eq!(cleared, None);

        let pending =
            completion_timestamp(TaskStatus::Completed, TaskStatus::Pending, Some(now()), now());
        assert_eq!(pending, None);
    }

    #[test]
    fn override_to_completed_requires_full_checklist() {
        let open = [item("x", false)];
        let err = check_status_override(&open, TaskStatus::Completed).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        let done = [item("x", true)];
        assert!(check_status_override(&done, TaskStatus::Completed).is_ok());
    }

    #[test]
    fn override_on_empty_checklist_is_allowed() {
        assert!(check_status_override(&[], TaskStatus::Completed).is_ok());
    }

    #[test]
    fn non_completed_overrides_are_unrestricted() {
        let open = [item("x", false)];
        assert!(check_status_override(&open, TaskStatus::Pending).is_ok());
        assert!(check_status_override(&open, TaskStatus::InProgress).is_ok());
    }
}
