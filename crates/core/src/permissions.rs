//! Authorization decision functions: the per-field update permission
//! table and the owner-or-admin check.
//!
//! Handlers consult these before touching the store, so a denied request
//! never causes a partial write. The table is data, not branching logic,
//! to keep the authorization contract auditable in one place.

use crate::roles::{ROLE_ADMIN, ROLE_MEMBER};
use crate::types::DbId;

/// A patchable field on a task, as named by the general update operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskField {
    Title,
    Description,
    Priority,
    DueDate,
    AssignedTo,
    Checklist,
    Attachments,
    /// The raw status field. Not editable through the general update by
    /// any role; status moves through the dedicated status operation or
    /// checklist derivation.
    Status,
}

impl TaskField {
    /// The field name as it appears in request payloads.
    pub fn name(self) -> &'static str {
        match self {
            TaskField::Title => "title",
            TaskField::Description => "description",
            TaskField::Priority => "priority",
            TaskField::DueDate => "due_date",
            TaskField::AssignedTo => "assigned_to",
            TaskField::Checklist => "checklist",
            TaskField::Attachments => "attachments",
            TaskField::Status => "status",
        }
    }
}

/// Fields an admin may patch through the general update.
const ADMIN_EDITABLE: &[TaskField] = &[
    TaskField::Title,
    TaskField::Description,
    TaskField::Priority,
    TaskField::DueDate,
    TaskField::AssignedTo,
    TaskField::Checklist,
    TaskField::Attachments,
];

/// Fields a member may patch through the general update.
const MEMBER_EDITABLE: &[TaskField] = &[TaskField::Checklist];

/// Whether `role` may patch `field` through the general update.
pub fn role_may_edit(role: &str, field: TaskField) -> bool {
    let table = match role {
        ROLE_ADMIN => ADMIN_EDITABLE,
        ROLE_MEMBER => MEMBER_EDITABLE,
        _ => return false,
    };
    table.contains(&field)
}

/// The first field in `fields` that `role` may not edit, if any.
///
/// Used to reject a patch atomically before anything is applied.
pub fn first_denied_field(role: &str, fields: &[TaskField]) -> Option<TaskField> {
    fields
        .iter()
        .copied()
        .find(|&field| !role_may_edit(role, field))
}

/// Owner-or-admin check: admins may act on any task, members only on
/// tasks they are assigned to.
pub fn is_owner_or_admin(role: &str, user_id: DbId, assigned_to: &[DbId]) -> bool {
    role == ROLE_ADMIN || assigned_to.contains(&user_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_may_edit_everything_except_raw_status() {
        for field in [
            TaskField::Title,
            TaskField::Description,
            TaskField::Priority,
            TaskField::DueDate,
            TaskField::AssignedTo,
            TaskField::Checklist,
            TaskField::Attachments,
        ] {
            assert!(role_may_edit(ROLE_ADMIN, field), "{:?}", field);
        }
        assert!(!role_may_edit(ROLE_ADMIN, TaskField::Status));
    }

    #[test]
    fn member_may_edit_only_the_checklist() {
        assert!(role_may_edit(ROLE_MEMBER, TaskField::Checklist));
        for field in [
            TaskField::Title,
            TaskField::Description,
            TaskField::Priority,
            TaskField::DueDate,
            TaskField::AssignedTo,
            TaskField::Attachments,
            TaskField::Status,
        ] {
            assert!(!role_may_edit(ROLE_MEMBER, field), "{:?}", field);
        }
    }

    #[test]
    fn unknown_roles_may_edit_nothing() {
        assert!(!role_may_edit("viewer", TaskField::Checklist));
    }

    #[test]
    fn first_denied_field_reports_the_violation() {
        let patch = [TaskField::Checklist, TaskField::Title];
        assert_eq!(
            first_denied_field(ROLE_MEMBER, &patch),
            Some(TaskField::Title)
        );
        assert_eq!(first_denied_field(ROLE_ADMIN, &patch), None);
        assert_eq!(first_denied_field(ROLE_MEMBER, &[TaskField::Checklist]), None);
    }

    #[test]
    fn owner_or_admin_check() {
        // Admins pass regardless of assignment.
        assert!(is_owner_or_admin(ROLE_ADMIN, 7, &[1, 2]));
        // Assigned member passes.
        assert!(is_owner_or_admin(ROLE_MEMBER, 2, &[1, 2]));
        // Unassigned member is rejected.
        assert!(!is_owner_or_admin(ROLE_MEMBER, 3, &[1, 2]));
    }

    #[test]
    fn admins_may_be_assignees() {
        // Assignment policy: an admin id in assigned_to is a valid owner.
        assert!(is_owner_or_admin(ROLE_ADMIN, 1, &[1]));
        assert!(is_owner_or_admin(ROLE_MEMBER, 1, &[1]));
    }
}
