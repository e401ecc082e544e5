//! Task status and priority enums mapping to SMALLINT columns.
//!
//! The database stores the numeric id; the API speaks the label. Each
//! enum variant's discriminant matches the values referenced by the
//! CHECK constraints in the `tasks` migration.

/// Status/priority ID type matching SMALLINT in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:literal => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Return the database id.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Return the API-facing label.
            pub fn label(self) -> &'static str {
                match self {
                    $( $name::$variant => $label ),+
                }
            }

            /// Resolve a database id back to the enum.
            pub fn from_id(id: StatusId) -> Option<Self> {
                match id {
                    $( x if x == $val => Some($name::$variant), )+
                    _ => None,
                }
            }

            /// Parse an API-facing label (exact match).
            pub fn from_label(label: &str) -> Option<Self> {
                match label {
                    $( $label => Some($name::$variant), )+
                    _ => None,
                }
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }
    };
}

define_status_enum! {
    /// Task lifecycle status. Completed is re-enterable; there is no
    /// terminal state.
    TaskStatus {
        Pending = 1 => "Pending",
        InProgress = 2 => "InProgress",
        Completed = 3 => "Completed",
    }
}

define_status_enum! {
    /// Task priority.
    TaskPriority {
        Low = 1 => "Low",
        Medium = 2 => "Medium",
        High = 3 => "High",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_label_round_trip() {
        for status in [
            TaskStatus::Pending,
            TaskStatus::InProgress,
            TaskStatus::Completed,
        ] {
            assert_eq!(TaskStatus::from_label(status.label()), Some(status));
            assert_eq!(TaskStatus::from_id(status.id()), Some(status));
        }
    }

    #[test]
    fn priority_label_round_trip() {
        for priority in [TaskPriority::Low, TaskPriority::Medium, TaskPriority::High] {
            assert_eq!(TaskPriority::from_label(priority.label()), Some(priority));
            assert_eq!(TaskPriority::from_id(priority.id()), Some(priority));
        }
    }

    #[test]
    fn unknown_values_are_rejected() {
        assert_eq!(TaskStatus::from_label("Done"), None);
        assert_eq!(TaskStatus::from_id(0), None);
        assert_eq!(TaskPriority::from_label("urgent"), None);
        assert_eq!(TaskPriority::from_id(9), None);
    }
}
