/// Task model and its state rules
///
/// A task belongs to exactly one user and may carry one category of that
/// same user. Status and priority are closed enumerations backed by
/// PostgreSQL enum types.
///
/// # Status cycle
///
/// ```text
/// pending → in_progress → completed → pending
/// ```
///
/// `completed_at` is set if and only if the status is `completed`. Every
/// status change goes through [`Task::set_status`], which keeps the two
/// fields in step.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_priority AS ENUM ('low', 'medium', 'high');
/// CREATE TYPE task_status AS ENUM ('pending', 'in_progress', 'completed');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     category_id UUID REFERENCES task_categories(id),
///     title VARCHAR(200) NOT NULL,
///     description TEXT,
///     priority task_priority NOT NULL DEFAULT 'medium',
///     status task_status NOT NULL DEFAULT 'pending',
///     due_date TIMESTAMP,
///     completed_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Error returned when a string is not a member of an enumerated set
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid {kind}: '{value}'")]
pub struct ParseEnumError {
    /// Which enumeration failed to parse ("priority" or "status")
    pub kind: &'static str,

    /// The rejected input
    pub value: String,
}

/// Task priority
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Every priority, lowest first
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| ParseEnumError {
                kind: "priority",
                value: s.to_string(),
            })
    }
}

/// Task status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }

    /// Human readable label used by the dashboard
    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::InProgress => "In progress",
            TaskStatus::Completed => "Completed",
        }
    }

    /// Next status in the one-click cycle
    pub fn next(&self) -> TaskStatus {
        match self {
            TaskStatus::Pending => TaskStatus::InProgress,
            TaskStatus::InProgress => TaskStatus::Completed,
            TaskStatus::Completed => TaskStatus::Pending,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| ParseEnumError {
                kind: "status",
                value: s.to_string(),
            })
    }
}

/// Task record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Optional category, always owned by `user_id`
    pub category_id: Option<Uuid>,

    /// Non-empty title
    pub title: String,

    pub description: Option<String>,

    pub priority: Priority,

    pub status: TaskStatus,

    /// Deadline without timezone
    pub due_date: Option<NaiveDateTime>,

    /// Set iff `status == Completed`
    pub completed_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Validated input for inserting a task
///
/// Produced by [`crate::domain::input::TaskInput::validate`]. The service
/// resolves `category_id` against the owner's categories before insert.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTask {
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub due_date: Option<NaiveDateTime>,
    pub category_id: Option<Uuid>,
}

/// Validated partial update
///
/// `None` leaves a field untouched. For nullable columns `Some(None)`
/// clears the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub priority: Option<Priority>,
    pub status: Option<TaskStatus>,
    pub due_date: Option<Option<NaiveDateTime>>,
    pub category_id: Option<Option<Uuid>>,
}

impl UpdateTask {
    /// True when the update would not touch any field
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.status.is_none()
            && self.due_date.is_none()
            && self.category_id.is_none()
    }
}

impl Task {
    /// Sets the status and keeps `completed_at` consistent with it
    ///
    /// Entering `Completed` stamps `now`, leaving it clears the stamp and
    /// re-setting the current status leaves the stamp alone.
    pub fn set_status(&mut self, status: TaskStatus, now: DateTime<Utc>) {
        if status == self.status {
            return;
        }

        self.completed_at = match status {
            TaskStatus::Completed => Some(now),
            _ => None,
        };
        self.status = status;
    }

    /// Advances one step along the status cycle
    pub fn advance_status(&mut self, now: DateTime<Utc>) {
        self.set_status(self.status.next(), now);
    }

    /// Applies a validated update in memory
    pub fn apply(&mut self, changes: UpdateTask, now: DateTime<Utc>) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(priority) = changes.priority {
            self.priority = priority;
        }
        if let Some(status) = changes.status {
            self.set_status(status, now);
        }
        if let Some(due_date) = changes.due_date {
            self.due_date = due_date;
        }
        if let Some(category_id) = changes.category_id {
            self.category_id = category_id;
        }
    }

    /// Past its due date and not completed
    pub fn is_overdue(&self, now: NaiveDateTime) -> bool {
        match self.due_date {
            Some(due) => due < now && !self.is_completed(),
            None => false,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}
