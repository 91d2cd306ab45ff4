/// Task list filters
///
/// Filters combine with AND; an absent filter matches everything. The same
/// filter is evaluated in SQL by the PostgreSQL store and in memory by
/// [`TaskFilter::matches`].

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TaskError;
use crate::models::{Priority, Task, TaskStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub category_id: Option<Uuid>,
}

impl TaskFilter {
    pub fn by_status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Builds a filter from query string values
    ///
    /// Blank values are treated as absent.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an unknown status or priority or a
    /// malformed category id.
    pub fn parse(
        status: Option<&str>,
        priority: Option<&str>,
        category_id: Option<&str>,
    ) -> Result<Self, TaskError> {
        let status = non_blank(status)
            .map(str::parse::<TaskStatus>)
            .transpose()?;
        let priority = non_blank(priority)
            .map(str::parse::<Priority>)
            .transpose()?;
        let category_id = non_blank(category_id)
            .map(|raw| {
                Uuid::parse_str(raw)
                    .map_err(|_| TaskError::validation(format!("Invalid category_id: '{raw}'")))
            })
            .transpose()?;

        Ok(Self {
            status,
            priority,
            category_id,
        })
    }

    pub fn matches(&self, task: &Task) -> bool {
        self.status.map_or(true, |s| task.status == s)
            && self.priority.map_or(true, |p| task.priority == p)
            && self.category_id.map_or(true, |c| task.category_id == Some(c))
    }
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::tests::sample_task;

    #[test]
    fn test_empty_filter_matches_all() {
        let filter = TaskFilter::default();
        assert!(filter.matches(&sample_task()));
    }

    #[test]
    fn test_filters_are_and_combined() {
        let category = Uuid::new_v4();
        let mut task = sample_task();
        task.priority = Priority::High;
        task.category_id = Some(category);

        let filter = TaskFilter {
            status: Some(TaskStatus::Pending),
            priority: Some(Priority::High),
            category_id: Some(category),
        };
        assert!(filter.matches(&task));

        let filter = TaskFilter {
            priority: Some(Priority::Low),
            ..filter
        };
        assert!(!filter.matches(&task));
    }

    #[test]
    fn test_category_filter_excludes_uncategorized() {
        let filter = TaskFilter {
            category_id: Some(Uuid::new_v4()),
            ..Default::default()
        };
        assert!(!filter.matches(&sample_task()));
    }

    #[test]
    fn test_parse() {
        let id = Uuid::new_v4();
        let filter =
            TaskFilter::parse(Some("completed"), Some(""), Some(id.to_string().as_str())).unwrap();

        assert_eq!(filter.status, Some(TaskStatus::Completed));
        assert_eq!(filter.priority, None);
        assert_eq!(filter.category_id, Some(id));
    }

    #[test]
    fn test_parse_rejects_unknown_values() {
        assert!(TaskFilter::parse(Some("done"), None, None).is_err());
        assert!(TaskFilter::parse(None, Some("urgent"), None).is_err());
        assert!(TaskFilter::parse(None, None, Some("42")).is_err());
    }
}
