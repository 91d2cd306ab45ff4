/// Template view models
///
/// Tasks and categories are flattened into display-ready values before they
/// reach a template: formatted dates, labels and a sanitized color.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::HashMap;
use tidytask_shared::{
    domain::{due_date::format_for_input, TaskFilter},
    models::{Priority, Task, TaskCategory, TaskStatus, DEFAULT_CATEGORY_COLOR},
};
use uuid::Uuid;

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone, Serialize)]
pub struct CategoryView {
    pub id: Uuid,
    pub name: String,
    pub color: String,
}

impl From<&TaskCategory> for CategoryView {
    fn from(category: &TaskCategory) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
            color: safe_color(&category.color).to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskView {
    pub id: Uuid,
    pub title: String,
    /// Empty when the task has none
    pub description: String,
    pub priority: Priority,
    pub status: TaskStatus,
    pub status_label: &'static str,
    pub next_status_label: &'static str,
    pub due_display: String,
    /// `datetime-local` value
    pub due_input: String,
    pub is_overdue: bool,
    pub category_id: String,
    pub category: Option<CategoryView>,
    pub created_display: String,
    pub completed_display: String,
}

impl TaskView {
    pub fn new(task: &Task, categories: &HashMap<Uuid, CategoryView>, now: NaiveDateTime) -> Self {
        let category = task
            .category_id
            .and_then(|id| categories.get(&id))
            .cloned();

        Self {
            id: task.id,
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            priority: task.priority,
            status: task.status,
            status_label: task.status.label(),
            next_status_label: task.status.next().label(),
            due_display: task
                .due_date
                .map(|d| d.format(DISPLAY_FORMAT).to_string())
                .unwrap_or_default(),
            due_input: task.due_date.as_ref().map(format_for_input).unwrap_or_default(),
            is_overdue: task.is_overdue(now),
            category_id: task.category_id.map(|id| id.to_string()).unwrap_or_default(),
            category,
            created_display: task.created_at.format(DISPLAY_FORMAT).to_string(),
            completed_display: task
                .completed_at
                .map(|d| d.format(DISPLAY_FORMAT).to_string())
                .unwrap_or_default(),
        }
    }
}

/// Categories keyed by id, for resolving task references
pub fn category_index(categories: &[TaskCategory]) -> HashMap<Uuid, CategoryView> {
    categories
        .iter()
        .map(|c| (c.id, CategoryView::from(c)))
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusOption {
    pub value: &'static str,
    pub label: &'static str,
}

pub fn status_options() -> Vec<StatusOption> {
    TaskStatus::ALL
        .iter()
        .map(|s| StatusOption {
            value: s.as_str(),
            label: s.label(),
        })
        .collect()
}

pub fn priority_options() -> Vec<&'static str> {
    Priority::ALL.iter().map(Priority::as_str).collect()
}

/// Current filter as plain strings, empty when unset
#[derive(Debug, Clone, Default, Serialize)]
pub struct FilterView {
    pub status: String,
    pub priority: String,
    pub category_id: String,
}

impl From<&TaskFilter> for FilterView {
    fn from(filter: &TaskFilter) -> Self {
        Self {
            status: filter.status.map(|s| s.as_str().to_string()).unwrap_or_default(),
            priority: filter.priority.map(|p| p.as_str().to_string()).unwrap_or_default(),
            category_id: filter.category_id.map(|c| c.to_string()).unwrap_or_default(),
        }
    }
}

impl FilterView {
    /// Dashboard URL for `page` keeping this filter
    pub fn page_url(&self, page: usize) -> String {
        let mut url = format!("/tasks/?page={page}");
        for (key, value) in [
            ("status", &self.status),
            ("priority", &self.priority),
            ("category_id", &self.category_id),
        ] {
            if !value.is_empty() {
                url.push_str(&format!("&{key}={value}"));
            }
        }
        url
    }
}

/// Colors end up in a `style` attribute, so only hex codes and plain color
/// names are passed through
pub fn safe_color(color: &str) -> &str {
    let hex = color
        .strip_prefix('#')
        .is_some_and(|h| matches!(h.len(), 3 | 6 | 8) && h.chars().all(|c| c.is_ascii_hexdigit()));
    let named = !color.is_empty() && color.len() <= 20 && color.chars().all(|c| c.is_ascii_alphabetic());

    if hex || named {
        color
    } else {
        DEFAULT_CATEGORY_COLOR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_color() {
        assert_eq!(safe_color("#dc3545"), "#dc3545");
        assert_eq!(safe_color("#fff"), "#fff");
        assert_eq!(safe_color("teal"), "teal");
        assert_eq!(safe_color("red; background: url(x)"), DEFAULT_CATEGORY_COLOR);
        assert_eq!(safe_color("#12345g"), DEFAULT_CATEGORY_COLOR);
        assert_eq!(safe_color(""), DEFAULT_CATEGORY_COLOR);
    }

    #[test]
    fn test_page_url_keeps_filter() {
        let filter = FilterView {
            status: "pending".to_string(),
            ..Default::default()
        };
        assert_eq!(filter.page_url(2), "/tasks/?page=2&status=pending");
        assert_eq!(FilterView::default().page_url(1), "/tasks/?page=1");
    }
}
