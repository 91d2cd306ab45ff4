/// Task categories
///
/// A category is a named, colored label owned by one user. Names are
/// unique per owner (case-sensitive). Deleting a category detaches it from
/// every task first; tasks are never deleted with their category.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE task_categories (
///     id UUID PRIMARY KEY,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(50) NOT NULL,
///     color VARCHAR(20) NOT NULL DEFAULT '#007bff',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT task_categories_user_id_name_key UNIQUE (user_id, name)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Color given to categories created without one
pub const DEFAULT_CATEGORY_COLOR: &str = "#007bff";

/// Category record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaskCategory {
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Unique among the owner's categories
    pub name: String,

    /// Display hint, free-form (usually a CSS hex color)
    pub color: String,

    pub created_at: DateTime<Utc>,
}

/// Input for inserting a category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateCategory {
    pub user_id: Uuid,
    pub name: String,
    pub color: String,
}

impl CreateCategory {
    /// Builds the insert input, falling back to the default color when
    /// `color` is absent or blank
    pub fn new(user_id: Uuid, name: impl Into<String>, color: Option<&str>) -> Self {
        let color = color
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CATEGORY_COLOR);

        Self {
            user_id,
            name: name.into(),
            color: color.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_category_default_color() {
        let user_id = Uuid::new_v4();

        let data = CreateCategory::new(user_id, "Work", None);
        assert_eq!(data.color, DEFAULT_CATEGORY_COLOR);

        let data = CreateCategory::new(user_id, "Work", Some("  "));
        assert_eq!(data.color, DEFAULT_CATEGORY_COLOR);
    }

    #[test]
    fn test_create_category_keeps_color() {
        let data = CreateCategory::new(Uuid::new_v4(), "Health", Some("#17a2b8"));
        assert_eq!(data.name, "Health");
        assert_eq!(data.color, "#17a2b8");
    }
}
