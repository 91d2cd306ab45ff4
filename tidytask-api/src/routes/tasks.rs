/// Task endpoints
///
/// - `GET    /api/tasks` - List tasks, newest first (`?status=&priority=&category_id=`)
/// - `POST   /api/tasks` - Create a task
/// - `GET    /api/tasks/:id` - Get one task
/// - `PUT    /api/tasks/:id` - Update the fields present in the body
/// - `DELETE /api/tasks/:id` - Delete a task
/// - `POST   /api/tasks/:id/toggle` - Advance pending → in_progress → completed → pending
/// - `POST   /api/tasks/clear-completed` - Delete every completed task
///
/// The API uses the strict priority policy: an unknown priority is a 400.
/// A task owned by someone else is reported exactly like a missing one.

use crate::{
    app::AppState,
    error::ApiResult,
    routes::{parse_id, MessageResponse},
};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tidytask_shared::{
    auth::AuthContext,
    domain::{PriorityPolicy, TaskFilter, TaskInput, TaskPatch},
    models::{Priority, Task, TaskStatus},
};
use uuid::Uuid;

/// `due_date` wire format
const DUE_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub status: TaskStatus,
    pub due_date: Option<String>,
    pub completed_at: Option<String>,
    pub category_id: Option<Uuid>,
    pub is_overdue: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl TaskResponse {
    pub fn new(task: &Task, now: NaiveDateTime) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            description: task.description.clone(),
            priority: task.priority,
            status: task.status,
            due_date: task.due_date.map(|d| d.format(DUE_DATE_FORMAT).to_string()),
            completed_at: task.completed_at.map(|d| d.to_rfc3339()),
            category_id: task.category_id,
            is_overdue: task.is_overdue(now),
            created_at: task.created_at.to_rfc3339(),
            updated_at: task.updated_at.to_rfc3339(),
        }
    }
}

impl From<&Task> for TaskResponse {
    fn from(task: &Task) -> Self {
        Self::new(task, Utc::now().naive_utc())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TaskQuery {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub category_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TaskListResponse {
    pub tasks: Vec<TaskResponse>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct ClearCompletedResponse {
    pub message: String,
    pub deleted: u64,
}

/// List the caller's tasks
///
/// # Errors
///
/// - `400 Bad Request`: unknown status or priority, malformed category id
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Query(query): Query<TaskQuery>,
) -> ApiResult<Json<TaskListResponse>> {
    let filter = TaskFilter::parse(
        query.status.as_deref(),
        query.priority.as_deref(),
        query.category_id.as_deref(),
    )?;

    let tasks = state.tasks.list_tasks(&ctx, &filter).await?;
    let now = Utc::now().naive_utc();
    let tasks: Vec<TaskResponse> = tasks.iter().map(|t| TaskResponse::new(t, now)).collect();

    Ok(Json(TaskListResponse {
        count: tasks.len(),
        tasks,
    }))
}

/// Create a task
///
/// ```text
/// POST /api/tasks
/// Content-Type: application/json
///
/// {
///   "title": "Write report",
///   "priority": "high",
///   "due_date": "2024-01-31T17:30",
///   "category_id": "uuid"
/// }
/// ```
///
/// A category that does not belong to the caller is dropped, not rejected.
///
/// # Errors
///
/// - `400 Bad Request`: missing title, unknown priority, malformed due date
pub async fn create_task(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    payload: Result<Json<TaskInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    let Json(input) = payload?;

    let task = state
        .tasks
        .create_task(&ctx, input, PriorityPolicy::Strict)
        .await?;

    Ok((StatusCode::CREATED, Json(TaskResponse::from(&task))))
}

pub async fn get_task(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<TaskResponse>> {
    let task = state.tasks.get_task(&ctx, parse_id(&id, "Task")?).await?;
    Ok(Json(TaskResponse::from(&task)))
}

/// Update a task
///
/// Only fields present in the body change; `null` clears `description`,
/// `due_date` and `category_id`. Either every field is applied or none.
///
/// # Errors
///
/// - `400 Bad Request`: empty body, invalid value in any field
/// - `404 Not Found`: unknown task
pub async fn update_task(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
    payload: Result<Json<TaskPatch>, JsonRejection>,
) -> ApiResult<Json<TaskResponse>> {
    let id = parse_id(&id, "Task")?;
    let Json(patch) = payload?;

    let task = state
        .tasks
        .update_task(&ctx, id, patch, PriorityPolicy::Strict)
        .await?;

    Ok(Json(TaskResponse::from(&task)))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    state.tasks.delete_task(&ctx, parse_id(&id, "Task")?).await?;
    Ok(Json(MessageResponse::new("Task deleted successfully")))
}

pub async fn toggle_task(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<TaskResponse>> {
    let task = state.tasks.toggle_task(&ctx, parse_id(&id, "Task")?).await?;
    Ok(Json(TaskResponse::from(&task)))
}

pub async fn clear_completed(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> ApiResult<Json<ClearCompletedResponse>> {
    let deleted = state.tasks.clear_completed(&ctx).await?;

    Ok(Json(ClearCompletedResponse {
        message: format!("Deleted {deleted} completed tasks"),
        deleted,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn task(due: Option<NaiveDateTime>, status: TaskStatus) -> Task {
        let now = Utc::now();
        Task {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            category_id: None,
            title: "Write report".to_string(),
            description: None,
            priority: Priority::High,
            status,
            due_date: due,
            completed_at: (status == TaskStatus::Completed).then_some(now),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_due_date_format() {
        let due = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let response = TaskResponse::new(&task(Some(due), TaskStatus::Pending), due);

        assert_eq!(response.due_date.as_deref(), Some("2024-01-01T00:00:00"));
        assert!(response.completed_at.is_none());
        assert!(!response.is_overdue);
    }

    #[test]
    fn test_overdue_flag() {
        let now = Utc::now().naive_utc();
        let past = now - Duration::days(1);

        assert!(TaskResponse::new(&task(Some(past), TaskStatus::InProgress), now).is_overdue);
        assert!(!TaskResponse::new(&task(Some(past), TaskStatus::Completed), now).is_overdue);
        assert!(!TaskResponse::new(&task(None, TaskStatus::Pending), now).is_overdue);
    }

    #[test]
    fn test_serialized_enums() {
        let value = serde_json::to_value(TaskResponse::from(&task(None, TaskStatus::InProgress))).unwrap();
        assert_eq!(value["status"], "in_progress");
        assert_eq!(value["priority"], "high");
        assert!(value["due_date"].is_null());
    }
}
