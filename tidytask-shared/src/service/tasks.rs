/// Task and category operations
///
/// Every operation takes the caller's [`AuthContext`] and only ever reads or
/// writes rows owned by that caller. A row owned by someone else is
/// reported as not found, never as forbidden.
///
/// Input is validated in full before the store is touched; each operation
/// ends in at most one store mutation, so a failure leaves nothing behind.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::AuthContext;
use crate::domain::stats::overdue_tasks;
use crate::domain::{PriorityPolicy, TaskFilter, TaskInput, TaskPatch, TaskStats};
use crate::error::{StoreError, TaskError};
use crate::models::{CreateCategory, Task, TaskCategory};
use crate::store::{constraints, Store};

pub const CATEGORY_NAME_REQUIRED: &str = "Category name is required";
pub const CATEGORY_EXISTS: &str = "Category already exists";

/// Maximum category name length, matching the column size
pub const CATEGORY_NAME_MAX_LEN: usize = 50;

/// Maximum category color length, matching the column size
pub const CATEGORY_COLOR_MAX_LEN: usize = 20;

/// One page of a list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// 1-based
    pub number: usize,
    pub size: usize,
}

impl Page {
    /// Clamps `number` and `size` to at least 1
    pub fn new(number: usize, size: usize) -> Self {
        Self {
            number: number.max(1),
            size: size.max(1),
        }
    }

    fn offset(&self) -> usize {
        (self.number - 1).saturating_mul(self.size)
    }
}

/// Everything the dashboard page shows
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    /// The requested page of the (filtered) task list, newest first
    pub tasks: Vec<Task>,
    pub categories: Vec<TaskCategory>,
    /// Stats over all of the caller's tasks, ignoring filter and paging
    pub stats: TaskStats,
    pub overdue: Vec<Task>,
    pub filter: TaskFilter,
    pub page: usize,
    pub total_pages: usize,
    /// Tasks matching the filter across all pages
    pub matching: usize,
    pub generated_at: DateTime<Utc>,
}

/// Task and category operations over a [`Store`]
#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn Store>,
}

impl TaskService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// Keeps a category reference only when the caller owns it
    async fn owned_category(
        &self,
        ctx: &AuthContext,
        category_id: Option<Uuid>,
    ) -> Result<Option<Uuid>, TaskError> {
        let Some(id) = category_id else {
            return Ok(None);
        };

        match self.store.find_category(ctx.user_id, id).await? {
            Some(category) => Ok(Some(category.id)),
            None => {
                debug!(category_id = %id, "Ignoring category not owned by caller");
                Ok(None)
            }
        }
    }

    async fn find_owned_task(&self, ctx: &AuthContext, id: Uuid) -> Result<Task, TaskError> {
        self.store
            .find_task(ctx.user_id, id)
            .await?
            .ok_or(TaskError::NotFound("Task"))
    }

    /// Validates `input` and inserts a pending task
    pub async fn create_task(
        &self,
        ctx: &AuthContext,
        input: TaskInput,
        policy: PriorityPolicy,
    ) -> Result<Task, TaskError> {
        let mut data = input.validate(ctx.user_id, policy)?;
        data.category_id = self.owned_category(ctx, data.category_id).await?;

        let task = self.store.insert_task(data).await?;
        info!(task_id = %task.id, user_id = %ctx.user_id, "Task created");
        Ok(task)
    }

    pub async fn get_task(&self, ctx: &AuthContext, id: Uuid) -> Result<Task, TaskError> {
        self.find_owned_task(ctx, id).await
    }

    /// The caller's tasks matching `filter`, newest first
    pub async fn list_tasks(
        &self,
        ctx: &AuthContext,
        filter: &TaskFilter,
    ) -> Result<Vec<Task>, TaskError> {
        Ok(self.store.list_tasks(ctx.user_id, filter).await?)
    }

    /// Applies a partial update as one row write
    ///
    /// # Errors
    ///
    /// - `NotFound` when the task is missing or not the caller's
    /// - `Validation` for an empty patch or any invalid field; nothing is
    ///   written in that case
    pub async fn update_task(
        &self,
        ctx: &AuthContext,
        id: Uuid,
        patch: TaskPatch,
        policy: PriorityPolicy,
    ) -> Result<Task, TaskError> {
        let current = self.find_owned_task(ctx, id).await?;

        let mut changes = patch.validate(policy)?;
        if changes.is_empty() {
            return Err(TaskError::validation("No data provided"));
        }
        if let Some(Some(category_id)) = changes.category_id {
            changes.category_id = Some(self.owned_category(ctx, Some(category_id)).await?);
        }

        let mut task = current;
        task.apply(changes, Utc::now());
        self.save(task).await
    }

    /// Advances the task one step along pending → in progress → completed → pending
    pub async fn toggle_task(&self, ctx: &AuthContext, id: Uuid) -> Result<Task, TaskError> {
        let mut task = self.find_owned_task(ctx, id).await?;
        task.advance_status(Utc::now());

        let task = self.save(task).await?;
        debug!(task_id = %task.id, status = %task.status, "Task status toggled");
        Ok(task)
    }

    async fn save(&self, task: Task) -> Result<Task, TaskError> {
        self.store
            .save_task(&task)
            .await?
            .ok_or(TaskError::NotFound("Task"))
    }

    pub async fn delete_task(&self, ctx: &AuthContext, id: Uuid) -> Result<(), TaskError> {
        if !self.store.delete_task(ctx.user_id, id).await? {
            return Err(TaskError::NotFound("Task"));
        }
        info!(task_id = %id, user_id = %ctx.user_id, "Task deleted");
        Ok(())
    }

    /// Deletes all of the caller's completed tasks, returning how many
    pub async fn clear_completed(&self, ctx: &AuthContext) -> Result<u64, TaskError> {
        let removed = self.store.delete_completed_tasks(ctx.user_id).await?;
        info!(user_id = %ctx.user_id, removed, "Cleared completed tasks");
        Ok(removed)
    }

    pub async fn list_categories(&self, ctx: &AuthContext) -> Result<Vec<TaskCategory>, TaskError> {
        Ok(self.store.list_categories(ctx.user_id).await?)
    }

    /// Creates a category; names are trimmed and unique per owner
    pub async fn create_category(
        &self,
        ctx: &AuthContext,
        name: Option<&str>,
        color: Option<&str>,
    ) -> Result<TaskCategory, TaskError> {
        let name = name.map(str::trim).unwrap_or_default();
        if name.is_empty() {
            return Err(TaskError::validation(CATEGORY_NAME_REQUIRED));
        }
        if name.chars().count() > CATEGORY_NAME_MAX_LEN {
            return Err(TaskError::validation(format!(
                "Category name must be at most {CATEGORY_NAME_MAX_LEN} characters"
            )));
        }
        if color.is_some_and(|c| c.trim().chars().count() > CATEGORY_COLOR_MAX_LEN) {
            return Err(TaskError::validation(format!(
                "Category color must be at most {CATEGORY_COLOR_MAX_LEN} characters"
            )));
        }

        if self
            .store
            .find_category_by_name(ctx.user_id, name)
            .await?
            .is_some()
        {
            return Err(TaskError::Conflict(CATEGORY_EXISTS.to_string()));
        }

        // A concurrent insert can still win the race; the unique constraint decides
        match self
            .store
            .create_category(CreateCategory::new(ctx.user_id, name, color))
            .await
        {
            Ok(category) => {
                info!(category_id = %category.id, user_id = %ctx.user_id, "Category created");
                Ok(category)
            }
            Err(StoreError::Conflict(ref c)) if c == constraints::CATEGORY_NAME => {
                Err(TaskError::Conflict(CATEGORY_EXISTS.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Detaches the category from its tasks and deletes it
    ///
    /// Returns the number of tasks that lost the category.
    pub async fn delete_category(&self, ctx: &AuthContext, id: Uuid) -> Result<u64, TaskError> {
        let detached = self
            .store
            .delete_category(ctx.user_id, id)
            .await?
            .ok_or(TaskError::NotFound("Category"))?;

        info!(category_id = %id, detached, "Category deleted");
        Ok(detached)
    }

    pub async fn stats(&self, ctx: &AuthContext) -> Result<TaskStats, TaskError> {
        let tasks = self.store.list_tasks(ctx.user_id, &TaskFilter::default()).await?;
        Ok(TaskStats::compute(&tasks, Utc::now().naive_utc()))
    }

    /// Loads the dashboard: one page of tasks plus categories, stats and overdue tasks
    pub async fn dashboard(
        &self,
        ctx: &AuthContext,
        filter: TaskFilter,
        page: Page,
    ) -> Result<Dashboard, TaskError> {
        let now = Utc::now();
        let naive_now = now.naive_utc();

        let all = self.store.list_tasks(ctx.user_id, &TaskFilter::default()).await?;
        let categories = self.store.list_categories(ctx.user_id).await?;

        let stats = TaskStats::compute(&all, naive_now);
        let overdue = overdue_tasks(&all, naive_now).into_iter().cloned().collect();

        let matching: Vec<&Task> = all.iter().filter(|t| filter.matches(t)).collect();
        let total_pages = matching.len().div_ceil(page.size).max(1);
        let page = Page::new(page.number.min(total_pages), page.size);
        let tasks = matching
            .iter()
            .skip(page.offset())
            .take(page.size)
            .map(|t| (*t).clone())
            .collect();

        Ok(Dashboard {
            tasks,
            categories,
            stats,
            overdue,
            filter,
            page: page.number,
            total_pages,
            matching: matching.len(),
            generated_at: now,
        })
    }
}
