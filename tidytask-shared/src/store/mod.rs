/// Storage interface
///
/// The domain operations only talk to storage through the [`Store`] trait,
/// so the backing database can be swapped without touching them.
///
/// # Implementations
///
/// - [`PgStore`]: PostgreSQL via sqlx, used by the server
/// - [`MemoryStore`]: in-process tables, used by tests and local tooling
///
/// # Contract
///
/// - Every lookup, update and delete of a category or task is scoped to its
///   owner; a row owned by someone else behaves exactly like a missing row.
/// - Each mutating call is atomic: it either applies fully or not at all.
/// - Unique constraint violations surface as [`StoreError::Conflict`]
///   carrying the constraint name.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::TaskFilter;
use crate::error::StoreError;
use crate::models::{CreateCategory, CreateTask, CreateUser, Task, TaskCategory, User};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Constraint names shared by both implementations
pub mod constraints {
    pub const USERS_USERNAME: &str = "users_username_key";
    pub const USERS_EMAIL: &str = "users_email_key";
    pub const CATEGORY_NAME: &str = "task_categories_user_id_name_key";
    pub const TASK_CATEGORY: &str = "tasks_category_id_fkey";
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Checks that the store is reachable
    async fn ping(&self) -> Result<(), StoreError>;

    // Users

    async fn create_user(&self, data: CreateUser) -> Result<User, StoreError>;

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn count_users(&self) -> Result<i64, StoreError>;

    // Categories

    async fn create_category(&self, data: CreateCategory) -> Result<TaskCategory, StoreError>;

    async fn find_category(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<TaskCategory>, StoreError>;

    /// Exact, case-sensitive name lookup among the owner's categories
    async fn find_category_by_name(
        &self,
        user_id: Uuid,
        name: &str,
    ) -> Result<Option<TaskCategory>, StoreError>;

    /// The owner's categories ordered by name
    async fn list_categories(&self, user_id: Uuid) -> Result<Vec<TaskCategory>, StoreError>;

    /// Clears the category on every task referencing it, then deletes it
    ///
    /// Returns the number of detached tasks, or `None` when the category
    /// does not exist for this owner (nothing changed).
    async fn delete_category(&self, user_id: Uuid, id: Uuid) -> Result<Option<u64>, StoreError>;

    // Tasks

    /// Inserts a pending task
    async fn insert_task(&self, data: CreateTask) -> Result<Task, StoreError>;

    async fn find_task(&self, user_id: Uuid, id: Uuid) -> Result<Option<Task>, StoreError>;

    /// The owner's tasks matching `filter`, newest first
    async fn list_tasks(&self, user_id: Uuid, filter: &TaskFilter) -> Result<Vec<Task>, StoreError>;

    /// Writes every mutable column of `task` and bumps `updated_at`
    ///
    /// Returns the stored row, or `None` when the task does not exist for
    /// `task.user_id`.
    async fn save_task(&self, task: &Task) -> Result<Option<Task>, StoreError>;

    async fn delete_task(&self, user_id: Uuid, id: Uuid) -> Result<bool, StoreError>;

    /// Deletes every completed task of the owner, returning how many
    async fn delete_completed_tasks(&self, user_id: Uuid) -> Result<u64, StoreError>;
}
