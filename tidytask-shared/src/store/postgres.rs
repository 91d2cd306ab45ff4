/// PostgreSQL store
///
/// Runtime-checked sqlx queries against the schema in `migrations/`.
/// Single-statement writes rely on statement atomicity; the category delete
/// spans two statements and runs inside an explicit transaction.
///
/// # Example
///
/// ```no_run
/// use tidytask_shared::db::pool::{create_pool, DatabaseConfig};
/// use tidytask_shared::store::{PgStore, Store};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig {
///     url: std::env::var("DATABASE_URL")?,
///     ..Default::default()
/// })
/// .await?;
///
/// let store = PgStore::new(pool);
/// store.ping().await?;
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::Store;
use crate::domain::TaskFilter;
use crate::error::StoreError;
use crate::models::{CreateCategory, CreateTask, CreateUser, Task, TaskCategory, User};

/// Store backed by a PostgreSQL connection pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Maps constraint violations to [`StoreError::Conflict`]
fn map_err(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err {
        if let Some(constraint) = db_err.constraint() {
            return StoreError::Conflict(constraint.to_string());
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        crate::db::pool::health_check(&self.pool).await?;
        Ok(())
    }

    async fn create_user(&self, data: CreateUser) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, email, password_hash, first_name, last_name, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, username, email, password_hash, first_name, last_name,
                      is_active, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.username)
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.first_name)
        .bind(data.last_name)
        .bind(data.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, first_name, last_name,
                   is_active, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, first_name, last_name,
                   is_active, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, first_name, last_name,
                   is_active, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn count_users(&self) -> Result<i64, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn create_category(&self, data: CreateCategory) -> Result<TaskCategory, StoreError> {
        sqlx::query_as::<_, TaskCategory>(
            r#"
            INSERT INTO task_categories (id, user_id, name, color)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, name, color, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.user_id)
        .bind(data.name)
        .bind(data.color)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn find_category(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<TaskCategory>, StoreError> {
        let category = sqlx::query_as::<_, TaskCategory>(
            r#"
            SELECT id, user_id, name, color, created_at
            FROM task_categories
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    async fn find_category_by_name(
        &self,
        user_id: Uuid,
        name: &str,
    ) -> Result<Option<TaskCategory>, StoreError> {
        let category = sqlx::query_as::<_, TaskCategory>(
            r#"
            SELECT id, user_id, name, color, created_at
            FROM task_categories
            WHERE user_id = $1 AND name = $2
            "#,
        )
        .bind(user_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    async fn list_categories(&self, user_id: Uuid) -> Result<Vec<TaskCategory>, StoreError> {
        let categories = sqlx::query_as::<_, TaskCategory>(
            r#"
            SELECT id, user_id, name, color, created_at
            FROM task_categories
            WHERE user_id = $1
            ORDER BY name ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    async fn delete_category(&self, user_id: Uuid, id: Uuid) -> Result<Option<u64>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let owned: Option<Uuid> = sqlx::query_scalar(
            "SELECT id FROM task_categories WHERE id = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        if owned.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        let detached = sqlx::query(
            r#"
            UPDATE tasks
            SET category_id = NULL,
                updated_at = NOW()
            WHERE category_id = $1
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        sqlx::query("DELETE FROM task_categories WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_err)?;

        tx.commit().await?;

        debug!(category_id = %id, detached, "Deleted category");
        Ok(Some(detached))
    }

    async fn insert_task(&self, data: CreateTask) -> Result<Task, StoreError> {
        sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (id, user_id, category_id, title, description, priority, due_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, category_id, title, description, priority, status,
                      due_date, completed_at, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.user_id)
        .bind(data.category_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.priority)
        .bind(data.due_date)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn find_task(&self, user_id: Uuid, id: Uuid) -> Result<Option<Task>, StoreError> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, category_id, title, description, priority, status,
                   due_date, completed_at, created_at, updated_at
            FROM tasks
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }

    async fn list_tasks(&self, user_id: Uuid, filter: &TaskFilter) -> Result<Vec<Task>, StoreError> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, category_id, title, description, priority, status,
                   due_date, completed_at, created_at, updated_at
            FROM tasks
            WHERE user_id = $1
              AND ($2::task_status IS NULL OR status = $2)
              AND ($3::task_priority IS NULL OR priority = $3)
              AND ($4::uuid IS NULL OR category_id = $4)
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(filter.status)
        .bind(filter.priority)
        .bind(filter.category_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tasks)
    }

    async fn save_task(&self, task: &Task) -> Result<Option<Task>, StoreError> {
        sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET title = $3,
                description = $4,
                priority = $5,
                status = $6,
                due_date = $7,
                completed_at = $8,
                category_id = $9,
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, category_id, title, description, priority, status,
                      due_date, completed_at, created_at, updated_at
            "#,
        )
        .bind(task.id)
        .bind(task.user_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.priority)
        .bind(task.status)
        .bind(task.due_date)
        .bind(task.completed_at)
        .bind(task.category_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_err)
    }

    async fn delete_task(&self, user_id: Uuid, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_completed_tasks(&self, user_id: Uuid) -> Result<u64, StoreError> {
        let result =
            sqlx::query("DELETE FROM tasks WHERE user_id = $1 AND status = 'completed'")
                .bind(user_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected())
    }
}
