/// In-memory store
///
/// Keeps every table in a single `RwLock`, so each call observes and
/// mutates a consistent snapshot. Enforces the same unique and foreign key
/// rules as the PostgreSQL schema and reports violations with the same
/// constraint names.
///
/// The store can be switched offline with [`MemoryStore::set_offline`];
/// every call then fails the way an unreachable database would.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{constraints, Store};
use crate::domain::TaskFilter;
use crate::error::StoreError;
use crate::models::{
    CreateCategory, CreateTask, CreateUser, Task, TaskCategory, TaskStatus, User,
};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    categories: Vec<TaskCategory>,
    /// Tasks paired with an insertion counter used to break `created_at` ties
    tasks: Vec<(u64, Task)>,
    next_seq: u64,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail with a database error
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

impl Tables {
    fn category_owned(&self, user_id: Uuid, id: Uuid) -> bool {
        self.categories
            .iter()
            .any(|c| c.id == id && c.user_id == user_id)
    }

    fn check_category_ref(&self, category_id: Option<Uuid>) -> Result<(), StoreError> {
        match category_id {
            Some(id) if !self.categories.iter().any(|c| c.id == id) => Err(
                StoreError::Conflict(constraints::TASK_CATEGORY.to_string()),
            ),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.check_online()
    }

    async fn create_user(&self, data: CreateUser) -> Result<User, StoreError> {
        self.check_online()?;
        let mut tables = self.tables.write().await;

        if tables.users.iter().any(|u| u.username == data.username) {
            return Err(StoreError::Conflict(constraints::USERS_USERNAME.to_string()));
        }
        if tables.users.iter().any(|u| u.email == data.email) {
            return Err(StoreError::Conflict(constraints::USERS_EMAIL.to_string()));
        }

        let user = User {
            id: Uuid::new_v4(),
            username: data.username,
            email: data.email,
            password_hash: data.password_hash,
            first_name: data.first_name,
            last_name: data.last_name,
            is_active: data.is_active,
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        self.check_online()?;
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        self.check_online()?;
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.check_online()?;
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn count_users(&self) -> Result<i64, StoreError> {
        self.check_online()?;
        let tables = self.tables.read().await;
        Ok(tables.users.len() as i64)
    }

    async fn create_category(&self, data: CreateCategory) -> Result<TaskCategory, StoreError> {
        self.check_online()?;
        let mut tables = self.tables.write().await;

        if tables
            .categories
            .iter()
            .any(|c| c.user_id == data.user_id && c.name == data.name)
        {
            return Err(StoreError::Conflict(constraints::CATEGORY_NAME.to_string()));
        }

        let category = TaskCategory {
            id: Uuid::new_v4(),
            user_id: data.user_id,
            name: data.name,
            color: data.color,
            created_at: Utc::now(),
        };
        tables.categories.push(category.clone());
        Ok(category)
    }

    async fn find_category(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<TaskCategory>, StoreError> {
        self.check_online()?;
        let tables = self.tables.read().await;
        Ok(tables
            .categories
            .iter()
            .find(|c| c.id == id && c.user_id == user_id)
            .cloned())
    }

    async fn find_category_by_name(
        &self,
        user_id: Uuid,
        name: &str,
    ) -> Result<Option<TaskCategory>, StoreError> {
        self.check_online()?;
        let tables = self.tables.read().await;
        Ok(tables
            .categories
            .iter()
            .find(|c| c.user_id == user_id && c.name == name)
            .cloned())
    }

    async fn list_categories(&self, user_id: Uuid) -> Result<Vec<TaskCategory>, StoreError> {
        self.check_online()?;
        let tables = self.tables.read().await;
        let mut categories: Vec<TaskCategory> = tables
            .categories
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn delete_category(&self, user_id: Uuid, id: Uuid) -> Result<Option<u64>, StoreError> {
        self.check_online()?;
        let mut tables = self.tables.write().await;

        if !tables.category_owned(user_id, id) {
            return Ok(None);
        }

        let now = Utc::now();
        let mut detached = 0;
        for (_, task) in tables.tasks.iter_mut() {
            if task.category_id == Some(id) {
                task.category_id = None;
                task.updated_at = now;
                detached += 1;
            }
        }
        tables.categories.retain(|c| c.id != id);

        Ok(Some(detached))
    }

    async fn insert_task(&self, data: CreateTask) -> Result<Task, StoreError> {
        self.check_online()?;
        let mut tables = self.tables.write().await;
        tables.check_category_ref(data.category_id)?;

        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            user_id: data.user_id,
            category_id: data.category_id,
            title: data.title,
            description: data.description,
            priority: data.priority,
            status: TaskStatus::Pending,
            due_date: data.due_date,
            completed_at: None,
            created_at: now,
            updated_at: now,
        };

        let seq = tables.next_seq;
        tables.next_seq += 1;
        tables.tasks.push((seq, task.clone()));
        Ok(task)
    }

    async fn find_task(&self, user_id: Uuid, id: Uuid) -> Result<Option<Task>, StoreError> {
        self.check_online()?;
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .iter()
            .map(|(_, t)| t)
            .find(|t| t.id == id && t.user_id == user_id)
            .cloned())
    }

    async fn list_tasks(&self, user_id: Uuid, filter: &TaskFilter) -> Result<Vec<Task>, StoreError> {
        self.check_online()?;
        let tables = self.tables.read().await;

        let mut rows: Vec<&(u64, Task)> = tables
            .tasks
            .iter()
            .filter(|(_, t)| t.user_id == user_id && filter.matches(t))
            .collect();
        rows.sort_by(|(seq_a, a), (seq_b, b)| {
            b.created_at.cmp(&a.created_at).then(seq_b.cmp(seq_a))
        });

        Ok(rows.into_iter().map(|(_, t)| t.clone()).collect())
    }

    async fn save_task(&self, task: &Task) -> Result<Option<Task>, StoreError> {
        self.check_online()?;
        let mut tables = self.tables.write().await;
        tables.check_category_ref(task.category_id)?;

        let Some((_, stored)) = tables
            .tasks
            .iter_mut()
            .find(|(_, t)| t.id == task.id && t.user_id == task.user_id)
        else {
            return Ok(None);
        };

        stored.title = task.title.clone();
        stored.description = task.description.clone();
        stored.priority = task.priority;
        stored.status = task.status;
        stored.due_date = task.due_date;
        stored.completed_at = task.completed_at;
        stored.category_id = task.category_id;
        stored.updated_at = Utc::now();

        Ok(Some(stored.clone()))
    }

    async fn delete_task(&self, user_id: Uuid, id: Uuid) -> Result<bool, StoreError> {
        self.check_online()?;
        let mut tables = self.tables.write().await;
        let before = tables.tasks.len();
        tables
            .tasks
            .retain(|(_, t)| !(t.id == id && t.user_id == user_id));
        Ok(tables.tasks.len() < before)
    }

    async fn delete_completed_tasks(&self, user_id: Uuid) -> Result<u64, StoreError> {
        self.check_online()?;
        let mut tables = self.tables.write().await;
        let before = tables.tasks.len();
        tables
            .tasks
            .retain(|(_, t)| !(t.user_id == user_id && t.is_completed()));
        Ok((before - tables.tasks.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;

    async fn store_with_user() -> (MemoryStore, Uuid) {
        let store = MemoryStore::new();
        let user = store
            .create_user(CreateUser {
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
                password_hash: "hash".to_string(),
                first_name: None,
                last_name: None,
                is_active: true,
            })
            .await
            .unwrap();
        (store, user.id)
    }

    fn new_task(user_id: Uuid, title: &str) -> CreateTask {
        CreateTask {
            user_id,
            title: title.to_string(),
            description: None,
            priority: Priority::Medium,
            due_date: None,
            category_id: None,
        }
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let (store, _) = store_with_user().await;
        let err = store
            .create_user(CreateUser {
                username: "alice".to_string(),
                email: "other@example.com".to_string(),
                password_hash: "hash".to_string(),
                first_name: None,
                last_name: None,
                is_active: true,
            })
            .await
            .unwrap_err();

        assert_eq!(err.constraint(), Some(constraints::USERS_USERNAME));
    }

    #[tokio::test]
    async fn test_list_tasks_newest_first() {
        let (store, user_id) = store_with_user().await;
        for title in ["first", "second", "third"] {
            store.insert_task(new_task(user_id, title)).await.unwrap();
        }

        let titles: Vec<String> = store
            .list_tasks(user_id, &TaskFilter::default())
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();

        assert_eq!(titles, vec!["third", "second", "first"]);
    }

    #[tokio::test]
    async fn test_tasks_scoped_to_owner() {
        let (store, user_id) = store_with_user().await;
        let task = store.insert_task(new_task(user_id, "mine")).await.unwrap();
        let stranger = Uuid::new_v4();

        assert!(store.find_task(stranger, task.id).await.unwrap().is_none());
        assert!(!store.delete_task(stranger, task.id).await.unwrap());
        assert!(store
            .list_tasks(stranger, &TaskFilter::default())
            .await
            .unwrap()
            .is_empty());

        let mut forged = task.clone();
        forged.user_id = stranger;
        forged.title = "stolen".to_string();
        assert!(store.save_task(&forged).await.unwrap().is_none());
        assert_eq!(
            store.find_task(user_id, task.id).await.unwrap().unwrap().title,
            "mine"
        );
    }

    #[tokio::test]
    async fn test_delete_category_detaches_tasks() {
        let (store, user_id) = store_with_user().await;
        let category = store
            .create_category(CreateCategory::new(user_id, "Work", None))
            .await
            .unwrap();

        let mut data = new_task(user_id, "report");
        data.category_id = Some(category.id);
        let task = store.insert_task(data).await.unwrap();

        assert_eq!(store.delete_category(user_id, category.id).await.unwrap(), Some(1));
        let task = store.find_task(user_id, task.id).await.unwrap().unwrap();
        assert_eq!(task.category_id, None);
        assert!(store.list_categories(user_id).await.unwrap().is_empty());

        assert_eq!(store.delete_category(user_id, category.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unknown_category_reference_rejected() {
        let (store, user_id) = store_with_user().await;
        let mut data = new_task(user_id, "orphan");
        data.category_id = Some(Uuid::new_v4());

        let err = store.insert_task(data).await.unwrap_err();
        assert_eq!(err.constraint(), Some(constraints::TASK_CATEGORY));
    }

    #[tokio::test]
    async fn test_delete_completed_tasks() {
        let (store, user_id) = store_with_user().await;
        let done = store.insert_task(new_task(user_id, "done")).await.unwrap();
        store.insert_task(new_task(user_id, "open")).await.unwrap();

        let mut completed = done.clone();
        completed.set_status(TaskStatus::Completed, Utc::now());
        store.save_task(&completed).await.unwrap();

        assert_eq!(store.delete_completed_tasks(user_id).await.unwrap(), 1);
        assert_eq!(store.delete_completed_tasks(user_id).await.unwrap(), 0);
        assert_eq!(
            store
                .list_tasks(user_id, &TaskFilter::default())
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn test_offline_store_fails() {
        let (store, user_id) = store_with_user().await;
        store.set_offline(true);

        assert!(matches!(store.ping().await, Err(StoreError::Database(_))));
        assert!(store.count_users().await.is_err());
        assert!(store.list_categories(user_id).await.is_err());

        store.set_offline(false);
        assert!(store.ping().await.is_ok());
    }
}
