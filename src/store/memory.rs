use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{Task, TaskUpdate, User};
use crate::store::{StoreError, TaskRepository, UserRepository};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    tasks: HashMap<Uuid, Task>,
}

/// In-process store with the same constraints as the SQL schema:
/// unique emails, tasks must reference an existing user, and deleting a
/// user cascades to their tasks.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tasks across all users.
    pub async fn task_count(&self) -> usize {
        self.tables.read().await.tasks.len()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn insert(&self, user: &User) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::UniqueViolation("users_email_key".into()));
        }
        if tables.users.contains_key(&user.id) {
            return Err(StoreError::UniqueViolation("users_pkey".into()));
        }
        tables.users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.users.remove(&id).is_none() {
            return Ok(false);
        }
        tables.tasks.retain(|_, task| task.user_id != id);
        Ok(true)
    }
}

#[async_trait]
impl TaskRepository for InMemoryStore {
    async fn list_for_owner(&self, owner: Uuid) -> Result<Vec<Task>, StoreError> {
        let tables = self.tables.read().await;
        let mut tasks: Vec<Task> = tables
            .tasks
            .values()
            .filter(|task| task.user_id == owner)
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    async fn find_by_id_and_owner(
        &self,
        id: Uuid,
        owner: Uuid,
    ) -> Result<Option<Task>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .get(&id)
            .filter(|task| task.user_id == owner)
            .cloned())
    }

    async fn insert(&self, task: &Task) -> Result<Task, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&task.user_id) {
            return Err(StoreError::ForeignKeyViolation("tasks_user_id_fkey".into()));
        }
        tables.tasks.insert(task.id, task.clone());
        Ok(task.clone())
    }

    async fn update(
        &self,
        id: Uuid,
        owner: Uuid,
        changes: &TaskUpdate,
    ) -> Result<Option<Task>, StoreError> {
        let mut tables = self.tables.write().await;
        match tables.tasks.get_mut(&id) {
            Some(task) if task.user_id == owner => {
                task.apply(changes);
                Ok(Some(task.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid, owner: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        let owned = tables
            .tasks
            .get(&id)
            .map_or(false, |task| task.user_id == owner);
        if owned {
            tables.tasks.remove(&id);
        }
        Ok(owned)
    }
}
