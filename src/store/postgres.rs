use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use uuid::Uuid;

use crate::config::Config;
use crate::models::{Task, TaskUpdate, User};
use crate::store::{StoreError, TaskRepository, UserRepository};

const USER_COLUMNS: &str = "id, email, password_hash, created_at, updated_at";
const TASK_COLUMNS: &str = "id, user_id, title, description, completed, created_at, updated_at";

/// Opens the connection pool described by `config`.
///
/// `db_pool_size` connections are kept warm and the pool grows by at most
/// `db_max_overflow`. Connections are pinged before reuse, and callers wait up to
/// `db_acquire_timeout_secs` for a free one.
pub async fn connect(config: &Config) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .min_connections(config.db_pool_size)
        .max_connections(config.db_max_connections())
        .acquire_timeout(Duration::from_secs(config.db_acquire_timeout_secs))
        .test_before_acquire(true)
        .connect(&config.database_url)
        .await
}

/// Applies the bundled schema migrations.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// PostgreSQL-backed implementation of both repositories.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn insert(&self, user: &User) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (id, email, password_hash, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        // tasks.user_id is declared ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl TaskRepository for PgStore {
    async fn list_for_owner(&self, owner: Uuid) -> Result<Vec<Task>, StoreError> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks WHERE user_id = $1 ORDER BY created_at DESC",
            TASK_COLUMNS
        ))
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(tasks)
    }

    async fn find_by_id_and_owner(
        &self,
        id: Uuid,
        owner: Uuid,
    ) -> Result<Option<Task>, StoreError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks WHERE id = $1 AND user_id = $2",
            TASK_COLUMNS
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(task)
    }

    async fn insert(&self, task: &Task) -> Result<Task, StoreError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "INSERT INTO tasks (id, user_id, title, description, completed, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {}",
            TASK_COLUMNS
        ))
        .bind(task.id)
        .bind(task.user_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.completed)
        .bind(task.created_at)
        .bind(task.updated_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(task)
    }

    async fn update(
        &self,
        id: Uuid,
        owner: Uuid,
        changes: &TaskUpdate,
    ) -> Result<Option<Task>, StoreError> {
        // NULL parameters keep the stored value
        let task = sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks
             SET title = COALESCE($3, title),
                 description = COALESCE($4, description),
                 completed = COALESCE($5, completed),
                 updated_at = $6
             WHERE id = $1 AND user_id = $2
             RETURNING {}",
            TASK_COLUMNS
        ))
        .bind(id)
        .bind(owner)
        .bind(&changes.title)
        .bind(&changes.description)
        .bind(changes.completed)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;
        Ok(task)
    }

    async fn delete(&self, id: Uuid, owner: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
