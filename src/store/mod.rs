//! Persistence boundary.
//!
//! Handlers and services only see the two repository traits below, so the storage engine
//! can be swapped: `postgres` backs the running server, `memory` backs the test suite.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use std::fmt;
use uuid::Uuid;

use crate::models::{Task, TaskUpdate, User};

pub use memory::InMemoryStore;
pub use postgres::PgStore;

/// Failure outcomes reported by a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A unique constraint rejected the write (the users' email).
    UniqueViolation(String),
    /// A task referenced an owner that does not exist.
    ForeignKeyViolation(String),
    /// Anything else the backend reported.
    Backend(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StoreError::UniqueViolation(msg) => write!(f, "unique violation: {}", msg),
            StoreError::ForeignKeyViolation(msg) => write!(f, "foreign key violation: {}", msg),
            StoreError::Backend(msg) => write!(f, "storage backend error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> StoreError {
        match &error {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                StoreError::UniqueViolation(db_err.message().to_string())
            }
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                StoreError::ForeignKeyViolation(db_err.message().to_string())
            }
            _ => StoreError::Backend(error.to_string()),
        }
    }
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Persists a new user. A taken email yields `StoreError::UniqueViolation`.
    async fn insert(&self, user: &User) -> Result<User, StoreError>;

    /// Removes a user together with all of their tasks. Returns whether a row was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

/// Task persistence. Every lookup and mutation is keyed by `(id, owner)` at once.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// All tasks of `owner`, newest first.
    async fn list_for_owner(&self, owner: Uuid) -> Result<Vec<Task>, StoreError>;

    async fn find_by_id_and_owner(&self, id: Uuid, owner: Uuid)
        -> Result<Option<Task>, StoreError>;

    async fn insert(&self, task: &Task) -> Result<Task, StoreError>;

    /// Applies a partial update. `None` when no task matches `(id, owner)`.
    async fn update(
        &self,
        id: Uuid,
        owner: Uuid,
        changes: &TaskUpdate,
    ) -> Result<Option<Task>, StoreError>;

    /// Hard-deletes the task. `false` when no task matches `(id, owner)`.
    async fn delete(&self, id: Uuid, owner: Uuid) -> Result<bool, StoreError>;
}
