/// Persistence gateway for users and tasks
///
/// Services talk to storage only through the two ports defined here. Two
/// adapters implement them with identical semantics:
///
/// - [`postgres`]: `sqlx` against PostgreSQL (production)
/// - [`memory`]: `tokio::sync::RwLock`-guarded insertion-ordered vectors (tests,
///   local tooling)
///
/// # Ownership scoping
///
/// Task writes are single statements whose predicate includes the owner. A
/// write that matches zero rows reports [`RepositoryError::NotFound`] whether
/// the task is missing or belongs to someone else; the two cases are never
/// distinguished.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskhub_shared::repository::{postgres::PgTaskRepository, TaskRepository};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, owner: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let tasks: Arc<dyn TaskRepository> = Arc::new(PgTaskRepository::new(pool));
/// let counts = tasks.count_by_status(owner).await?;
/// println!("{} pending", counts.pending);
/// # Ok(())
/// # }
/// ```

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{
    task::{CreateTask, StatusCounts, Task, TaskStatus, UpdateTask},
    user::{CreateUser, UpdateUser, User},
};

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Errors returned by repository implementations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// No row matched (lookup miss, or a scoped write that affected zero rows)
    #[error("record not found")]
    NotFound,

    /// A unique or foreign-key constraint rejected the write; carries the
    /// constraint name
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    /// Any other store failure, passed through unclassified
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepositoryError::NotFound,
            sqlx::Error::Database(ref db_err)
                if db_err.is_unique_violation() || db_err.is_foreign_key_violation() =>
            {
                RepositoryError::ConstraintViolation(
                    db_err.constraint().unwrap_or("unknown").to_string(),
                )
            }
            other => RepositoryError::Database(other),
        }
    }
}

/// User persistence contract
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Stores a new user; the store assigns id and timestamps
    ///
    /// # Errors
    ///
    /// [`RepositoryError::ConstraintViolation`] when the username or email is
    /// already taken.
    async fn create(&self, data: CreateUser) -> RepositoryResult<User>;

    /// Finds a user by ID, or [`RepositoryError::NotFound`]
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<User>;

    /// Finds a user by username, or [`RepositoryError::NotFound`]
    async fn find_by_username(&self, username: &str) -> RepositoryResult<User>;

    /// Finds a user by email, or [`RepositoryError::NotFound`]
    async fn find_by_email(&self, email: &str) -> RepositoryResult<User>;

    /// Replaces username, email and password hash and refreshes `updated_at`
    async fn update(&self, id: Uuid, data: UpdateUser) -> RepositoryResult<User>;

    /// Deletes a user (and, through the foreign key, their tasks)
    async fn delete(&self, id: Uuid) -> RepositoryResult<()>;

    /// Checks whether a username is taken
    async fn exists_by_username(&self, username: &str) -> RepositoryResult<bool>;

    /// Checks whether an email is taken
    async fn exists_by_email(&self, email: &str) -> RepositoryResult<bool>;
}

/// Task persistence contract
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task; the store assigns id and timestamps
    async fn create(&self, data: CreateTask) -> RepositoryResult<Task>;

    /// Finds a task by ID, or [`RepositoryError::NotFound`]
    ///
    /// Not owner-scoped: callers check ownership first.
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Task>;

    /// Lists an owner's tasks, newest first, optionally filtered by status
    async fn list_by_owner(
        &self,
        owner_id: Uuid,
        status: Option<TaskStatus>,
    ) -> RepositoryResult<Vec<Task>>;

    /// Replaces all editable fields of the task matching both `id` and `owner_id`
    ///
    /// # Errors
    ///
    /// [`RepositoryError::NotFound`] when zero rows matched.
    async fn update(&self, id: Uuid, owner_id: Uuid, data: UpdateTask) -> RepositoryResult<()>;

    /// Deletes the task matching both `id` and `owner_id`
    ///
    /// # Errors
    ///
    /// [`RepositoryError::NotFound`] when zero rows matched.
    async fn delete(&self, id: Uuid, owner_id: Uuid) -> RepositoryResult<()>;

    /// Counts an owner's tasks per status (all statuses present)
    async fn count_by_status(&self, owner_id: Uuid) -> RepositoryResult<StatusCounts>;

    /// Most recent `updated_at` across an owner's tasks
    async fn latest_update(&self, owner_id: Uuid) -> RepositoryResult<Option<DateTime<Utc>>>;

    /// Checks whether the task exists and belongs to `owner_id`
    async fn belongs_to_owner(&self, id: Uuid, owner_id: Uuid) -> RepositoryResult<bool>;
}
