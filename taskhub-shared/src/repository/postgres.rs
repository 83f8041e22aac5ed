/// PostgreSQL adapters for the persistence ports
///
/// All statements are parameterized and single-statement; no explicit
/// transactions. Task writes carry the owner in their `WHERE` clause and use
/// the affected-row count as the only success signal.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::{RepositoryError, RepositoryResult, TaskRepository, UserRepository};
use crate::models::{
    task::{CreateTask, StatusCounts, Task, TaskStatus, UpdateTask},
    user::{CreateUser, UpdateUser, User},
};

const USER_COLUMNS: &str = "id, username, email, password_hash, created_at, updated_at";

const TASK_COLUMNS: &str =
    "id, user_id, title, description, status, due_date, created_at, updated_at";

/// User repository backed by PostgreSQL
#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, column: &str, value: &str) -> RepositoryResult<User> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = $1");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        user.ok_or(RepositoryError::NotFound)
    }

    async fn exists(&self, column: &str, value: &str) -> RepositoryResult<bool> {
        let query = format!("SELECT EXISTS(SELECT 1 FROM users WHERE {column} = $1)");
        let exists: bool = sqlx::query_scalar(&query)
            .bind(value)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, data: CreateUser) -> RepositoryResult<User> {
        let query = format!(
            "INSERT INTO users (username, email, password_hash) VALUES ($1, $2, $3) \
             RETURNING {USER_COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(data.username)
            .bind(data.email)
            .bind(data.password_hash)
            .fetch_one(&self.pool)
            .await?;

        debug!(user_id = %user.id, "Inserted user row");
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<User> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        user.ok_or(RepositoryError::NotFound)
    }

    async fn find_by_username(&self, username: &str) -> RepositoryResult<User> {
        self.find_one("username", username).await
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<User> {
        self.find_one("email", email).await
    }

    async fn update(&self, id: Uuid, data: UpdateUser) -> RepositoryResult<User> {
        let query = format!(
            "UPDATE users SET username = $2, email = $3, password_hash = $4, updated_at = NOW() \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(data.username)
            .bind(data.email)
            .bind(data.password_hash)
            .fetch_optional(&self.pool)
            .await?;

        user.ok_or(RepositoryError::NotFound)
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn exists_by_username(&self, username: &str) -> RepositoryResult<bool> {
        self.exists("username", username).await
    }

    async fn exists_by_email(&self, email: &str) -> RepositoryResult<bool> {
        self.exists("email", email).await
    }
}

/// Task repository backed by PostgreSQL
#[derive(Debug, Clone)]
pub struct PgTaskRepository {
    pool: PgPool,
}

impl PgTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn create(&self, data: CreateTask) -> RepositoryResult<Task> {
        let query = format!(
            "INSERT INTO tasks (user_id, title, description, status, due_date) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {TASK_COLUMNS}"
        );
        let task = sqlx::query_as::<_, Task>(&query)
            .bind(data.user_id)
            .bind(data.title)
            .bind(data.description)
            .bind(data.status)
            .bind(data.due_date)
            .fetch_one(&self.pool)
            .await?;

        debug!(task_id = %task.id, user_id = %task.user_id, "Inserted task row");
        Ok(task)
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Task> {
        let query = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1");
        let task = sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        task.ok_or(RepositoryError::NotFound)
    }

    async fn list_by_owner(
        &self,
        owner_id: Uuid,
        status: Option<TaskStatus>,
    ) -> RepositoryResult<Vec<Task>> {
        let tasks = match status {
            Some(status) => {
                let query = format!(
                    "SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = $1 AND status = $2 \
                     ORDER BY created_at DESC"
                );
                sqlx::query_as::<_, Task>(&query)
                    .bind(owner_id)
                    .bind(status)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let query = format!(
                    "SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = $1 ORDER BY created_at DESC"
                );
                sqlx::query_as::<_, Task>(&query)
                    .bind(owner_id)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        Ok(tasks)
    }

    async fn update(&self, id: Uuid, owner_id: Uuid, data: UpdateTask) -> RepositoryResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET title = $3,
                description = $4,
                status = $5,
                due_date = $6,
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.status)
        .bind(data.due_date)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid, owner_id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn count_by_status(&self, owner_id: Uuid) -> RepositoryResult<StatusCounts> {
        let rows: Vec<(TaskStatus, i64)> = sqlx::query_as(
            r#"
            SELECT status, COUNT(*)
            FROM tasks
            WHERE user_id = $1
            GROUP BY status
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        let mut counts = StatusCounts::default();
        for (status, count) in rows {
            counts.set(status, count);
        }
        Ok(counts)
    }

    async fn latest_update(&self, owner_id: Uuid) -> RepositoryResult<Option<DateTime<Utc>>> {
        let latest: Option<DateTime<Utc>> =
            sqlx::query_scalar("SELECT MAX(updated_at) FROM tasks WHERE user_id = $1")
                .bind(owner_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(latest)
    }

    async fn belongs_to_owner(&self, id: Uuid, owner_id: Uuid) -> RepositoryResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM tasks WHERE id = $1 AND user_id = $2)")
                .bind(id)
                .bind(owner_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }
}
