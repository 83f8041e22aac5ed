/// Task service: owner-scoped task operations and statistics
///
/// Reads and updates check ownership with
/// [`TaskRepository::belongs_to_owner`] before touching the row, and deletes
/// rely on the repository's owner-scoped statement. In every case a task that
/// does not exist and a task owned by someone else produce the same
/// [`ServiceError::NotFoundOrUnauthorized`].

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use super::error::{ServiceError, ServiceResult};
use crate::models::task::{CreateTask, TaskResponse, TaskStatistics, TaskStatus, UpdateTask};
use crate::repository::{RepositoryError, TaskRepository};

/// Input for creating a task
#[derive(Debug, Clone, Default)]
pub struct CreateTaskInput {
    pub title: String,
    pub description: Option<String>,
    /// Defaults to [`TaskStatus::Pending`]
    pub status: Option<TaskStatus>,
    pub due_date: Option<DateTime<Utc>>,
}

/// Input for replacing a task's editable fields
///
/// Absent optional fields clear the stored value.
#[derive(Debug, Clone)]
pub struct UpdateTaskInput {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,
}

/// Task service
pub struct TaskService {
    tasks: Arc<dyn TaskRepository>,
}

impl TaskService {
    pub fn new(tasks: Arc<dyn TaskRepository>) -> Self {
        Self { tasks }
    }

    /// Creates a task owned by `owner_id`
    pub async fn create(
        &self,
        owner_id: Uuid,
        input: CreateTaskInput,
    ) -> ServiceResult<TaskResponse> {
        require_title(&input.title)?;

        let task = self
            .tasks
            .create(CreateTask {
                user_id: owner_id,
                title: input.title,
                description: input.description.unwrap_or_default(),
                status: input.status.unwrap_or_default(),
                due_date: input.due_date,
            })
            .await?;

        info!(task_id = %task.id, user_id = %owner_id, status = %task.status, "Task created");
        Ok(TaskResponse::from(task))
    }

    /// Fetches one of the owner's tasks
    ///
    /// # Errors
    ///
    /// `NotFoundOrUnauthorized` if the task is missing or not owned by `owner_id`
    pub async fn get(&self, task_id: Uuid, owner_id: Uuid) -> ServiceResult<TaskResponse> {
        self.ensure_owned(task_id, owner_id).await?;

        let task = self.tasks.find_by_id(task_id).await.map_err(scoped)?;
        Ok(TaskResponse::from(task))
    }

    /// Lists the owner's tasks, newest first
    ///
    /// An empty filter string means no filter.
    ///
    /// # Errors
    ///
    /// `InvalidFilter` if the filter is not a known status
    pub async fn list(
        &self,
        owner_id: Uuid,
        status_filter: Option<&str>,
    ) -> ServiceResult<Vec<TaskResponse>> {
        let status = match status_filter {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<TaskStatus>().map_err(|e| {
                debug!(user_id = %owner_id, error = %e, "Rejected status filter");
                ServiceError::InvalidFilter
            })?),
        };

        let tasks = self.tasks.list_by_owner(owner_id, status).await?;
        Ok(tasks.into_iter().map(TaskResponse::from).collect())
    }

    /// Replaces the task's editable fields and returns the stored result
    ///
    /// # Errors
    ///
    /// - `NotFoundOrUnauthorized` if the task is missing or not owned
    /// - `ValidationFailed` if the title is blank
    pub async fn update(
        &self,
        task_id: Uuid,
        owner_id: Uuid,
        input: UpdateTaskInput,
    ) -> ServiceResult<TaskResponse> {
        self.ensure_owned(task_id, owner_id).await?;
        require_title(&input.title)?;

        self.tasks
            .update(
                task_id,
                owner_id,
                UpdateTask {
                    title: input.title,
                    description: input.description.unwrap_or_default(),
                    status: input.status,
                    due_date: input.due_date,
                },
            )
            .await
            .map_err(scoped)?;

        // Re-read so the timestamps are the ones the store wrote
        let task = self.tasks.find_by_id(task_id).await.map_err(scoped)?;

        info!(task_id = %task_id, user_id = %owner_id, status = %task.status, "Task updated");
        Ok(TaskResponse::from(task))
    }

    /// Deletes one of the owner's tasks
    ///
    /// # Errors
    ///
    /// `NotFoundOrUnauthorized` if nothing was deleted
    pub async fn delete(&self, task_id: Uuid, owner_id: Uuid) -> ServiceResult<()> {
        self.tasks.delete(task_id, owner_id).await.map_err(scoped)?;

        info!(task_id = %task_id, user_id = %owner_id, "Task deleted");
        Ok(())
    }

    /// Per-status counts, total and most recent update for the owner
    pub async fn statistics(&self, owner_id: Uuid) -> ServiceResult<TaskStatistics> {
        let by_status = self.tasks.count_by_status(owner_id).await?;
        let last_update = self.tasks.latest_update(owner_id).await?;

        Ok(TaskStatistics {
            total: by_status.total(),
            by_status,
            last_update,
        })
    }

    async fn ensure_owned(&self, task_id: Uuid, owner_id: Uuid) -> ServiceResult<()> {
        if !self.tasks.belongs_to_owner(task_id, owner_id).await? {
            debug!(task_id = %task_id, user_id = %owner_id, "Task missing or not owned");
            return Err(ServiceError::NotFoundOrUnauthorized);
        }
        Ok(())
    }
}

fn require_title(title: &str) -> ServiceResult<()> {
    if title.trim().is_empty() {
        return Err(ServiceError::ValidationFailed("title is required".to_string()));
    }
    Ok(())
}

/// Zero-row writes and vanished rows on task paths become the conflated error
fn scoped(err: RepositoryError) -> ServiceError {
    match err {
        RepositoryError::NotFound => ServiceError::NotFoundOrUnauthorized,
        other => other.into(),
    }
}
