/// Task endpoints
///
/// All routes require a bearer token and act only on the caller's tasks. A
/// task that belongs to someone else is reported exactly like a missing one:
/// `404` with `task not found or unauthorized`.
///
/// # Endpoints
///
/// - `GET /api/v1/tasks?status=` - List tasks, newest first
/// - `POST /api/v1/tasks` - Create a task
/// - `GET /api/v1/tasks/stats` - Per-status counts and last update
/// - `GET /api/v1/tasks/:id` - Fetch one task
/// - `PUT /api/v1/tasks/:id` - Replace title, description, status, due date
/// - `DELETE /api/v1/tasks/:id` - Delete a task

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
    extract::ValidatedJson,
    middleware::auth::AuthUser,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskhub_shared::{
    models::task::{TaskResponse, TaskStatistics, TaskStatus},
    services::task::{CreateTaskInput, UpdateTaskInput},
};
use uuid::Uuid;
use validator::Validate;

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,

    /// `pending`, `in_progress` or `completed`; empty or absent means `pending`
    pub status: Option<String>,

    pub due_date: Option<DateTime<Utc>>,
}

/// Update task request
///
/// Full replacement: omitted `description` and `due_date` are cleared.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,

    pub status: String,

    pub due_date: Option<DateTime<Utc>>,
}

/// Query string for listing
#[derive(Debug, Default, Deserialize)]
pub struct ListTasksQuery {
    pub status: Option<String>,
}

/// Plain message body
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

fn parse_status(raw: &str) -> ApiResult<TaskStatus> {
    raw.parse::<TaskStatus>().map_err(|_| {
        ApiError::ValidationError(vec![ValidationErrorDetail::new(
            "status",
            "Status must be one of: pending, in_progress, completed",
        )])
    })
}

fn parse_task_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest("invalid task id".to_string()))
}

/// List the caller's tasks
///
/// # Errors
///
/// - `400 Bad Request`: `status` is not a known task status
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Query(query): Query<ListTasksQuery>,
) -> ApiResult<Json<Vec<TaskResponse>>> {
    let tasks = state
        .tasks
        .list(user_id, query.status.as_deref())
        .await?;

    Ok(Json(tasks))
}

/// Create a task
///
/// ```text
/// POST /api/v1/tasks
///
/// { "title": "Buy milk" }
/// ```
///
/// Returns `201 Created` with the stored task.
pub async fn create_task(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    ValidatedJson(req): ValidatedJson<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    let status = match req.status.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(parse_status(raw)?),
    };

    let task = state
        .tasks
        .create(
            user_id,
            CreateTaskInput {
                title: req.title,
                description: req.description,
                status,
                due_date: req.due_date,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// Per-status counts for the caller's tasks
pub async fn task_statistics(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> ApiResult<Json<TaskStatistics>> {
    Ok(Json(state.tasks.statistics(user_id).await?))
}

/// Fetch one task
pub async fn get_task(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<TaskResponse>> {
    let task_id = parse_task_id(&id)?;
    Ok(Json(state.tasks.get(task_id, user_id).await?))
}

/// Replace a task's editable fields
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed or unknown status
/// - `404 Not Found`: Task missing or owned by someone else
pub async fn update_task(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateTaskRequest>,
) -> ApiResult<Json<TaskResponse>> {
    let task_id = parse_task_id(&id)?;
    let status = parse_status(&req.status)?;

    let task = state
        .tasks
        .update(
            task_id,
            user_id,
            UpdateTaskInput {
                title: req.title,
                description: req.description,
                status,
                due_date: req.due_date,
            },
        )
        .await?;

    Ok(Json(task))
}

/// Delete a task
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let task_id = parse_task_id(&id)?;
    state.tasks.delete(task_id, user_id).await?;

    Ok(Json(MessageResponse {
        message: "Task deleted successfully".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status("in_progress").unwrap(), TaskStatus::InProgress);
        assert!(matches!(
            parse_status("archived"),
            Err(ApiError::ValidationError(ref details)) if details[0].field == "status"
        ));
    }

    #[test]
    fn test_parse_task_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_task_id(&id.to_string()).unwrap(), id);
        assert!(matches!(parse_task_id("42"), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_create_request_validation() {
        let req: CreateTaskRequest = serde_json::from_str(r#"{"title": ""}"#).unwrap();
        assert!(req.validate().is_err());

        let req: CreateTaskRequest =
            serde_json::from_str(&format!(r#"{{"title": "ok", "description": "{}"}}"#, "x".repeat(1001)))
                .unwrap();
        assert!(req.validate().is_err());

        let req: CreateTaskRequest = serde_json::from_str(r#"{"title": "Buy milk"}"#).unwrap();
        assert!(req.validate().is_ok());
        assert!(req.status.is_none());
    }
}
