//! In-memory adapters for the persistence ports.
//!
//! Both repositories share one [`InMemoryStore`] so the user/task relation
//! behaves like the database: tasks need an existing owner, and deleting a
//! user removes their tasks.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{RepositoryError, RepositoryResult, TaskRepository, UserRepository};
use crate::models::{
    task::{CreateTask, StatusCounts, Task, TaskStatus, UpdateTask},
    user::{CreateUser, UpdateUser, User},
};

const USERNAME_KEY: &str = "users_username_key";
const EMAIL_KEY: &str = "users_email_key";
const TASK_OWNER_FKEY: &str = "tasks_user_id_fkey";

#[derive(Debug, Default)]
struct StoreState {
    users: Vec<User>,
    /// Insertion order
    tasks: Vec<Task>,
}

impl StoreState {
    fn check_unique(
        &self,
        skip: Option<Uuid>,
        username: &str,
        email: &str,
    ) -> RepositoryResult<()> {
        let others = self.users.iter().filter(|u| Some(u.id) != skip);
        for user in others {
            if user.username == username {
                return Err(RepositoryError::ConstraintViolation(USERNAME_KEY.to_string()));
            }
            if user.email == email {
                return Err(RepositoryError::ConstraintViolation(EMAIL_KEY.to_string()));
            }
        }
        Ok(())
    }

    fn owned_task_mut(&mut self, id: Uuid, owner_id: Uuid) -> Option<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == id && t.user_id == owner_id)
    }
}

/// Shared backing store for the in-memory repositories
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<StoreState>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// User repository view over this store.
    #[must_use]
    pub fn users(&self) -> InMemoryUserRepository {
        InMemoryUserRepository {
            state: Arc::clone(&self.state),
        }
    }

    /// Task repository view over this store.
    #[must_use]
    pub fn tasks(&self) -> InMemoryTaskRepository {
        InMemoryTaskRepository {
            state: Arc::clone(&self.state),
        }
    }
}

/// Thread-safe in-memory user repository.
#[derive(Debug, Clone)]
pub struct InMemoryUserRepository {
    state: Arc<RwLock<StoreState>>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, data: CreateUser) -> RepositoryResult<User> {
        let mut state = self.state.write().await;
        state.check_unique(None, &data.username, &data.email)?;

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: data.username,
            email: data.email,
            password_hash: data.password_hash,
            created_at: now,
            updated_at: now,
        };
        state.users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<User> {
        let state = self.state.read().await;
        state
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn find_by_username(&self, username: &str) -> RepositoryResult<User> {
        let state = self.state.read().await;
        state
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<User> {
        let state = self.state.read().await;
        state
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn update(&self, id: Uuid, data: UpdateUser) -> RepositoryResult<User> {
        let mut state = self.state.write().await;
        if !state.users.iter().any(|u| u.id == id) {
            return Err(RepositoryError::NotFound);
        }
        state.check_unique(Some(id), &data.username, &data.email)?;

        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(RepositoryError::NotFound)?;
        user.username = data.username;
        user.email = data.email;
        user.password_hash = data.password_hash;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let mut state = self.state.write().await;
        let before = state.users.len();
        state.users.retain(|u| u.id != id);
        if state.users.len() == before {
            return Err(RepositoryError::NotFound);
        }
        state.tasks.retain(|t| t.user_id != id);
        Ok(())
    }

    async fn exists_by_username(&self, username: &str) -> RepositoryResult<bool> {
        let state = self.state.read().await;
        Ok(state.users.iter().any(|u| u.username == username))
    }

    async fn exists_by_email(&self, email: &str) -> RepositoryResult<bool> {
        let state = self.state.read().await;
        Ok(state.users.iter().any(|u| u.email == email))
    }
}

/// Thread-safe in-memory task repository.
#[derive(Debug, Clone)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<StoreState>>,
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn create(&self, data: CreateTask) -> RepositoryResult<Task> {
        let mut state = self.state.write().await;
        if !state.users.iter().any(|u| u.id == data.user_id) {
            return Err(RepositoryError::ConstraintViolation(TASK_OWNER_FKEY.to_string()));
        }

        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            user_id: data.user_id,
            title: data.title,
            description: data.description,
            status: data.status,
            due_date: data.due_date,
            created_at: now,
            updated_at: now,
        };
        state.tasks.push(task.clone());
        Ok(task)
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Task> {
        let state = self.state.read().await;
        state
            .tasks
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn list_by_owner(
        &self,
        owner_id: Uuid,
        status: Option<TaskStatus>,
    ) -> RepositoryResult<Vec<Task>> {
        let state = self.state.read().await;
        // Walk newest insertion first so equal timestamps still list newest first.
        let mut tasks: Vec<Task> = state
            .tasks
            .iter()
            .rev()
            .filter(|t| t.user_id == owner_id)
            .filter(|t| status.map_or(true, |s| t.status == s))
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    async fn update(&self, id: Uuid, owner_id: Uuid, data: UpdateTask) -> RepositoryResult<()> {
        let mut state = self.state.write().await;
        let task = state
            .owned_task_mut(id, owner_id)
            .ok_or(RepositoryError::NotFound)?;
        task.title = data.title;
        task.description = data.description;
        task.status = data.status;
        task.due_date = data.due_date;
        task.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&self, id: Uuid, owner_id: Uuid) -> RepositoryResult<()> {
        let mut state = self.state.write().await;
        let before = state.tasks.len();
        state
            .tasks
            .retain(|t| !(t.id == id && t.user_id == owner_id));
        if state.tasks.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn count_by_status(&self, owner_id: Uuid) -> RepositoryResult<StatusCounts> {
        let state = self.state.read().await;
        let mut counts = StatusCounts::default();
        for task in state.tasks.iter().filter(|t| t.user_id == owner_id) {
            counts.set(task.status, counts.get(task.status) + 1);
        }
        Ok(counts)
    }

    async fn latest_update(&self, owner_id: Uuid) -> RepositoryResult<Option<DateTime<Utc>>> {
        let state = self.state.read().await;
        Ok(state
            .tasks
            .iter()
            .filter(|t| t.user_id == owner_id)
            .map(|t| t.updated_at)
            .max())
    }

    async fn belongs_to_owner(&self, id: Uuid, owner_id: Uuid) -> RepositoryResult<bool> {
        let state = self.state.read().await;
        Ok(state
            .tasks
            .iter()
            .any(|t| t.id == id && t.user_id == owner_id))
    }
}
