/// Domain models for TaskHub
///
/// This module contains the stored entities, the inputs used to create or
/// change them, and the public views returned to API clients.
///
/// # Models
///
/// - `user`: User accounts and the public user view
/// - `task`: Tasks, task status, per-status counts and statistics
///
/// # Example
///
/// ```
/// use taskhub_shared::models::task::TaskStatus;
///
/// let status: TaskStatus = "in_progress".parse().unwrap();
/// assert_eq!(status.as_str(), "in_progress");
/// ```

pub mod task;
pub mod user;
