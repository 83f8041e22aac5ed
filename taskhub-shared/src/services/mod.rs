/// Business services for TaskHub
///
/// - [`auth`]: credential service (register, login, session tokens, profile)
/// - [`task`]: owner-scoped task operations and statistics
/// - [`error`]: the [`ServiceError`](error::ServiceError) taxonomy both return
///
/// Services hold their repositories as `Arc<dyn …>` trait objects, so the
/// same service code runs against PostgreSQL or the in-memory store.

pub mod auth;
pub mod error;
pub mod task;

pub use error::{ServiceError, ServiceResult};
