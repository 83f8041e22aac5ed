/// API route handlers
///
/// - `health`: Liveness endpoint
/// - `auth`: Registration, login and profile
/// - `tasks`: Owner-scoped task CRUD and statistics

pub mod auth;
pub mod health;
pub mod tasks;
