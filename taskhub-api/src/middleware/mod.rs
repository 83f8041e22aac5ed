/// HTTP middleware
///
/// - `auth`: Bearer token authentication for protected routes

pub mod auth;
