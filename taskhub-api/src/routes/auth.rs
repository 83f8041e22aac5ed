/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/v1/auth/register` - Register a new user
/// - `POST /api/v1/auth/login` - Log in and get a session token
/// - `GET /api/v1/auth/profile` - Current user's public profile (bearer)

use crate::{
    app::AppState,
    error::ApiResult,
    extract::ValidatedJson,
    middleware::auth::AuthUser,
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Deserialize;
use taskhub_shared::{
    models::user::{AuthResponse, UserResponse},
    services::auth::{LoginInput, RegisterInput},
};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Register a new user
///
/// ```text
/// POST /api/v1/auth/register
/// Content-Type: application/json
///
/// { "username": "alice", "email": "alice@x.com", "password": "password123" }
/// ```
///
/// # Response
///
/// `201 Created`:
///
/// ```json
/// {
///   "token": "eyJ...",
///   "user": { "id": "uuid", "username": "alice", "email": "alice@x.com", "created_at": "..." }
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `409 Conflict`: Username or email already taken
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let response = state
        .auth
        .register(RegisterInput {
            username: req.username,
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// Log in with username and password
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: Invalid credentials (same response for unknown
///   username and wrong password)
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let response = state
        .auth
        .login(LoginInput {
            username: req.username,
            password: req.password,
        })
        .await?;

    Ok(Json(response))
}

/// Current user's public profile
pub async fn profile(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> ApiResult<Json<UserResponse>> {
    Ok(Json(state.auth.get_profile(user_id).await?))
}
