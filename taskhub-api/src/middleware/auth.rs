/// Bearer token authentication
///
/// [`require_auth`] reads `Authorization: Bearer <token>`, asks the
/// credential service to validate it, and stores the asserted user ID in the
/// request extensions as [`AuthUser`]. Handlers behind the layer take it with
/// `Extension<AuthUser>` and pass the ID explicitly to the services.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{app::AppState, error::ApiError};

/// Authenticated caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub Uuid);

/// Rejects requests without a valid session token
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("missing authorization header".to_string()))?;

    let token = bearer_token(auth_header)
        .ok_or_else(|| ApiError::Unauthorized("expected bearer token".to_string()))?;

    let user_id = state.auth.validate_token(token)?;

    req.extensions_mut().insert(AuthUser(user_id));

    Ok(next.run(req).await)
}

/// Extracts the token from a `Bearer` authorization value
///
/// The scheme is matched case-insensitively.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }
    Some(token)
}
