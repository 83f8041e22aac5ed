/// Credential service: registration, login and session tokens
///
/// The signing secret is injected once at construction and never changes.
/// Every method that concerns a user takes the user ID explicitly.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use taskhub_shared::repository::memory::InMemoryStore;
/// use taskhub_shared::services::auth::{AuthService, RegisterInput};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = InMemoryStore::new();
/// let auth = AuthService::new(Arc::new(store.users()), "test-secret-key-at-least-32-bytes-long");
///
/// let response = auth
///     .register(RegisterInput {
///         username: "alice".to_string(),
///         email: "alice@x.com".to_string(),
///         password: "password123".to_string(),
///     })
///     .await?;
///
/// assert_eq!(auth.validate_token(&response.token)?, response.user.id);
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::error::{ServiceError, ServiceResult};
use crate::auth::{jwt, password};
use crate::models::user::{AuthResponse, CreateUser, UserResponse};
use crate::repository::{RepositoryError, UserRepository};

/// Registration input (already validated for shape by the caller)
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Login input
#[derive(Debug, Clone)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

/// Credential service
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    jwt_secret: String,
}

impl AuthService {
    /// Creates a credential service over a user repository and a signing secret
    pub fn new(users: Arc<dyn UserRepository>, jwt_secret: impl Into<String>) -> Self {
        Self {
            users,
            jwt_secret: jwt_secret.into(),
        }
    }

    /// Registers a new user and returns a session token for them
    ///
    /// Username is checked before email; the first collision wins.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if the password is too short
    /// - `UsernameTaken` / `EmailTaken` on collision, including a collision
    ///   the store catches after the pre-checks
    /// - `Internal` on any other store or hashing failure
    pub async fn register(&self, input: RegisterInput) -> ServiceResult<AuthResponse> {
        password::validate_password_length(&input.password)
            .map_err(ServiceError::ValidationFailed)?;

        if self.users.exists_by_username(&input.username).await.map_err(internal)? {
            return Err(ServiceError::UsernameTaken);
        }
        if self.users.exists_by_email(&input.email).await.map_err(internal)? {
            return Err(ServiceError::EmailTaken);
        }

        let password_hash = password::hash_password(&input.password)?;

        let user = self
            .users
            .create(CreateUser {
                username: input.username,
                email: input.email,
                password_hash,
            })
            .await
            .map_err(classify_create_error)?;

        let token = self.issue_token(user.id)?;

        info!(user_id = %user.id, username = %user.username, "User registered");

        Ok(AuthResponse {
            token,
            user: UserResponse::from(user),
        })
    }

    /// Authenticates a user by username and password
    ///
    /// # Errors
    ///
    /// `InvalidCredentials` for an unknown username, a wrong password or an
    /// unparsable stored hash. The three cases are indistinguishable to the
    /// caller.
    pub async fn login(&self, input: LoginInput) -> ServiceResult<AuthResponse> {
        let user = match self.users.find_by_username(&input.username).await {
            Ok(user) => user,
            Err(RepositoryError::NotFound) => {
                debug!(username = %input.username, "Login for unknown username");
                return Err(ServiceError::InvalidCredentials);
            }
            Err(e) => return Err(internal(e)),
        };

        match password::verify_password(&input.password, &user.password_hash) {
            Ok(true) => {}
            Ok(false) => {
                debug!(user_id = %user.id, "Login with wrong password");
                return Err(ServiceError::InvalidCredentials);
            }
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "Stored password hash is unusable");
                return Err(ServiceError::InvalidCredentials);
            }
        }

        let token = self.issue_token(user.id)?;

        info!(user_id = %user.id, "User logged in");

        Ok(AuthResponse {
            token,
            user: UserResponse::from(user),
        })
    }

    /// Validates a session token and returns the user ID it asserts
    ///
    /// # Errors
    ///
    /// `InvalidToken` for every failure (signature, algorithm, format, expiry).
    pub fn validate_token(&self, token: &str) -> ServiceResult<Uuid> {
        jwt::validate_token(token, &self.jwt_secret)
            .map(|claims| claims.sub)
            .map_err(|e| {
                debug!(error = %e, "Rejected session token");
                ServiceError::InvalidToken
            })
    }

    /// Returns the public view of a user
    ///
    /// # Errors
    ///
    /// `NotFound` if the user does not exist
    pub async fn get_profile(&self, user_id: Uuid) -> ServiceResult<UserResponse> {
        let user = self.users.find_by_id(user_id).await?;
        Ok(UserResponse::from(user))
    }

    /// Signs a fresh 24 hour session token for a user
    pub fn issue_token(&self, user_id: Uuid) -> ServiceResult<String> {
        jwt::create_token(&jwt::Claims::new(user_id), &self.jwt_secret)
            .map_err(|e| ServiceError::Internal(e.to_string()))
    }
}

fn internal(err: RepositoryError) -> ServiceError {
    ServiceError::Internal(err.to_string())
}

fn classify_create_error(err: RepositoryError) -> ServiceError {
    match err {
        RepositoryError::ConstraintViolation(constraint) if constraint.contains("username") => {
            ServiceError::UsernameTaken
        }
        RepositoryError::ConstraintViolation(constraint) if constraint.contains("email") => {
            ServiceError::EmailTaken
        }
        RepositoryError::ConstraintViolation(constraint) => {
            ServiceError::ConstraintViolation(constraint)
        }
        other => internal(other),
    }
}
