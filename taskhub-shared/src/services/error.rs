/// Service error taxonomy
///
/// A closed set of failure kinds. The HTTP layer maps each variant to a
/// status code by matching on the variant, never on the message text.

use crate::auth::password::PasswordError;
use crate::repository::RepositoryError;

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors returned by the credential and task services
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Input rejected before touching the store
    #[error("{0}")]
    ValidationFailed(String),

    #[error("username already taken")]
    UsernameTaken,

    #[error("email already registered")]
    EmailTaken,

    /// Unknown username, wrong password or unusable stored hash
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Bad signature, wrong algorithm, malformed or expired token
    #[error("invalid token")]
    InvalidToken,

    #[error("resource not found")]
    NotFound,

    /// The task does not exist or is owned by someone else
    #[error("task not found or unauthorized")]
    NotFoundOrUnauthorized,

    #[error("invalid status filter")]
    InvalidFilter,

    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    /// Unclassified store or crypto failure; the detail is for logs only
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => ServiceError::NotFound,
            RepositoryError::ConstraintViolation(constraint) => {
                ServiceError::ConstraintViolation(constraint)
            }
            RepositoryError::Database(e) => ServiceError::Internal(e.to_string()),
        }
    }
}

impl From<PasswordError> for ServiceError {
    fn from(err: PasswordError) -> Self {
        ServiceError::Internal(err.to_string())
    }
}
