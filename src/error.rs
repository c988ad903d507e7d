use axum::{Json, extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;

/// Why a bearer token could not be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
pub enum DecodeError {
    #[error("token is malformed or its signature does not verify")]
    Invalid,

    #[error("token has expired")]
    Expired,
}

/// Request-time authentication failures. Every variant except
/// `LookupFailed` is reported to the caller as 401.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,

    #[error("invalid credentials: {0}")]
    InvalidCredentials(#[source] DecodeError),

    #[error("token subject no longer exists")]
    Unauthorized,

    #[error("invalid username or password")]
    InvalidLogin,

    #[error("identity lookup failed: {0}")]
    LookupFailed(String),
}

impl From<DecodeError> for AuthError {
    fn from(e: DecodeError) -> Self {
        AuthError::InvalidCredentials(e)
    }
}

#[derive(Debug, ThisError)]
pub enum BookstoreError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("{0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Token signing error: {0}")]
    TokenSigning(#[from] jsonwebtoken::errors::Error),

    #[error("Request timed out")]
    Timeout,
}

/// Unreadable request bodies are reported like any other invalid input.
impl From<JsonRejection> for BookstoreError {
    fn from(rejection: JsonRejection) -> Self {
        BookstoreError::Validation(rejection.body_text())
    }
}

impl BookstoreError {
    pub fn not_found(entity: &str, id: i64) -> Self {
        BookstoreError::NotFound(format!("{entity} with ID {id} not found"))
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        BookstoreError::Validation(msg.into())
    }

    /// True when the underlying database rejected a UNIQUE constraint.
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, BookstoreError::DatabaseError(e)
            if e.as_database_error().is_some_and(|d| d.is_unique_violation()))
    }

    /// True when the underlying database rejected a FOREIGN KEY constraint.
    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(self, BookstoreError::DatabaseError(e)
            if e.as_database_error().is_some_and(|d| d.is_foreign_key_violation()))
    }
}

impl IntoResponse for BookstoreError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_body) = match self {
            BookstoreError::Auth(AuthError::LookupFailed(_))
            | BookstoreError::DatabaseError(_)
            | BookstoreError::PasswordHash(_)
            | BookstoreError::TokenSigning(_) => {
                let status = StatusCode::INTERNAL_SERVER_ERROR;
                let body = ApiErrorBody {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred.".to_string(),
                };
                (status, body)
            }
            BookstoreError::Auth(AuthError::InvalidLogin) => {
                let status = StatusCode::UNAUTHORIZED;
                let body = ApiErrorBody {
                    code: "UNAUTHORIZED".to_string(),
                    message: "Invalid username or password.".to_string(),
                };
                (status, body)
            }
            BookstoreError::Auth(_) => {
                let status = StatusCode::UNAUTHORIZED;
                let body = ApiErrorBody {
                    code: "UNAUTHORIZED".to_string(),
                    message: "Authentication error.".to_string(),
                };
                (status, body)
            }
            BookstoreError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                ApiErrorBody {
                    code: "NOT_FOUND".to_string(),
                    message,
                },
            ),
            BookstoreError::Validation(message) => (
                StatusCode::BAD_REQUEST,
                ApiErrorBody {
                    code: "BAD_REQUEST".to_string(),
                    message,
                },
            ),
            BookstoreError::Conflict(message) => (
                StatusCode::CONFLICT,
                ApiErrorBody {
                    code: "CONFLICT".to_string(),
                    message,
                },
            ),
            BookstoreError::Timeout => (
                StatusCode::REQUEST_TIMEOUT,
                ApiErrorBody {
                    code: "REQUEST_TIMEOUT".to_string(),
                    message: "The request took too long to complete.".to_string(),
                },
            ),
        };
        (status, Json(ApiErrorResponse { error: error_body })).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}
