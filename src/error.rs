//! Authentication Error Types
//!
//! Centralized error handling for all authentication operations. Every
//! lower-layer failure (hashing, signing, token parsing, storage) is folded
//! into [`AuthError`] before it reaches a caller.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// Reasons a presented token was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("Token is malformed")]
    Malformed,

    #[error("Token signature is invalid")]
    BadSignature,

    /// Signed with an algorithm outside the HMAC family, or presented as the
    /// wrong token kind.
    #[error("Token uses an unexpected algorithm or kind")]
    WrongAlgorithm,

    #[error("Token has expired")]
    Expired,
}

impl TokenError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            TokenError::Malformed => "token_malformed",
            TokenError::BadSignature => "token_bad_signature",
            TokenError::WrongAlgorithm => "token_wrong_algorithm",
            TokenError::Expired => "token_expired",
        }
    }
}

/// Authentication errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("User not found")]
    NotFound,

    #[error("User already exists")]
    AlreadyExists,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("Storage error")]
    Storage,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error")]
    Internal,
}

impl AuthError {
    /// HTTP status and stable error code for this error
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AuthError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            AuthError::NotFound => (StatusCode::NOT_FOUND, "not_found"),
            AuthError::AlreadyExists => (StatusCode::CONFLICT, "already_exists"),
            AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "invalid_credentials"),
            AuthError::Token(kind) => (StatusCode::UNAUTHORIZED, kind.code()),
            AuthError::Storage => (StatusCode::INTERNAL_SERVER_ERROR, "storage_error"),
            AuthError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "configuration_error"),
            AuthError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status_and_code();

        let message = match &self {
            AuthError::Storage | AuthError::Internal => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        (
            status,
            Json(serde_json::json!({
                "error": error_code,
                "message": message
            })),
        )
            .into_response()
    }
}

/// Failures reported by a [`UserRepository`](crate::repository::UserRepository)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,

    #[error("uniqueness constraint violated")]
    UniqueViolation,

    #[error("storage failure: {0}")]
    Storage(String),
}

impl From<RepositoryError> for AuthError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => AuthError::NotFound,
            RepositoryError::UniqueViolation => AuthError::AlreadyExists,
            RepositoryError::Storage(detail) => {
                tracing::error!(%detail, "Repository failure");
                AuthError::Storage
            }
        }
    }
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepositoryError::NotFound,
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                RepositoryError::UniqueViolation
            }
            other => RepositoryError::Storage(other.to_string()),
        }
    }
}

impl From<argon2::password_hash::Error> for AuthError {
    fn from(err: argon2::password_hash::Error) -> Self {
        tracing::error!("Password hashing error: {:?}", err);
        AuthError::Internal
    }
}
