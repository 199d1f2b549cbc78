//! Authentication Models
//!
//! Data structures for authentication requests, responses, and database entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Language assigned when none is supplied
pub const DEFAULT_LANGUAGE: &str = "en";

// ============================================
// Database Entities
// ============================================

/// User entity from database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub country: String,
    pub language: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user about to be inserted; storage assigns id and timestamps
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub country: String,
    pub language: String,
}

/// Returns `language`, or the default when it is blank
pub fn language_or_default(language: &str) -> String {
    let language = language.trim();
    if language.is_empty() {
        DEFAULT_LANGUAGE.to_string()
    } else {
        language.to_string()
    }
}

/// Canonical form used for storage and lookups
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// ============================================
// Request DTOs
// ============================================

/// Login request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Registration request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, max = 72, message = "Password must be 8-72 characters"))]
    pub password: String,

    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: String,

    #[validate(length(min = 1, max = 100, message = "Country is required"))]
    pub country: String,

    #[serde(default)]
    #[validate(length(max = 16, message = "Language must be at most 16 characters"))]
    pub language: String,
}

/// Refresh token request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// Profile update; every field overwrites the stored value
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: String,

    #[validate(length(min = 1, max = 100, message = "Country is required"))]
    pub country: String,

    #[serde(default)]
    #[validate(length(max = 16, message = "Language must be at most 16 characters"))]
    pub language: String,
}

// ============================================
// Response DTOs
// ============================================

/// User response (public user data without sensitive fields)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub country: String,
    pub language: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            country: user.country,
            language: user.language,
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Authentication response with tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Seconds until the access token expires; zero when no tokens were issued
    pub expires_in: i64,
}

impl AuthResponse {
    /// Envelope carrying no usable credentials
    pub fn without_tokens(user: User) -> Self {
        Self {
            user: user.into(),
            access_token: String::new(),
            refresh_token: String::new(),
            token_type: "Bearer".to_string(),
            expires_in: 0,
        }
    }
}

/// Simple message response
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::password::MAX_PASSWORD_BYTES;

    fn user() -> User {
        let now = Utc::now();
        User {
            id: 7,
            email: "a@x.com".into(),
            password_hash: "$argon2id$v=19$m=4096,t=1,p=1$c2FsdA$aGFzaA".into(),
            first_name: "A".into(),
            last_name: "B".into(),
            country: "US".into(),
            language: "en".into(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let json = serde_json::to_value(user()).unwrap();
        assert!(json.get("password_hash").is_none());

        let json = serde_json::to_string(&AuthResponse::without_tokens(user())).unwrap();
        assert!(!json.contains("argon2"));
    }

    #[test]
    fn blank_language_defaults_to_en() {
        assert_eq!(language_or_default(""), "en");
        assert_eq!(language_or_default("  "), "en");
        assert_eq!(language_or_default("fr"), "fr");
    }

    #[test]
    fn emails_are_normalized() {
        assert_eq!(normalize_email("  A@X.Com "), "a@x.com");
    }

    #[test]
    fn register_request_rejects_oversized_password() {
        let req = RegisterRequest {
            email: "a@x.com".into(),
            password: "p".repeat(MAX_PASSWORD_BYTES + 1),
            first_name: "A".into(),
            last_name: "B".into(),
            country: "US".into(),
            language: String::new(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn deleted_envelope_has_no_tokens() {
        let response = AuthResponse::without_tokens(user());
        assert!(response.access_token.is_empty());
        assert!(response.refresh_token.is_empty());
        assert_eq!(response.expires_in, 0);
    }
}
