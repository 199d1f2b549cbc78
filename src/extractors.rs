//! Authentication Extractors

use crate::error::{AuthError, TokenError};
use crate::token::Claims;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

/// Authenticated user information extracted from access token claims
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub email: String,
}

impl AuthUser {
    /// Create user from token claims
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            id: claims.user_id,
            email: claims.email.clone(),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Claims are placed there by `middleware::require_auth`
        parts
            .extensions
            .get::<Claims>()
            .map(AuthUser::from_claims)
            .ok_or(AuthError::Token(TokenError::Malformed))
    }
}

/// JSON request body that has been deserialized and passed `validator` checks
///
/// Undecodable bodies, missing fields and failed validation all reject with
/// `AuthError::Validation`.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AuthError::Validation(rejection.body_text()))?;

        value
            .validate()
            .map_err(|e| AuthError::Validation(e.to_string()))?;

        Ok(Self(value))
    }
}
