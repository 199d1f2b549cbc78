//! Authentication Middleware
//!
//! Validates the bearer access token against the service's signing secret and
//! stores the claims in request extensions for extractors.

use crate::error::{AuthError, TokenError};
use crate::handlers::AuthState;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

/// Pull the token out of an `Authorization: Bearer ...` header value
pub(crate) fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    header
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::Token(TokenError::Malformed))
}

/// Require an authenticated caller
pub async fn require_auth(
    State(auth): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let claims = auth.authenticate(bearer_token(header)?)?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
