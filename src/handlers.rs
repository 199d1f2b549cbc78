//! Authentication HTTP Handlers
//!
//! REST API endpoints for authentication operations.

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::middleware;
use crate::models::*;
use crate::service::AuthService;

use axum::{
    extract::State,
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    middleware as axum_middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Shared auth service state
pub type AuthState = Arc<AuthService>;

// ============================================
// Route Builder
// ============================================

/// Prefix for the versioned API; `/health` stays at the root
pub const API_PREFIX: &str = "/api/v1";

/// Create authentication routes
pub fn create_routes(auth_service: Arc<AuthService>, config: &AuthConfig) -> Router {
    // Public routes (no authentication required)
    let public = Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/refresh", post(refresh_token));

    // Protected routes (require an access token)
    let protected = Router::new()
        .route("/users", get(list_users))
        .route("/users/me", put(update_profile).delete(delete_account))
        .layer(axum_middleware::from_fn_with_state(
            auth_service.clone(),
            middleware::require_auth,
        ));

    Router::new()
        .nest(API_PREFIX, public.merge(protected))
        .route("/health", get(health))
        .layer(cors_layer(&config.cors_allowed_origins))
        .with_state(auth_service)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        // a wildcard cannot be combined with credentials
        .filter(|origin| origin.as_str() != "*")
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ACCEPT,
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-csrf-token"),
        ])
        .expose_headers([header::LINK])
        .allow_credentials(true)
        .max_age(Duration::from_secs(300))
}

// ============================================
// Registration / Login
// ============================================

/// POST /api/v1/auth/register
///
/// Register a new user account
pub async fn register(
    State(auth): State<AuthState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let response = auth.register(req).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/auth/login
///
/// Authenticate user and return access/refresh tokens
pub async fn login(
    State(auth): State<AuthState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let response = auth.login(req).await?;

    Ok(Json(response))
}

/// POST /api/v1/auth/logout
///
/// Tokens are stateless; the client discards them
pub async fn logout() -> impl IntoResponse {
    Json(MessageResponse::new("Logged out successfully"))
}

/// POST /api/v1/auth/refresh
pub async fn refresh_token(
    State(auth): State<AuthState>,
    ValidatedJson(req): ValidatedJson<RefreshTokenRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let response = auth.refresh(&req.refresh_token).await?;

    Ok(Json(response))
}

// ============================================
// Users
// ============================================

/// GET /api/v1/users
pub async fn list_users(
    State(auth): State<AuthState>,
    _user: AuthUser,
) -> Result<impl IntoResponse, AuthError> {
    Ok(Json(auth.list_active_users().await?))
}

/// PUT /api/v1/users/me
pub async fn update_profile(
    State(auth): State<AuthState>,
    user: AuthUser,
    ValidatedJson(req): ValidatedJson<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let response = auth.update_profile(user.id, req).await?;

    Ok(Json(response))
}

/// DELETE /api/v1/users/me
pub async fn delete_account(
    State(auth): State<AuthState>,
    user: AuthUser,
) -> Result<impl IntoResponse, AuthError> {
    Ok(Json(auth.delete_account(user.id).await?))
}

/// GET /health
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}
