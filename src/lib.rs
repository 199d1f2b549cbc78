//! User Authentication Plugin
//!
//! Account authentication for a web API:
//! - User registration, login and profile management
//! - Argon2id password hashing with an explicit input-length limit
//! - HMAC-signed JWT access (15 minutes) and refresh (7 days) tokens
//! - Token kind tagging so a refresh token never passes as an access token
//! - Postgres storage behind a narrow repository port
//!
//! Tokens are stateless. Nothing is recorded server-side when they are issued,
//! so a token cannot be revoked before its expiry except by rotating the
//! signing secret.
//!
//! # Configuration
//!
//! All configuration is loaded from environment variables:
//! - `JWT_SECRET` - Secret key for signing JWTs (required, min 32 bytes)
//! - `ARGON2_MEMORY_COST` - Argon2 memory cost in KiB (default: 65536)
//! - `ARGON2_TIME_COST` - Argon2 iterations (default: 3)
//! - `ARGON2_PARALLELISM` - Argon2 lanes (default: 4)
//! - `CORS_ALLOWED_ORIGINS` - Comma separated origins (default: local dev servers)
//!
//! # Usage
//!
//! ```rust,ignore
//! use user_auth::{AuthPlugin, Plugin};
//!
//! let plugin = AuthPlugin::new();
//! plugin.activate(db_pool).await?;
//!
//! let app = plugin.router().await.expect("plugin is active");
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod repository;
pub mod service;
pub mod token;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::AuthConfig;
pub use error::{AuthError, RepositoryError, TokenError};
pub use extractors::{AuthUser, ValidatedJson};
pub use handlers::{create_routes, AuthState};
pub use models::*;
pub use password::CredentialHasher;
pub use repository::{InMemoryUserRepository, PgUserRepository, UserRepository};
pub use service::AuthService;
pub use token::{Claims, TokenIssuer, TokenKind, TokenPair, TokenValidator};

use async_trait::async_trait;
use axum::Router;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::RwLock;

// ============================================
// Plugin Types
// ============================================

/// Plugin state enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginState {
    Inactive,
    Active,
    Error,
}

/// Plugin metadata
#[derive(Debug, Clone)]
pub struct PluginInfo {
    pub id: String,
    pub name: String,
    pub version: String,
    pub description: String,
}

/// Plugin lifecycle trait
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Get plugin information
    fn info(&self) -> &PluginInfo;

    /// Get current plugin state
    async fn state(&self) -> PluginState;

    /// Activate the plugin
    async fn activate(&self, db: PgPool) -> Result<(), AuthError>;

    /// Deactivate the plugin
    async fn deactivate(&self) -> Result<(), AuthError>;
}

// ============================================
// Auth Plugin Implementation
// ============================================

/// Authentication plugin
///
/// Owns the process-wide configuration and the service built from it. The
/// signing secret is read once on activation and never changes afterwards.
pub struct AuthPlugin {
    info: PluginInfo,
    state: RwLock<PluginState>,
    config: RwLock<Option<AuthConfig>>,
    auth_service: RwLock<Option<Arc<AuthService>>>,
}

impl AuthPlugin {
    /// Create a new auth plugin instance
    pub fn new() -> Self {
        Self {
            info: PluginInfo {
                id: "user-auth".into(),
                name: "User Authentication".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                description: "Account registration, login and session tokens".into(),
            },
            state: RwLock::new(PluginState::Inactive),
            config: RwLock::new(None),
            auth_service: RwLock::new(None),
        }
    }

    /// Get the authentication configuration
    pub async fn config(&self) -> Option<AuthConfig> {
        self.config.read().await.clone()
    }

    /// Get the authentication service
    pub async fn auth_service(&self) -> Option<Arc<AuthService>> {
        self.auth_service.read().await.clone()
    }

    /// Router with every auth endpoint, available once active
    pub async fn router(&self) -> Option<Router> {
        let service = self.auth_service().await?;
        let config = self.config().await?;
        Some(create_routes(service, &config))
    }

    async fn start(&self, db: PgPool) -> Result<(), AuthError> {
        let config = AuthConfig::from_env()?;
        config.validate()?;

        let repo = PgUserRepository::new(db);
        repo.migrate().await?;

        let auth_service = Arc::new(AuthService::new(Arc::new(repo), &config)?);

        *self.config.write().await = Some(config);
        *self.auth_service.write().await = Some(auth_service);

        Ok(())
    }
}

impl Default for AuthPlugin {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Plugin for AuthPlugin {
    fn info(&self) -> &PluginInfo {
        &self.info
    }

    async fn state(&self) -> PluginState {
        *self.state.read().await
    }

    async fn activate(&self, db: PgPool) -> Result<(), AuthError> {
        tracing::info!("Activating authentication plugin");

        if let Err(err) = self.start(db).await {
            tracing::error!(error = %err, "Authentication plugin failed to activate");
            *self.state.write().await = PluginState::Error;
            return Err(err);
        }

        *self.state.write().await = PluginState::Active;

        tracing::info!("Authentication plugin activated successfully");
        Ok(())
    }

    async fn deactivate(&self) -> Result<(), AuthError> {
        tracing::info!("Deactivating authentication plugin");

        *self.auth_service.write().await = None;
        *self.config.write().await = None;
        *self.state.write().await = PluginState::Inactive;

        tracing::info!("Authentication plugin deactivated");
        Ok(())
    }
}

// ============================================
// Module Tests
// ============================================
