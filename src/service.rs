//! Authentication Service
//!
//! Orchestrates registration, login, token refresh and profile changes on top
//! of the credential hasher, the token issuer/validator and a user repository.
//! No state is kept between calls.

use crate::clock::{Clock, SystemClock};
use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::models::*;
use crate::password::CredentialHasher;
use crate::repository::UserRepository;
use crate::token::{Claims, TokenIssuer, TokenKind, TokenValidator, ACCESS_TOKEN_TTL_SECS};

use std::sync::Arc;

/// Authentication service
pub struct AuthService {
    repo: Arc<dyn UserRepository>,
    hasher: CredentialHasher,
    issuer: TokenIssuer,
    validator: TokenValidator,
}

impl AuthService {
    /// Create a new authentication service
    pub fn new(repo: Arc<dyn UserRepository>, config: &AuthConfig) -> Result<Self, AuthError> {
        Self::with_clock(repo, config, Arc::new(SystemClock))
    }

    /// Create a service whose tokens are stamped and checked against `clock`
    pub fn with_clock(
        repo: Arc<dyn UserRepository>,
        config: &AuthConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, AuthError> {
        config.validate()?;

        let secret = config.jwt_secret.as_bytes();

        Ok(Self {
            repo,
            hasher: CredentialHasher::from_config(config)?,
            issuer: TokenIssuer::new(secret, clock.clone()),
            validator: TokenValidator::new(secret, clock),
        })
    }

    /// Get reference to the token validator
    pub fn validator(&self) -> &TokenValidator {
        &self.validator
    }

    /// Validate an access token presented by a caller
    pub fn authenticate(&self, access_token: &str) -> Result<Claims, AuthError> {
        Ok(self.validator.validate(access_token, TokenKind::Access)?)
    }

    fn issue_response(&self, user: User) -> Result<AuthResponse, AuthError> {
        let pair = self.issuer.issue(&user)?;

        Ok(AuthResponse {
            user: user.into(),
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: ACCESS_TOKEN_TTL_SECS,
        })
    }

    // ============================================
    // User Registration
    // ============================================

    /// Register a new user and issue their first token pair
    pub async fn register(&self, req: RegisterRequest) -> Result<AuthResponse, AuthError> {
        let email = normalize_email(&req.email);

        // Fast path only; the repository's uniqueness rule is authoritative
        if self.repo.get_by_email(&email).await?.is_some() {
            return Err(AuthError::AlreadyExists);
        }

        let password_hash = self.hasher.hash(&req.password)?;

        let user = self
            .repo
            .create(NewUser {
                email,
                password_hash,
                first_name: req.first_name,
                last_name: req.last_name,
                country: req.country,
                language: req.language,
            })
            .await?;

        tracing::info!(user_id = user.id, "User registered");

        self.issue_response(user)
    }

    // ============================================
    // Login
    // ============================================

    /// Check credentials and issue a fresh token pair
    pub async fn login(&self, req: LoginRequest) -> Result<AuthResponse, AuthError> {
        let email = normalize_email(&req.email);

        let user = match self.repo.get_by_email(&email).await? {
            Some(user) => user,
            None => {
                self.hasher.verify_dummy(&req.password);
                tracing::warn!("Login failed");
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !self.hasher.verify(&user.password_hash, &req.password) {
            tracing::warn!(user_id = user.id, "Login failed");
            return Err(AuthError::InvalidCredentials);
        }

        tracing::info!(user_id = user.id, "User logged in");

        self.issue_response(user)
    }

    // ============================================
    // Token Refresh
    // ============================================

    /// Exchange a refresh token for a new pair.
    ///
    /// The presented token is not revoked; it stays valid until its own expiry.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthResponse, AuthError> {
        let claims = self.validator.validate(refresh_token, TokenKind::Refresh)?;

        let user = self
            .repo
            .get_by_id(claims.user_id)
            .await?
            .ok_or(AuthError::NotFound)?;

        tracing::info!(user_id = user.id, "Tokens refreshed");

        self.issue_response(user)
    }

    // ============================================
    // Profile Management
    // ============================================

    /// Overwrite a user's profile fields and reissue tokens for the new snapshot
    pub async fn update_profile(
        &self,
        user_id: i64,
        req: UpdateProfileRequest,
    ) -> Result<AuthResponse, AuthError> {
        let mut user = self
            .repo
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::NotFound)?;

        user.email = normalize_email(&req.email);
        user.first_name = req.first_name;
        user.last_name = req.last_name;
        user.country = req.country;
        user.language = language_or_default(&req.language);

        let user = self.repo.update(&user).await?;

        tracing::info!(user_id = user.id, "Profile updated");

        self.issue_response(user)
    }

    /// Delete an account, returning its last snapshot without credentials
    pub async fn delete_account(&self, user_id: i64) -> Result<AuthResponse, AuthError> {
        let mut user = self
            .repo
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::NotFound)?;

        self.repo.delete(user.id).await?;
        user.is_active = false;

        tracing::info!(user_id = user.id, "Account deleted");

        Ok(AuthResponse::without_tokens(user))
    }

    /// All active users
    pub async fn list_active_users(&self) -> Result<Vec<UserResponse>, AuthError> {
        let users = self.repo.list_active().await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }
}
