//! Authentication Configuration
//!
//! All configuration values are loaded from environment variables.
//! No hardcoded secrets or sensitive data.

use crate::error::AuthError;
use std::env;
use std::fmt;

/// Minimum accepted length of the signing secret, in bytes
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

/// Authentication configuration loaded from environment
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC secret for signing tokens (from JWT_SECRET env var)
    pub jwt_secret: String,

    /// Argon2 memory cost in KiB (from ARGON2_MEMORY_COST env var)
    pub argon2_memory_cost: u32,

    /// Argon2 time cost (iterations) (from ARGON2_TIME_COST env var)
    pub argon2_time_cost: u32,

    /// Argon2 parallelism (from ARGON2_PARALLELISM env var)
    pub argon2_parallelism: u32,

    /// Origins allowed by the CORS layer (from CORS_ALLOWED_ORIGINS env var)
    pub cors_allowed_origins: Vec<String>,
}

impl AuthConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, AuthError> {
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| AuthError::Config("JWT_SECRET environment variable must be set".into()))?;

        Ok(Self {
            jwt_secret,

            argon2_memory_cost: env_or("ARGON2_MEMORY_COST", 65536), // 64 MiB

            argon2_time_cost: env_or("ARGON2_TIME_COST", 3),

            argon2_parallelism: env_or("ARGON2_PARALLELISM", 4),

            cors_allowed_origins: parse_origins(
                &env::var("CORS_ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| DEFAULT_CORS_ORIGINS.to_string()),
            ),
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(AuthError::Config(format!(
                "JWT_SECRET must be at least {MIN_JWT_SECRET_LENGTH} bytes"
            )));
        }

        if self.argon2_time_cost == 0 || self.argon2_parallelism == 0 {
            return Err(AuthError::Config(
                "ARGON2_TIME_COST and ARGON2_PARALLELISM must be positive".to_string(),
            ));
        }

        let below_minimum = self
            .argon2_parallelism
            .checked_mul(8)
            .map_or(true, |min| self.argon2_memory_cost < min);
        if below_minimum {
            return Err(AuthError::Config(
                "ARGON2_MEMORY_COST must be at least 8 KiB per lane".to_string(),
            ));
        }

        Ok(())
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("argon2_memory_cost", &self.argon2_memory_cost)
            .field("argon2_time_cost", &self.argon2_time_cost)
            .field("argon2_parallelism", &self.argon2_parallelism)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .finish()
    }
}

fn env_or(key: &str, default: u32) -> u32 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str) -> AuthConfig {
        AuthConfig {
            jwt_secret: secret.to_string(),
            argon2_memory_cost: 65536,
            argon2_time_cost: 3,
            argon2_parallelism: 4,
            cors_allowed_origins: vec!["http://localhost:3000".into()],
        }
    }

    #[test]
    fn test_config_validation() {
        assert!(config(&"a".repeat(32)).validate().is_ok());
    }

    #[test]
    fn test_config_validation_short_secret() {
        assert!(matches!(
            config("short").validate(),
            Err(AuthError::Config(_))
        ));
    }

    #[test]
    fn test_config_validation_argon2_memory() {
        let mut cfg = config(&"a".repeat(32));
        cfg.argon2_memory_cost = 16;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_config_validation_huge_parallelism() {
        let mut cfg = config(&"a".repeat(32));
        cfg.argon2_parallelism = 600_000_000;
        assert!(matches!(cfg.validate(), Err(AuthError::Config(_))));

        cfg.argon2_parallelism = u32::MAX;
        assert!(matches!(cfg.validate(), Err(AuthError::Config(_))));
    }

    #[test]
    fn debug_output_redacts_secret() {
        let rendered = format!("{:?}", config("super-secret-value-that-is-long-enough"));
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn origins_are_split_and_trimmed() {
        assert_eq!(
            parse_origins(" http://a.test , ,http://b.test"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
    }
}
