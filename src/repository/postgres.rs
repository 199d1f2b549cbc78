use super::UserRepository;
use crate::error::RepositoryError;
use crate::models::{language_or_default, NewUser, User};

use async_trait::async_trait;
use sqlx::PgPool;

/// Postgres-backed user store
#[derive(Clone)]
pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create the users table and its indexes if missing
    pub async fn migrate(&self) -> Result<(), RepositoryError> {
        tracing::info!("Running user database migrations");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id BIGSERIAL PRIMARY KEY,
                email VARCHAR(255) NOT NULL,
                password_hash VARCHAR(255) NOT NULL,
                first_name VARCHAR(100) NOT NULL,
                last_name VARCHAR(100) NOT NULL,
                country VARCHAR(100) NOT NULL,
                language VARCHAR(16) NOT NULL DEFAULT 'en',
                is_active BOOLEAN NOT NULL DEFAULT TRUE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );
            "#,
        )
        .execute(&self.db)
        .await?;

        // Uniqueness among active users is the registration race backstop
        sqlx::query(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_users_email_active ON users(email) WHERE is_active;",
        )
        .execute(&self.db)
        .await?;

        tracing::info!("User migrations completed successfully");
        Ok(())
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn get_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as("SELECT * FROM users WHERE email = $1 AND is_active")
            .bind(email)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as("SELECT * FROM users WHERE id = $1 AND is_active")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    async fn create(&self, user: NewUser) -> Result<User, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, first_name, last_name, country, language)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.country)
        .bind(language_or_default(&user.language))
        .fetch_one(&self.db)
        .await?;

        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<User, RepositoryError> {
        let updated: Option<User> = sqlx::query_as(
            r#"
            UPDATE users SET
                email = $1,
                first_name = $2,
                last_name = $3,
                country = $4,
                language = $5,
                updated_at = NOW()
            WHERE id = $6 AND is_active
            RETURNING *
            "#,
        )
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.country)
        .bind(language_or_default(&user.language))
        .bind(user.id)
        .fetch_optional(&self.db)
        .await?;

        updated.ok_or(RepositoryError::NotFound)
    }

    async fn delete(&self, id: i64) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE users SET is_active = FALSE, updated_at = NOW() WHERE id = $1 AND is_active",
        )
        .bind(id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn list_active(&self) -> Result<Vec<User>, RepositoryError> {
        let users = sqlx::query_as("SELECT * FROM users WHERE is_active ORDER BY id")
            .fetch_all(&self.db)
            .await?;
        Ok(users)
    }
}
