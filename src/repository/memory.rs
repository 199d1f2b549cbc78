use super::UserRepository;
use crate::error::RepositoryError;
use crate::models::{language_or_default, NewUser, User};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Inner {
    next_id: i64,
    users: Vec<User>,
}

/// Process-local repository with the same rules as the Postgres one:
/// soft deletes and email uniqueness among active users.
#[derive(Default)]
pub struct InMemoryUserRepository {
    inner: RwLock<Inner>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows, deleted ones included
    pub async fn row_count(&self) -> usize {
        self.inner.read().await.users.len()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .iter()
            .find(|u| u.is_active && u.email == email)
            .cloned())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .iter()
            .find(|u| u.is_active && u.id == id)
            .cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, RepositoryError> {
        let mut inner = self.inner.write().await;

        if inner
            .users
            .iter()
            .any(|u| u.is_active && u.email == user.email)
        {
            return Err(RepositoryError::UniqueViolation);
        }

        inner.next_id += 1;
        let now = Utc::now();
        let created = User {
            id: inner.next_id,
            email: user.email,
            password_hash: user.password_hash,
            first_name: user.first_name,
            last_name: user.last_name,
            country: user.country,
            language: language_or_default(&user.language),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        inner.users.push(created.clone());

        Ok(created)
    }

    async fn update(&self, user: &User) -> Result<User, RepositoryError> {
        let mut inner = self.inner.write().await;

        let index = inner
            .users
            .iter()
            .position(|u| u.is_active && u.id == user.id)
            .ok_or(RepositoryError::NotFound)?;

        if inner
            .users
            .iter()
            .any(|u| u.is_active && u.id != user.id && u.email == user.email)
        {
            return Err(RepositoryError::UniqueViolation);
        }

        let stored = &mut inner.users[index];
        stored.email = user.email.clone();
        stored.first_name = user.first_name.clone();
        stored.last_name = user.last_name.clone();
        stored.country = user.country.clone();
        stored.language = language_or_default(&user.language);
        stored.updated_at = Utc::now();

        Ok(stored.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), RepositoryError> {
        let mut inner = self.inner.write().await;

        let stored = inner
            .users
            .iter_mut()
            .find(|u| u.is_active && u.id == id)
            .ok_or(RepositoryError::NotFound)?;

        stored.is_active = false;
        stored.updated_at = Utc::now();

        Ok(())
    }

    async fn list_active(&self) -> Result<Vec<User>, RepositoryError> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().filter(|u| u.is_active).cloned().collect())
    }
}
