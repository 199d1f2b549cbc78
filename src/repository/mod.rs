//! User Storage Port
//!
//! The service reaches persistent state only through [`UserRepository`].
//! Lookups see active users only. Implementations must enforce that no two
//! active users share an email and report a breach as
//! [`RepositoryError::UniqueViolation`]; the service relies on that, not on
//! its own pre-check, to keep registration race-free.

mod memory;
mod postgres;

pub use memory::InMemoryUserRepository;
pub use postgres::PgUserRepository;

use crate::error::RepositoryError;
use crate::models::{NewUser, User};

use async_trait::async_trait;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Active user with this email
    async fn get_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;

    /// Active user with this id
    async fn get_by_id(&self, id: i64) -> Result<Option<User>, RepositoryError>;

    /// Insert a user; assigns id and timestamps and defaults a blank language
    async fn create(&self, user: NewUser) -> Result<User, RepositoryError>;

    /// Persist the mutable profile fields of an active user
    async fn update(&self, user: &User) -> Result<User, RepositoryError>;

    /// Remove a user from the active set
    async fn delete(&self, id: i64) -> Result<(), RepositoryError>;

    /// All active users, ordered by id
    async fn list_active(&self) -> Result<Vec<User>, RepositoryError>;
}
