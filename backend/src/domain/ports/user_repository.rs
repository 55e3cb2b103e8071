//! Driven port for account persistence.

use async_trait::async_trait;

use crate::domain::user::{Role, User, UserId};

use super::paging::{Page, PageRequest};

/// Persistence errors raised by [`UserRepository`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserRepositoryError {
    /// Repository connection could not be established.
    #[error("user repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("user repository query failed: {message}")]
    Query { message: String },
    /// An account with the same email already exists.
    #[error("email already registered")]
    DuplicateEmail,
}

impl UserRepositoryError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Partial profile update; `None` fields are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub phone: Option<String>,
}

/// Filters for the admin account listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub role: Option<Role>,
    pub active: Option<bool>,
}

/// Partial admin account update; `None` fields are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<Role>,
    pub active: Option<bool>,
}

/// Persistence port for accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account; duplicate emails are rejected.
    async fn insert(&self, user: &User) -> Result<(), UserRepositoryError>;

    /// Fetch an account by login email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserRepositoryError>;

    /// Fetch an account by id.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserRepositoryError>;

    /// Apply a partial profile update, returning the updated account when
    /// found.
    async fn update_profile(
        &self,
        id: UserId,
        changes: ProfileChanges,
    ) -> Result<Option<User>, UserRepositoryError>;

    /// Filtered, paginated account listing, newest first.
    async fn list(
        &self,
        filter: UserFilter,
        page: PageRequest,
    ) -> Result<Page<User>, UserRepositoryError>;

    /// Apply a partial admin update, returning the updated account when
    /// found. An email change colliding with another account is rejected as
    /// [`UserRepositoryError::DuplicateEmail`].
    async fn update_account(
        &self,
        id: UserId,
        changes: AccountChanges,
    ) -> Result<Option<User>, UserRepositoryError>;

    /// Replace the stored password digest. Returns false when no such
    /// account exists.
    async fn set_password_digest(
        &self,
        id: UserId,
        digest: &str,
    ) -> Result<bool, UserRepositoryError>;
}
