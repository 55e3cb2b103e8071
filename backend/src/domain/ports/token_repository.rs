//! Driven port for issued bearer-token digests.
//!
//! Only SHA-256 digests of tokens are stored; the raw token exists solely in
//! the response that issued it.

use async_trait::async_trait;

use crate::domain::user::{Caller, UserId};

/// Persistence errors raised by [`TokenRepository`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenRepositoryError {
    /// Repository connection could not be established.
    #[error("token repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("token repository query failed: {message}")]
    Query { message: String },
}

impl TokenRepositoryError {
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

/// Persistence port for bearer-token digests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Record a newly issued token digest for a user.
    async fn insert(&self, digest: &str, user_id: UserId) -> Result<(), TokenRepositoryError>;

    /// Resolve a digest to its caller, rejecting inactive accounts.
    async fn resolve(&self, digest: &str) -> Result<Option<Caller>, TokenRepositoryError>;

    /// Revoke a digest; returns whether a token matched.
    async fn revoke(&self, digest: &str) -> Result<bool, TokenRepositoryError>;
}
