//! Driven port for cart persistence.

use async_trait::async_trait;

use crate::domain::cart::CartLine;
use crate::domain::product::ProductId;
use crate::domain::user::UserId;

/// Persistence errors raised by [`CartRepository`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CartRepositoryError {
    /// Repository connection could not be established.
    #[error("cart repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("cart repository query failed: {message}")]
    Query { message: String },
}

impl CartRepositoryError {
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

/// Persistence port for cart lines.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// All lines for a user joined with current product state, oldest first.
    async fn lines_for_user(&self, user_id: UserId) -> Result<Vec<CartLine>, CartRepositoryError>;

    /// Add `quantity` to the user's line for the product, creating the line
    /// when absent.
    async fn add_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<(), CartRepositoryError>;

    /// Replace the quantity of an existing line; returns whether a line
    /// matched.
    async fn set_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<bool, CartRepositoryError>;

    /// Remove one line; returns whether a line matched.
    async fn remove_line(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<bool, CartRepositoryError>;

    /// Remove every line for the user.
    async fn clear(&self, user_id: UserId) -> Result<(), CartRepositoryError>;
}
