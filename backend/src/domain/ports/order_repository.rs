//! Driven port for order persistence.
//!
//! Placement and cancellation are single transactional operations on this
//! port: the adapter must make every stock mutation and the order write
//! visible atomically, holding row locks on the touched products between the
//! stock check and the decrement.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::checkout::CheckoutPolicy;
use crate::domain::order::{Order, OrderId, OrderStatus, PaymentMethod, ShippingAddress};
use crate::domain::product::ProductId;
use crate::domain::user::UserId;

use super::paging::{Page, PageRequest};

/// One requested line of a new order, before pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemRequest {
    /// The product to order.
    pub product_id: ProductId,
    /// Requested quantity, at least 1 (validated by the service).
    pub quantity: i32,
}

/// A validated order request handed to the placement transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
    pub user_id: UserId,
    /// Processed in input order.
    pub items: Vec<ItemRequest>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub customer_note: String,
}

/// Failures surfaced by the placement transaction.
///
/// Any variant other than success means the transaction rolled back: no
/// stock was decremented, no order exists, and the cart is untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlaceOrderError {
    /// A requested product does not exist or is inactive.
    #[error("product not found: {product_id}")]
    ProductNotFound { product_id: ProductId },
    /// A requested product has fewer units than requested.
    #[error("insufficient stock for {product_name}: {available} available")]
    InsufficientStock {
        product_name: String,
        available: i32,
    },
    /// Repository connection could not be established.
    #[error("order repository connection failed: {message}")]
    Connection { message: String },
    /// Transaction failed during execution and was rolled back.
    #[error("order repository query failed: {message}")]
    Query { message: String },
}

/// Failures surfaced by the cancellation transaction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CancelOrderError {
    /// No order with the given id exists.
    #[error("order not found")]
    NotFound,
    /// The order belongs to a different user.
    #[error("order is owned by another user")]
    NotOwned,
    /// The order status no longer permits customer cancellation.
    #[error("order in status {status} cannot be cancelled")]
    NotCancellable { status: OrderStatus },
    /// Repository connection could not be established.
    #[error("order repository connection failed: {message}")]
    Connection { message: String },
    /// Transaction failed during execution and was rolled back.
    #[error("order repository query failed: {message}")]
    Query { message: String },
}

/// Failures surfaced by the admin status update.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SetStatusError {
    /// No order with the given id exists.
    #[error("order not found")]
    NotFound,
    /// Repository connection could not be established.
    #[error("order repository connection failed: {message}")]
    Connection { message: String },
    /// Update failed during execution.
    #[error("order repository query failed: {message}")]
    Query { message: String },
}

/// Persistence errors raised by read operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderRepositoryError {
    /// Repository connection could not be established.
    #[error("order repository connection failed: {message}")]
    Connection { message: String },
    /// Query failed during execution.
    #[error("order repository query failed: {message}")]
    Query { message: String },
}

impl OrderRepositoryError {
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

/// Filters for the admin order listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    /// Newest first when true (the default).
    pub newest_first: bool,
}

impl Default for OrderFilter {
    fn default() -> Self {
        Self {
            status: None,
            newest_first: true,
        }
    }
}

/// Dashboard statistics across all orders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderStatistics {
    /// Sum of order totals, excluding cancelled orders.
    pub total_sales: Decimal,
    pub pending: i64,
    pub processing: i64,
    pub shipped: i64,
    pub delivered: i64,
    pub cancelled: i64,
}

/// Persistence port for orders.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Atomically validate stock, decrement inventory, price the order with
    /// the supplied policy, persist it with an initial `pending` history
    /// entry, and clear the user's cart. On any error every effect is rolled
    /// back.
    async fn place(
        &self,
        draft: OrderDraft,
        policy: CheckoutPolicy,
    ) -> Result<Order, PlaceOrderError>;

    /// Atomically restock every line item (skipping products that no longer
    /// exist), mark the order cancelled, and append a history entry. Only
    /// permitted while the order is owned by `owner` and still
    /// pending/processing.
    async fn cancel(&self, order_id: OrderId, owner: UserId) -> Result<Order, CancelOrderError>;

    /// Set any status and append a history entry; never touches stock.
    async fn set_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
        comment: String,
    ) -> Result<Order, SetStatusError>;

    /// Fetch an order by id.
    async fn find_by_id(&self, order_id: OrderId)
        -> Result<Option<Order>, OrderRepositoryError>;

    /// All orders for a user, newest first.
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, OrderRepositoryError>;

    /// Filtered, paginated admin listing.
    async fn list_page(
        &self,
        filter: OrderFilter,
        page: PageRequest,
    ) -> Result<Page<Order>, OrderRepositoryError>;

    /// Dashboard statistics across all orders.
    async fn statistics(&self) -> Result<OrderStatistics, OrderRepositoryError>;
}
