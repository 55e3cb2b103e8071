//! Driving ports for order operations.
//!
//! [`OrderCommand`] covers placement, cancellation, and the admin status
//! update; [`OrderQuery`] covers the customer and admin read paths. Both are
//! consumed by HTTP handlers and implemented by the order service.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::order::{
    Order, OrderId, OrderItem, OrderStatus, PaymentMethod, ShippingAddress, StatusHistoryEntry,
};
use crate::domain::product::ProductId;
use crate::domain::user::Caller;
use crate::domain::Error;

use super::order_repository::OrderStatistics;

/// One requested line in a placement request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderItem {
    /// The product to order.
    pub product_id: ProductId,
    /// Requested quantity, at least 1.
    pub quantity: i32,
}

/// Request body for placing an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    /// Requested lines, processed in order.
    pub items: Vec<PlaceOrderItem>,
    /// Destination address.
    pub shipping_address: ShippingAddress,
    /// Payment method; defaults to card.
    #[serde(default)]
    pub payment_method: PaymentMethod,
    /// Optional free-text note.
    #[serde(default)]
    pub customer_note: String,
}

/// Request body for the admin status update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetOrderStatusRequest {
    /// The status to enter.
    pub status: OrderStatus,
    /// Optional operator comment recorded in the history.
    #[serde(default)]
    pub comment: Option<String>,
}

/// Query parameters for the admin order listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListOrdersRequest {
    /// Restrict to one status when set.
    #[serde(default)]
    pub status: Option<OrderStatus>,
    /// 1-based page number; defaults to the first page.
    #[serde(default)]
    pub page: Option<u32>,
    /// Page size; clamped server-side.
    #[serde(default)]
    pub per_page: Option<u32>,
}

/// A full order as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    pub id: OrderId,
    pub items: Vec<OrderItem>,
    #[schema(value_type = String, example = "300.00")]
    pub subtotal: Decimal,
    #[schema(value_type = String, example = "48.00")]
    pub tax: Decimal,
    #[schema(value_type = String, example = "99")]
    pub shipping: Decimal,
    #[schema(value_type = String, example = "447.00")]
    pub total: Decimal,
    pub status: OrderStatus,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub customer_note: String,
    pub status_history: Vec<StatusHistoryEntry>,
    pub created_at: DateTime<Utc>,
}

impl From<Order> for OrderPayload {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            items: order.items,
            subtotal: order.subtotal,
            tax: order.tax,
            shipping: order.shipping,
            total: order.total,
            status: order.status,
            shipping_address: order.shipping_address,
            payment_method: order.payment_method,
            customer_note: order.customer_note,
            status_history: order.status_history,
            created_at: order.created_at,
        }
    }
}

/// Dashboard statistics as returned to admin clients.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatisticsPayload {
    /// Sum of order totals, excluding cancelled orders.
    #[schema(value_type = String, example = "123456.00")]
    pub total_sales: Decimal,
    pub pending: i64,
    pub processing: i64,
    pub shipped: i64,
    pub delivered: i64,
    pub cancelled: i64,
}

impl From<OrderStatistics> for OrderStatisticsPayload {
    fn from(stats: OrderStatistics) -> Self {
        Self {
            total_sales: stats.total_sales,
            pending: stats.pending,
            processing: stats.processing,
            shipped: stats.shipped,
            delivered: stats.delivered,
            cancelled: stats.cancelled,
        }
    }
}

/// Response for the admin order listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListOrdersResponse {
    pub orders: Vec<OrderPayload>,
    /// Total matching orders across all pages.
    pub total: i64,
    /// The 1-based page returned.
    pub page: u32,
    /// Number of pages at the effective page size.
    pub pages: i64,
    /// Dashboard statistics across all orders, unaffected by the filter.
    pub statistics: OrderStatisticsPayload,
}

/// Driving port for order mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderCommand: Send + Sync {
    /// Place a new order for the caller.
    ///
    /// # Errors
    ///
    /// Rejects empty or non-positive lines and incomplete addresses as
    /// invalid requests, missing products as not found, and shortfalls as
    /// [`crate::domain::ErrorCode::InsufficientStock`]. On any error no stock
    /// moves and no order exists.
    async fn place_order(
        &self,
        caller: Caller,
        request: PlaceOrderRequest,
    ) -> Result<OrderPayload, Error>;

    /// Cancel one of the caller's own orders, restocking its items.
    ///
    /// # Errors
    ///
    /// Orders owned by other users are rejected as
    /// [`crate::domain::ErrorCode::Forbidden`]; orders already shipped or
    /// beyond are rejected as
    /// [`crate::domain::ErrorCode::InvalidTransition`].
    async fn cancel_order(&self, caller: Caller, order_id: OrderId)
        -> Result<OrderPayload, Error>;

    /// Set any status on any order, appending a history entry. Admin only;
    /// the transition is deliberately unrestricted and never touches stock.
    async fn set_order_status(
        &self,
        order_id: OrderId,
        request: SetOrderStatusRequest,
    ) -> Result<OrderPayload, Error>;
}

/// Driving port for order reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderQuery: Send + Sync {
    /// Fetch one order visible to the caller (owner or admin).
    async fn get_order(&self, caller: Caller, order_id: OrderId) -> Result<OrderPayload, Error>;

    /// The caller's own orders, newest first.
    async fn list_my_orders(&self, caller: Caller) -> Result<Vec<OrderPayload>, Error>;

    /// Filtered, paginated listing with dashboard statistics. Admin only.
    async fn list_orders(&self, request: ListOrdersRequest) -> Result<ListOrdersResponse, Error>;
}

/// Fixture command for handler tests that do not exercise order mutations.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureOrderCommand;

#[async_trait]
impl OrderCommand for FixtureOrderCommand {
    async fn place_order(
        &self,
        _caller: Caller,
        _request: PlaceOrderRequest,
    ) -> Result<OrderPayload, Error> {
        Err(Error::service_unavailable("order placement unavailable"))
    }

    async fn cancel_order(
        &self,
        _caller: Caller,
        order_id: OrderId,
    ) -> Result<OrderPayload, Error> {
        Err(Error::not_found(format!("order {order_id} not found")))
    }

    async fn set_order_status(
        &self,
        order_id: OrderId,
        _request: SetOrderStatusRequest,
    ) -> Result<OrderPayload, Error> {
        Err(Error::not_found(format!("order {order_id} not found")))
    }
}

/// Fixture query for handler tests that do not exercise order reads.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureOrderQuery;

#[async_trait]
impl OrderQuery for FixtureOrderQuery {
    async fn get_order(&self, _caller: Caller, order_id: OrderId) -> Result<OrderPayload, Error> {
        Err(Error::not_found(format!("order {order_id} not found")))
    }

    async fn list_my_orders(&self, _caller: Caller) -> Result<Vec<OrderPayload>, Error> {
        Ok(Vec::new())
    }

    async fn list_orders(&self, request: ListOrdersRequest) -> Result<ListOrdersResponse, Error> {
        Ok(ListOrdersResponse {
            orders: Vec::new(),
            total: 0,
            page: request.page.unwrap_or(1).max(1),
            pages: 0,
            statistics: OrderStatisticsPayload::default(),
        })
    }
}
