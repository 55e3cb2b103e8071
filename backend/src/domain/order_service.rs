//! Order domain service implementing the driving ports.
//!
//! Validation happens here; the stock check, inventory decrement, and order
//! write happen atomically inside the repository transaction. The pricing
//! policy is injected at startup and passed into every placement.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::checkout::CheckoutPolicy;
use crate::domain::order::OrderId;
use crate::domain::ports::{
    CancelOrderError, ItemRequest, ListOrdersRequest, ListOrdersResponse, OrderCommand,
    OrderDraft, OrderFilter, OrderPayload, OrderQuery, OrderRepository, OrderRepositoryError,
    PageRequest, PlaceOrderError, PlaceOrderRequest, SetOrderStatusRequest, SetStatusError,
};
use crate::domain::user::Caller;
use crate::domain::Error;

/// Default admin-listing page size.
const DEFAULT_ORDERS_PER_PAGE: u32 = 20;

/// Order service implementing [`OrderCommand`] and [`OrderQuery`].
#[derive(Clone)]
pub struct OrderService<R> {
    orders: Arc<R>,
    policy: CheckoutPolicy,
}

impl<R> OrderService<R> {
    /// Create a new service pricing orders with the given policy.
    pub fn new(orders: Arc<R>, policy: CheckoutPolicy) -> Self {
        Self { orders, policy }
    }
}

impl<R> OrderService<R>
where
    R: OrderRepository,
{
    fn map_read_error(error: OrderRepositoryError) -> Error {
        match error {
            OrderRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("order repository unavailable: {message}"))
            }
            OrderRepositoryError::Query { message } => {
                Error::internal(format!("order repository error: {message}"))
            }
        }
    }

    fn map_place_error(error: PlaceOrderError) -> Error {
        match error {
            PlaceOrderError::ProductNotFound { product_id } => {
                Error::not_found(format!("product {product_id} not found"))
            }
            PlaceOrderError::InsufficientStock {
                product_name,
                available,
            } => Error::insufficient_stock(product_name, available),
            PlaceOrderError::Connection { message } => {
                Error::service_unavailable(format!("order repository unavailable: {message}"))
            }
            PlaceOrderError::Query { message } => {
                Error::internal(format!("order placement failed: {message}"))
            }
        }
    }

    fn map_cancel_error(error: CancelOrderError) -> Error {
        match error {
            CancelOrderError::NotFound => Error::not_found("order not found"),
            CancelOrderError::NotOwned => {
                Error::forbidden("order belongs to another user")
            }
            CancelOrderError::NotCancellable { status } => Error::invalid_transition(
                format!("order in status {status} can no longer be cancelled"),
                status.as_str(),
            ),
            CancelOrderError::Connection { message } => {
                Error::service_unavailable(format!("order repository unavailable: {message}"))
            }
            CancelOrderError::Query { message } => {
                Error::internal(format!("order cancellation failed: {message}"))
            }
        }
    }

    fn map_set_status_error(error: SetStatusError) -> Error {
        match error {
            SetStatusError::NotFound => Error::not_found("order not found"),
            SetStatusError::Connection { message } => {
                Error::service_unavailable(format!("order repository unavailable: {message}"))
            }
            SetStatusError::Query { message } => {
                Error::internal(format!("status update failed: {message}"))
            }
        }
    }

    fn validate_placement(request: &PlaceOrderRequest) -> Result<(), Error> {
        if request.items.is_empty() {
            return Err(Error::invalid_request("order must contain at least one item"));
        }
        for item in &request.items {
            if item.quantity < 1 {
                return Err(Error::invalid_request(format!(
                    "quantity for product {} must be at least 1",
                    item.product_id
                )));
            }
        }
        request
            .shipping_address
            .validate()
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl<R> OrderCommand for OrderService<R>
where
    R: OrderRepository,
{
    async fn place_order(
        &self,
        caller: Caller,
        request: PlaceOrderRequest,
    ) -> Result<OrderPayload, Error> {
        Self::validate_placement(&request)?;

        let draft = OrderDraft {
            user_id: caller.user_id,
            items: request
                .items
                .iter()
                .map(|item| ItemRequest {
                    product_id: item.product_id,
                    quantity: item.quantity,
                })
                .collect(),
            shipping_address: request.shipping_address,
            payment_method: request.payment_method,
            customer_note: request.customer_note,
        };

        let order = self
            .orders
            .place(draft, self.policy)
            .await
            .map_err(Self::map_place_error)?;

        tracing::info!(
            order_id = %order.id,
            user_id = %order.user_id,
            total = %order.total,
            "order placed"
        );
        Ok(order.into())
    }

    async fn cancel_order(
        &self,
        caller: Caller,
        order_id: OrderId,
    ) -> Result<OrderPayload, Error> {
        let order = self
            .orders
            .cancel(order_id, caller.user_id)
            .await
            .map_err(Self::map_cancel_error)?;

        tracing::info!(order_id = %order.id, "order cancelled, stock restored");
        Ok(order.into())
    }

    async fn set_order_status(
        &self,
        order_id: OrderId,
        request: SetOrderStatusRequest,
    ) -> Result<OrderPayload, Error> {
        let comment = request
            .comment
            .filter(|comment| !comment.trim().is_empty())
            .unwrap_or_else(|| format!("Status updated to {}", request.status));

        let order = self
            .orders
            .set_status(order_id, request.status, comment)
            .await
            .map_err(Self::map_set_status_error)?;

        tracing::info!(order_id = %order.id, status = %order.status, "order status updated");
        Ok(order.into())
    }
}

#[async_trait]
impl<R> OrderQuery for OrderService<R>
where
    R: OrderRepository,
{
    async fn get_order(&self, caller: Caller, order_id: OrderId) -> Result<OrderPayload, Error> {
        let order = self
            .orders
            .find_by_id(order_id)
            .await
            .map_err(Self::map_read_error)?
            .ok_or_else(|| Error::not_found("order not found"))?;

        if !caller.may_access(order.user_id) {
            return Err(Error::forbidden("order belongs to another user"));
        }
        Ok(order.into())
    }

    async fn list_my_orders(&self, caller: Caller) -> Result<Vec<OrderPayload>, Error> {
        let orders = self
            .orders
            .list_for_user(caller.user_id)
            .await
            .map_err(Self::map_read_error)?;
        Ok(orders.into_iter().map(OrderPayload::from).collect())
    }

    async fn list_orders(&self, request: ListOrdersRequest) -> Result<ListOrdersResponse, Error> {
        let filter = OrderFilter {
            status: request.status,
            newest_first: true,
        };
        let page_request = PageRequest::new(
            request.page.unwrap_or(1),
            request.per_page.unwrap_or(DEFAULT_ORDERS_PER_PAGE),
        );

        let page = self
            .orders
            .list_page(filter, page_request)
            .await
            .map_err(Self::map_read_error)?;
        let statistics = self
            .orders
            .statistics()
            .await
            .map_err(Self::map_read_error)?;

        Ok(ListOrdersResponse {
            total: page.total,
            page: page.request.page(),
            pages: page.pages(),
            orders: page.items.into_iter().map(OrderPayload::from).collect(),
            statistics: statistics.into(),
        })
    }
}
