//! PostgreSQL-backed `OrderRepository` implementation using Diesel.
//!
//! Placement and cancellation run inside a single database transaction. The
//! placement path locks each touched product row with `SELECT ... FOR
//! UPDATE` before checking stock, so two concurrent orders for the last unit
//! serialise and exactly one succeeds. Rollback undoes every stock change,
//! the order insert, and the cart clear together.

use async_trait::async_trait;
use chrono::Utc;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use crate::domain::checkout::CheckoutPolicy;
use crate::domain::order::{
    Order, OrderId, OrderItem, OrderStatus, PaymentMethod, ShippingAddress, StatusHistoryEntry,
};
use crate::domain::ports::{
    CancelOrderError, OrderDraft, OrderFilter, OrderRepository, OrderRepositoryError,
    OrderStatistics, Page, PageRequest, PlaceOrderError, SetStatusError,
};
use crate::domain::product::ProductId;
use crate::domain::user::UserId;

use super::diesel_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewOrderRow, OrderRow, ProductRow};
use super::pool::{DbPool, PoolError};
use super::schema::{cart_items, orders, products};

/// Diesel-backed implementation of the `OrderRepository` port.
#[derive(Clone)]
pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> OrderRepositoryError {
    map_basic_pool_error(error, OrderRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> OrderRepositoryError {
    map_basic_diesel_error(
        error,
        OrderRepositoryError::query,
        OrderRepositoryError::connection,
    )
}

/// Internal error for the placement transaction.
///
/// The `From<diesel::result::Error>` impl lets `?` inside the transaction
/// body trigger a rollback.
#[derive(Debug, thiserror::Error)]
enum PlaceTxError {
    #[error(transparent)]
    Diesel(#[from] diesel::result::Error),
    #[error("product {0} not found")]
    ProductNotFound(ProductId),
    #[error("insufficient stock for {name}")]
    InsufficientStock { name: String, available: i32 },
    #[error("order serialisation failed: {0}")]
    Serialise(String),
}

fn map_place_error(error: PlaceTxError) -> PlaceOrderError {
    match error {
        PlaceTxError::Diesel(err) => {
            let mapped = map_diesel_error(err);
            match mapped {
                OrderRepositoryError::Connection { message } => {
                    PlaceOrderError::Connection { message }
                }
                OrderRepositoryError::Query { message } => PlaceOrderError::Query { message },
            }
        }
        PlaceTxError::ProductNotFound(product_id) => PlaceOrderError::ProductNotFound { product_id },
        PlaceTxError::InsufficientStock { name, available } => PlaceOrderError::InsufficientStock {
            product_name: name,
            available,
        },
        PlaceTxError::Serialise(message) => PlaceOrderError::Query { message },
    }
}

/// Internal error for the cancellation transaction.
#[derive(Debug, thiserror::Error)]
enum CancelTxError {
    #[error(transparent)]
    Diesel(#[from] diesel::result::Error),
    #[error("order not found")]
    NotFound,
    #[error("order owned by another user")]
    NotOwned,
    #[error("order not cancellable")]
    NotCancellable(OrderStatus),
    #[error("stored order is corrupt: {0}")]
    Corrupt(String),
}

fn map_cancel_error(error: CancelTxError) -> CancelOrderError {
    match error {
        CancelTxError::Diesel(err) => match map_diesel_error(err) {
            OrderRepositoryError::Connection { message } => CancelOrderError::Connection { message },
            OrderRepositoryError::Query { message } => CancelOrderError::Query { message },
        },
        CancelTxError::NotFound => CancelOrderError::NotFound,
        CancelTxError::NotOwned => CancelOrderError::NotOwned,
        CancelTxError::NotCancellable(status) => CancelOrderError::NotCancellable { status },
        CancelTxError::Corrupt(message) => CancelOrderError::Query { message },
    }
}

/// Internal error for the status-update transaction.
#[derive(Debug, thiserror::Error)]
enum SetStatusTxError {
    #[error(transparent)]
    Diesel(#[from] diesel::result::Error),
    #[error("order not found")]
    NotFound,
    #[error("stored order is corrupt: {0}")]
    Corrupt(String),
}

fn map_set_status_error(error: SetStatusTxError) -> SetStatusError {
    match error {
        SetStatusTxError::Diesel(err) => match map_diesel_error(err) {
            OrderRepositoryError::Connection { message } => SetStatusError::Connection { message },
            OrderRepositoryError::Query { message } => SetStatusError::Query { message },
        },
        SetStatusTxError::NotFound => SetStatusError::NotFound,
        SetStatusTxError::Corrupt(message) => SetStatusError::Query { message },
    }
}

/// Convert a stored row to a domain order, parsing the JSONB columns.
pub(crate) fn row_to_order(row: OrderRow) -> Result<Order, String> {
    let status = row
        .status
        .parse::<OrderStatus>()
        .map_err(|err| err.to_string())?;
    let payment_method = row
        .payment_method
        .parse::<PaymentMethod>()
        .map_err(|err| err.to_string())?;
    let items: Vec<OrderItem> = serde_json::from_value(row.items)
        .map_err(|err| format!("order items failed to parse: {err}"))?;
    let shipping_address: ShippingAddress = serde_json::from_value(row.shipping_address)
        .map_err(|err| format!("shipping address failed to parse: {err}"))?;
    let status_history: Vec<StatusHistoryEntry> = serde_json::from_value(row.status_history)
        .map_err(|err| format!("status history failed to parse: {err}"))?;

    Ok(Order {
        id: OrderId::from_uuid(row.id),
        user_id: UserId::from_uuid(row.user_id),
        items,
        subtotal: row.subtotal,
        tax: row.tax,
        shipping: row.shipping,
        total: row.total,
        status,
        shipping_address,
        payment_method,
        customer_note: row.customer_note,
        status_history,
        created_at: row.created_at,
    })
}

fn corrupt_query_error(message: String) -> OrderRepositoryError {
    debug!(message = %message, "stored order failed to convert");
    OrderRepositoryError::query(message)
}

/// Parse the status history, append one entry, and serialise it back.
fn appended_history(
    raw: serde_json::Value,
    status: OrderStatus,
    comment: String,
) -> Result<serde_json::Value, String> {
    let mut history: Vec<StatusHistoryEntry> = serde_json::from_value(raw)
        .map_err(|err| format!("status history failed to parse: {err}"))?;
    history.push(StatusHistoryEntry {
        status,
        at: Utc::now(),
        comment,
    });
    serde_json::to_value(&history).map_err(|err| err.to_string())
}

fn filtered(filter: OrderFilter) -> orders::BoxedQuery<'static, Pg> {
    let mut query = orders::table.into_boxed();
    if let Some(status) = filter.status {
        query = query.filter(orders::status.eq(status.as_str()));
    }
    query
}

#[async_trait]
impl OrderRepository for DieselOrderRepository {
    async fn place(
        &self,
        draft: OrderDraft,
        policy: CheckoutPolicy,
    ) -> Result<Order, PlaceOrderError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_place_error_from_pool(err))?;

        let row = conn
            .transaction::<OrderRow, PlaceTxError, _>(|conn| {
                async move {
                    let mut order_items = Vec::with_capacity(draft.items.len());
                    for item in &draft.items {
                        // Lock the product row until commit so concurrent
                        // placements of the same product serialise here.
                        let product: Option<ProductRow> = products::table
                            .filter(
                                products::id
                                    .eq(item.product_id.as_uuid())
                                    .and(products::active.eq(true)),
                            )
                            .select(ProductRow::as_select())
                            .for_update()
                            .first(conn)
                            .await
                            .optional()?;
                        let Some(product) = product else {
                            return Err(PlaceTxError::ProductNotFound(item.product_id));
                        };
                        if product.stock < item.quantity {
                            return Err(PlaceTxError::InsufficientStock {
                                name: product.name,
                                available: product.stock,
                            });
                        }

                        diesel::update(products::table.find(product.id))
                            .set((
                                products::stock.eq(products::stock - item.quantity),
                                products::updated_at.eq(Utc::now()),
                            ))
                            .execute(conn)
                            .await?;

                        order_items.push(OrderItem {
                            product_id: item.product_id,
                            name: product.name,
                            quantity: item.quantity,
                            unit_price: product.price,
                            image: product.image,
                        });
                    }

                    let subtotal: Decimal = order_items.iter().map(OrderItem::line_total).sum();
                    let totals = policy.totals(subtotal);
                    let history = vec![StatusHistoryEntry {
                        status: OrderStatus::Pending,
                        at: Utc::now(),
                        comment: "Order created".to_owned(),
                    }];

                    let items_json = serde_json::to_value(&order_items)
                        .map_err(|err| PlaceTxError::Serialise(err.to_string()))?;
                    let address_json = serde_json::to_value(&draft.shipping_address)
                        .map_err(|err| PlaceTxError::Serialise(err.to_string()))?;
                    let history_json = serde_json::to_value(&history)
                        .map_err(|err| PlaceTxError::Serialise(err.to_string()))?;

                    let new_row = NewOrderRow {
                        id: Uuid::new_v4(),
                        user_id: *draft.user_id.as_uuid(),
                        items: &items_json,
                        subtotal: totals.subtotal,
                        tax: totals.tax,
                        shipping: totals.shipping,
                        total: totals.total,
                        status: OrderStatus::Pending.as_str(),
                        shipping_address: &address_json,
                        payment_method: draft.payment_method.as_str(),
                        customer_note: &draft.customer_note,
                        status_history: &history_json,
                    };
                    let row: OrderRow = diesel::insert_into(orders::table)
                        .values(&new_row)
                        .returning(OrderRow::as_returning())
                        .get_result(conn)
                        .await?;

                    // Checkout empties the cart in the same transaction.
                    diesel::delete(
                        cart_items::table.filter(cart_items::user_id.eq(draft.user_id.as_uuid())),
                    )
                    .execute(conn)
                    .await?;

                    Ok(row)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_place_error)?;

        row_to_order(row).map_err(|message| PlaceOrderError::Query { message })
    }

    async fn cancel(&self, order_id: OrderId, owner: UserId) -> Result<Order, CancelOrderError> {
        let mut conn = self.pool.get().await.map_err(|err| {
            map_basic_pool_error(err, |message| CancelOrderError::Connection { message })
        })?;

        let row = conn
            .transaction::<OrderRow, CancelTxError, _>(|conn| {
                async move {
                    let row: Option<OrderRow> = orders::table
                        .find(order_id.as_uuid())
                        .select(OrderRow::as_select())
                        .for_update()
                        .first(conn)
                        .await
                        .optional()?;
                    let Some(row) = row else {
                        return Err(CancelTxError::NotFound);
                    };
                    if row.user_id != *owner.as_uuid() {
                        return Err(CancelTxError::NotOwned);
                    }
                    let status = row
                        .status
                        .parse::<OrderStatus>()
                        .map_err(|err| CancelTxError::Corrupt(err.to_string()))?;
                    if !status.customer_may_cancel() {
                        return Err(CancelTxError::NotCancellable(status));
                    }

                    let items: Vec<OrderItem> = serde_json::from_value(row.items.clone())
                        .map_err(|err| CancelTxError::Corrupt(err.to_string()))?;
                    for item in &items {
                        // Restock; a product removed since placement is
                        // skipped rather than failing the cancellation.
                        diesel::update(products::table.find(item.product_id.as_uuid()))
                            .set((
                                products::stock.eq(products::stock + item.quantity),
                                products::updated_at.eq(Utc::now()),
                            ))
                            .execute(conn)
                            .await?;
                    }

                    let history = appended_history(
                        row.status_history.clone(),
                        OrderStatus::Cancelled,
                        "Cancelled by customer".to_owned(),
                    )
                    .map_err(CancelTxError::Corrupt)?;

                    let updated: OrderRow = diesel::update(orders::table.find(row.id))
                        .set((
                            orders::status.eq(OrderStatus::Cancelled.as_str()),
                            orders::status_history.eq(history),
                            orders::updated_at.eq(Utc::now()),
                        ))
                        .returning(OrderRow::as_returning())
                        .get_result(conn)
                        .await?;

                    Ok(updated)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_cancel_error)?;

        row_to_order(row).map_err(|message| CancelOrderError::Query { message })
    }

    async fn set_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
        comment: String,
    ) -> Result<Order, SetStatusError> {
        let mut conn = self.pool.get().await.map_err(|err| {
            map_basic_pool_error(err, |message| SetStatusError::Connection { message })
        })?;

        let row = conn
            .transaction::<OrderRow, SetStatusTxError, _>(|conn| {
                async move {
                    let row: Option<OrderRow> = orders::table
                        .find(order_id.as_uuid())
                        .select(OrderRow::as_select())
                        .for_update()
                        .first(conn)
                        .await
                        .optional()?;
                    let Some(row) = row else {
                        return Err(SetStatusTxError::NotFound);
                    };

                    let history = appended_history(row.status_history.clone(), status, comment)
                        .map_err(SetStatusTxError::Corrupt)?;

                    let updated: OrderRow = diesel::update(orders::table.find(row.id))
                        .set((
                            orders::status.eq(status.as_str()),
                            orders::status_history.eq(history),
                            orders::updated_at.eq(Utc::now()),
                        ))
                        .returning(OrderRow::as_returning())
                        .get_result(conn)
                        .await?;

                    Ok(updated)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_set_status_error)?;

        row_to_order(row).map_err(|message| SetStatusError::Query { message })
    }

    async fn find_by_id(
        &self,
        order_id: OrderId,
    ) -> Result<Option<Order>, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<OrderRow> = orders::table
            .find(order_id.as_uuid())
            .select(OrderRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(|row| row_to_order(row).map_err(corrupt_query_error))
            .transpose()
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<OrderRow> = orders::table
            .filter(orders::user_id.eq(user_id.as_uuid()))
            .order(orders::created_at.desc())
            .select(OrderRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter()
            .map(|row| row_to_order(row).map_err(corrupt_query_error))
            .collect()
    }

    async fn list_page(
        &self,
        filter: OrderFilter,
        page: PageRequest,
    ) -> Result<Page<Order>, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = filtered(filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let query = filtered(filter).select(OrderRow::as_select());
        let query = if filter.newest_first {
            query.order(orders::created_at.desc())
        } else {
            query.order(orders::created_at.asc())
        };
        let rows: Vec<OrderRow> = query
            .offset(page.offset())
            .limit(page.limit())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = rows
            .into_iter()
            .map(|row| row_to_order(row).map_err(corrupt_query_error))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page {
            items,
            total,
            request: page,
        })
    }

    async fn statistics(&self) -> Result<OrderStatistics, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // Cancelled orders do not count towards revenue.
        let total_sales: Option<Decimal> = orders::table
            .filter(orders::status.ne(OrderStatus::Cancelled.as_str()))
            .select(diesel::dsl::sum(orders::total))
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let counts: Vec<(String, i64)> = orders::table
            .group_by(orders::status)
            .select((orders::status, diesel::dsl::count_star()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let mut statistics = OrderStatistics {
            total_sales: total_sales.unwrap_or_default(),
            ..OrderStatistics::default()
        };
        for (status, count) in counts {
            match status.parse::<OrderStatus>() {
                Ok(OrderStatus::Pending) => statistics.pending = count,
                Ok(OrderStatus::Processing) => statistics.processing = count,
                Ok(OrderStatus::Shipped) => statistics.shipped = count,
                Ok(OrderStatus::Delivered) => statistics.delivered = count,
                Ok(OrderStatus::Cancelled) => statistics.cancelled = count,
                Err(err) => {
                    debug!(status = %status, error = %err, "skipping unknown status in statistics");
                }
            }
        }
        Ok(statistics)
    }
}

fn map_place_error_from_pool(error: PoolError) -> PlaceOrderError {
    map_basic_pool_error(error, |message| PlaceOrderError::Connection { message })
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn sample_row() -> OrderRow {
        let now = Utc::now();
        OrderRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            items: json!([{
                "productId": Uuid::new_v4(),
                "name": "Phone",
                "quantity": 3,
                "unitPrice": "100.00",
                "image": "",
            }]),
            subtotal: dec!(300.00),
            tax: dec!(48.00),
            shipping: dec!(99),
            total: dec!(447.00),
            status: "pending".to_owned(),
            shipping_address: json!({
                "fullName": "Ada Lovelace",
                "street": "Av. Reforma 1",
                "city": "CDMX",
                "region": "CDMX",
                "postalCode": "06600",
                "phone": "5512345678",
                "country": "México",
            }),
            payment_method: "card".to_owned(),
            customer_note: String::new(),
            status_history: json!([{
                "status": "pending",
                "at": now,
                "comment": "Order created",
            }]),
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    fn row_conversion_parses_jsonb_columns() {
        let row = sample_row();

        let order = row_to_order(row).expect("row converts");

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].unit_price, dec!(100.00));
        assert_eq!(order.status_history.len(), 1);
        assert_eq!(order.total, dec!(447.00));
    }

    #[rstest]
    fn row_conversion_rejects_unknown_status() {
        let row = OrderRow {
            status: "teleported".to_owned(),
            ..sample_row()
        };

        let error = row_to_order(row).expect_err("unknown status");

        assert!(error.contains("teleported"));
    }

    #[rstest]
    fn row_conversion_rejects_malformed_items() {
        let row = OrderRow {
            items: json!({"not": "an array"}),
            ..sample_row()
        };

        assert!(row_to_order(row).is_err());
    }

    #[rstest]
    fn history_append_keeps_existing_entries() {
        let raw = json!([{
            "status": "pending",
            "at": Utc::now(),
            "comment": "Order created",
        }]);

        let appended = appended_history(raw, OrderStatus::Shipped, "On its way".to_owned())
            .expect("history appends");
        let history: Vec<StatusHistoryEntry> =
            serde_json::from_value(appended).expect("history parses back");

        assert_eq!(history.len(), 2);
        assert_eq!(history[1].status, OrderStatus::Shipped);
        assert_eq!(history[1].comment, "On its way");
    }

    #[rstest]
    fn stock_shortfall_maps_to_insufficient_stock() {
        let error = map_place_error(PlaceTxError::InsufficientStock {
            name: "Phone".to_owned(),
            available: 2,
        });

        assert!(matches!(
            error,
            PlaceOrderError::InsufficientStock { available: 2, .. }
        ));
    }

    #[rstest]
    fn cancel_errors_keep_their_meaning() {
        assert!(matches!(
            map_cancel_error(CancelTxError::NotOwned),
            CancelOrderError::NotOwned
        ));
        assert!(matches!(
            map_cancel_error(CancelTxError::NotCancellable(OrderStatus::Shipped)),
            CancelOrderError::NotCancellable {
                status: OrderStatus::Shipped
            }
        ));
    }
}
