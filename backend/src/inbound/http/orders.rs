//! Order HTTP handlers.
//!
//! ```text
//! POST /api/v1/orders                    place an order
//! GET  /api/v1/orders                    the caller's orders
//! GET  /api/v1/orders/{id}               one order (owner or admin)
//! PUT  /api/v1/orders/{id}/cancel        customer cancellation
//! GET  /api/v1/admin/orders              admin listing with statistics
//! PUT  /api/v1/admin/orders/{id}/status  admin status update
//! ```

use actix_web::{get, post, put, web, HttpResponse};
use uuid::Uuid;

use crate::domain::order::OrderId;
use crate::domain::ports::{
    ListOrdersRequest, ListOrdersResponse, OrderPayload, PlaceOrderRequest, SetOrderStatusRequest,
};
use crate::domain::Error;
use crate::inbound::http::auth::{AdminContext, CallerContext};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Place a new order from the supplied lines.
///
/// Stock is checked and decremented atomically; on any failure no stock
/// moves and no order exists.
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    request_body = PlaceOrderRequest,
    responses(
        (status = 201, description = "The placed order", body = OrderPayload),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Unknown product", body = Error),
        (status = 409, description = "Insufficient stock", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["orders"],
    operation_id = "placeOrder"
)]
#[post("/orders")]
pub async fn place_order(
    state: web::Data<HttpState>,
    ctx: CallerContext,
    payload: web::Json<PlaceOrderRequest>,
) -> ApiResult<HttpResponse> {
    let order = state
        .order_commands
        .place_order(ctx.0, payload.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(order))
}

/// List the caller's own orders, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    responses(
        (status = 200, description = "The caller's orders", body = [OrderPayload]),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["orders"],
    operation_id = "listMyOrders"
)]
#[get("/orders")]
pub async fn list_my_orders(
    state: web::Data<HttpState>,
    ctx: CallerContext,
) -> ApiResult<web::Json<Vec<OrderPayload>>> {
    let orders = state.orders.list_my_orders(ctx.0).await?;
    Ok(web::Json(orders))
}

/// Fetch one order. Owners see their own orders; admins see all.
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    params(("id" = Uuid, Path, description = "Order identifier")),
    responses(
        (status = 200, description = "The order", body = OrderPayload),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Order owned by another user", body = Error),
        (status = 404, description = "Unknown order", body = Error)
    ),
    tags = ["orders"],
    operation_id = "getOrder"
)]
#[get("/orders/{id}")]
pub async fn get_order(
    state: web::Data<HttpState>,
    ctx: CallerContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<OrderPayload>> {
    let order = state
        .orders
        .get_order(ctx.0, OrderId::from_uuid(path.into_inner()))
        .await?;
    Ok(web::Json(order))
}

/// Cancel one of the caller's own orders, restocking its items.
#[utoipa::path(
    put,
    path = "/api/v1/orders/{id}/cancel",
    params(("id" = Uuid, Path, description = "Order identifier")),
    responses(
        (status = 200, description = "The cancelled order", body = OrderPayload),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Order owned by another user", body = Error),
        (status = 404, description = "Unknown order", body = Error),
        (status = 409, description = "Order can no longer be cancelled", body = Error)
    ),
    tags = ["orders"],
    operation_id = "cancelOrder"
)]
#[put("/orders/{id}/cancel")]
pub async fn cancel_order(
    state: web::Data<HttpState>,
    ctx: CallerContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<OrderPayload>> {
    let order = state
        .order_commands
        .cancel_order(ctx.0, OrderId::from_uuid(path.into_inner()))
        .await?;
    Ok(web::Json(order))
}

/// Filtered, paginated order listing with dashboard statistics. Admin only.
#[utoipa::path(
    get,
    path = "/api/v1/admin/orders",
    params(ListOrdersRequest),
    responses(
        (status = 200, description = "Orders and statistics", body = ListOrdersResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not an administrator", body = Error)
    ),
    tags = ["orders"],
    operation_id = "listOrders"
)]
#[get("/admin/orders")]
pub async fn list_orders(
    state: web::Data<HttpState>,
    _ctx: AdminContext,
    query: web::Query<ListOrdersRequest>,
) -> ApiResult<web::Json<ListOrdersResponse>> {
    let response = state.orders.list_orders(query.into_inner()).await?;
    Ok(web::Json(response))
}

/// Set any status on an order, appending a history entry. Admin only.
#[utoipa::path(
    put,
    path = "/api/v1/admin/orders/{id}/status",
    params(("id" = Uuid, Path, description = "Order identifier")),
    request_body = SetOrderStatusRequest,
    responses(
        (status = 200, description = "The updated order", body = OrderPayload),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not an administrator", body = Error),
        (status = 404, description = "Unknown order", body = Error)
    ),
    tags = ["orders"],
    operation_id = "setOrderStatus"
)]
#[put("/admin/orders/{id}/status")]
pub async fn set_order_status(
    state: web::Data<HttpState>,
    _ctx: AdminContext,
    path: web::Path<Uuid>,
    payload: web::Json<SetOrderStatusRequest>,
) -> ApiResult<web::Json<OrderPayload>> {
    let order = state
        .order_commands
        .set_order_status(OrderId::from_uuid(path.into_inner()), payload.into_inner())
        .await?;
    Ok(web::Json(order))
}
