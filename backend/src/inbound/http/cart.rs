//! Cart HTTP handlers.
//!
//! ```text
//! GET    /api/v1/cart
//! POST   /api/v1/cart/items
//! PUT    /api/v1/cart/items/{productId}
//! DELETE /api/v1/cart/items/{productId}
//! DELETE /api/v1/cart
//! ```
//!
//! Every mutation responds with the refreshed cart.

use actix_web::{delete, get, post, put, web};
use uuid::Uuid;

use crate::domain::ports::{AddCartItemRequest, CartPayload, UpdateCartItemRequest};
use crate::domain::product::ProductId;
use crate::domain::Error;
use crate::inbound::http::auth::CallerContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Fetch the caller's cart.
#[utoipa::path(
    get,
    path = "/api/v1/cart",
    responses(
        (status = 200, description = "The caller's cart", body = CartPayload),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["cart"],
    operation_id = "getCart"
)]
#[get("/cart")]
pub async fn get_cart(
    state: web::Data<HttpState>,
    ctx: CallerContext,
) -> ApiResult<web::Json<CartPayload>> {
    let cart = state.cart.get_cart(ctx.0).await?;
    Ok(web::Json(cart))
}

/// Add a product to the caller's cart, accumulating quantity.
#[utoipa::path(
    post,
    path = "/api/v1/cart/items",
    request_body = AddCartItemRequest,
    responses(
        (status = 200, description = "The refreshed cart", body = CartPayload),
        (status = 400, description = "Invalid quantity", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Unknown or inactive product", body = Error),
        (status = 409, description = "Insufficient stock", body = Error)
    ),
    tags = ["cart"],
    operation_id = "addCartItem"
)]
#[post("/cart/items")]
pub async fn add_item(
    state: web::Data<HttpState>,
    ctx: CallerContext,
    payload: web::Json<AddCartItemRequest>,
) -> ApiResult<web::Json<CartPayload>> {
    let cart = state
        .cart_commands
        .add_item(ctx.0, payload.into_inner())
        .await?;
    Ok(web::Json(cart))
}

/// Replace a line's quantity.
#[utoipa::path(
    put,
    path = "/api/v1/cart/items/{productId}",
    params(("productId" = Uuid, Path, description = "Product identifier")),
    request_body = UpdateCartItemRequest,
    responses(
        (status = 200, description = "The refreshed cart", body = CartPayload),
        (status = 400, description = "Invalid quantity", body = Error),
        (status = 404, description = "Line not in the cart", body = Error),
        (status = 409, description = "Insufficient stock", body = Error)
    ),
    tags = ["cart"],
    operation_id = "updateCartItem"
)]
#[put("/cart/items/{product_id}")]
pub async fn set_item_quantity(
    state: web::Data<HttpState>,
    ctx: CallerContext,
    path: web::Path<Uuid>,
    payload: web::Json<UpdateCartItemRequest>,
) -> ApiResult<web::Json<CartPayload>> {
    let cart = state
        .cart_commands
        .set_item_quantity(
            ctx.0,
            ProductId::from_uuid(path.into_inner()),
            payload.into_inner(),
        )
        .await?;
    Ok(web::Json(cart))
}

/// Remove one line from the cart.
#[utoipa::path(
    delete,
    path = "/api/v1/cart/items/{productId}",
    params(("productId" = Uuid, Path, description = "Product identifier")),
    responses(
        (status = 200, description = "The refreshed cart", body = CartPayload),
        (status = 404, description = "Line not in the cart", body = Error)
    ),
    tags = ["cart"],
    operation_id = "removeCartItem"
)]
#[delete("/cart/items/{product_id}")]
pub async fn remove_item(
    state: web::Data<HttpState>,
    ctx: CallerContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<CartPayload>> {
    let cart = state
        .cart_commands
        .remove_item(ctx.0, ProductId::from_uuid(path.into_inner()))
        .await?;
    Ok(web::Json(cart))
}

/// Remove every line from the cart.
#[utoipa::path(
    delete,
    path = "/api/v1/cart",
    responses(
        (status = 200, description = "The emptied cart", body = CartPayload),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["cart"],
    operation_id = "clearCart"
)]
#[delete("/cart")]
pub async fn clear_cart(
    state: web::Data<HttpState>,
    ctx: CallerContext,
) -> ApiResult<web::Json<CartPayload>> {
    let cart = state.cart_commands.clear_cart(ctx.0).await?;
    Ok(web::Json(cart))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{FixtureAuthGate, MockCartCommand};
    use crate::inbound::http::test_utils::{authed, test_app};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rust_decimal::Decimal;
    use serde_json::json;
    use std::sync::Arc;

    #[actix_web::test]
    async fn cart_requires_authentication() {
        let state = HttpState::fixtures();
        let app = actix_test::init_service(test_app(state, |scope| scope.service(get_cart))).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/api/v1/cart").to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn fixture_cart_is_empty() {
        let (gate, _) = FixtureAuthGate::customer("tok-1");
        let state = HttpState::fixtures().with_auth(Arc::new(gate));
        let app = actix_test::init_service(test_app(state, |scope| scope.service(get_cart))).await;

        let res = actix_test::call_service(
            &app,
            authed(actix_test::TestRequest::get().uri("/api/v1/cart"), "tok-1"),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: CartPayload = actix_test::read_body_json(res).await;
        assert!(body.items.is_empty());
        assert_eq!(body.subtotal, Decimal::ZERO);
    }

    #[actix_web::test]
    async fn add_item_defaults_quantity_to_one() {
        let (gate, caller) = FixtureAuthGate::customer("tok-1");
        let product_id = ProductId::random();
        let mut commands = MockCartCommand::new();
        commands
            .expect_add_item()
            .withf(move |c, request| {
                *c == caller && request.product_id == product_id && request.quantity == 1
            })
            .times(1)
            .return_once(|_, _| Ok(CartPayload::empty()));
        let mut state = HttpState::fixtures().with_auth(Arc::new(gate));
        state.cart_commands = Arc::new(commands);
        let app = actix_test::init_service(test_app(state, |scope| scope.service(add_item))).await;

        let res = actix_test::call_service(
            &app,
            authed(
                actix_test::TestRequest::post()
                    .uri("/api/v1/cart/items")
                    .set_json(json!({"productId": product_id})),
                "tok-1",
            ),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn set_quantity_targets_the_path_product() {
        let (gate, caller) = FixtureAuthGate::customer("tok-1");
        let product_id = ProductId::random();
        let mut commands = MockCartCommand::new();
        commands
            .expect_set_item_quantity()
            .withf(move |c, id, request| {
                *c == caller && *id == product_id && request.quantity == 3
            })
            .times(1)
            .return_once(|_, _, _| Ok(CartPayload::empty()));
        let mut state = HttpState::fixtures().with_auth(Arc::new(gate));
        state.cart_commands = Arc::new(commands);
        let app =
            actix_test::init_service(test_app(state, |scope| scope.service(set_item_quantity)))
                .await;

        let res = actix_test::call_service(
            &app,
            authed(
                actix_test::TestRequest::put()
                    .uri(&format!("/api/v1/cart/items/{}", product_id.as_uuid()))
                    .set_json(json!({"quantity": 3})),
                "tok-1",
            ),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn clear_cart_returns_the_empty_cart() {
        let (gate, _) = FixtureAuthGate::customer("tok-1");
        let state = HttpState::fixtures().with_auth(Arc::new(gate));
        let app =
            actix_test::init_service(test_app(state, |scope| scope.service(clear_cart))).await;

        let res = actix_test::call_service(
            &app,
            authed(
                actix_test::TestRequest::delete().uri("/api/v1/cart"),
                "tok-1",
            ),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: CartPayload = actix_test::read_body_json(res).await;
        assert!(body.items.is_empty());
    }
}
