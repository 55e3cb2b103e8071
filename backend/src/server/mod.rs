//! Server construction and dependency wiring.

mod config;

pub use config::{AppConfig, ConfigError};

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{web, App, HttpServer};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::{
    AccountsService, CartService, CatalogueService, CheckoutPolicy, OrderService, TokenAuthGate,
};
use crate::inbound::http::health::{live, ready, HealthState};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::{cart, orders, products, users};
use crate::outbound::persistence::{
    DbPool, DieselCartRepository, DieselOrderRepository, DieselProductRepository,
    DieselTokenRepository, DieselUserRepository,
};

/// Wire the Diesel-backed repositories and domain services into HTTP state.
pub fn build_http_state(pool: DbPool, policy: CheckoutPolicy) -> HttpState {
    let products = Arc::new(DieselProductRepository::new(pool.clone()));
    let order_repo = Arc::new(DieselOrderRepository::new(pool.clone()));
    let cart_repo = Arc::new(DieselCartRepository::new(pool.clone()));
    let users_repo = Arc::new(DieselUserRepository::new(pool.clone()));
    let tokens = Arc::new(DieselTokenRepository::new(pool));

    let orders = Arc::new(OrderService::new(order_repo, policy));
    let catalogue = Arc::new(CatalogueService::new(products.clone()));
    let cart = Arc::new(CartService::new(cart_repo, products));
    let accounts = Arc::new(AccountsService::new(users_repo, tokens.clone()));
    let auth = Arc::new(TokenAuthGate::new(tokens));

    HttpState {
        auth,
        accounts: accounts.clone(),
        catalogue: catalogue.clone(),
        catalogue_admin: catalogue,
        cart: cart.clone(),
        cart_commands: cart,
        orders: orders.clone(),
        order_commands: orders,
        users_admin: accounts,
    }
}

/// Assemble the Actix application from prepared state.
pub fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let api = web::scope("/api/v1")
        .service(users::register)
        .service(users::login)
        .service(users::logout)
        .service(users::get_profile)
        .service(users::update_profile)
        .service(users::change_password)
        .service(users::list_users)
        .service(users::get_user)
        .service(users::update_user)
        .service(users::deactivate_user)
        .service(products::list_products)
        .service(products::get_product)
        .service(products::create_product)
        .service(products::update_product)
        .service(products::delete_product)
        .service(cart::get_cart)
        .service(cart::add_item)
        .service(cart::set_item_quantity)
        .service(cart::remove_item)
        .service(cart::clear_cart)
        .service(orders::place_order)
        .service(orders::list_my_orders)
        .service(orders::get_order)
        .service(orders::cancel_order)
        .service(orders::list_orders)
        .service(orders::set_order_status);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server from the configuration and pool.
///
/// # Errors
///
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: &AppConfig,
    pool: DbPool,
) -> std::io::Result<Server> {
    let http_state = web::Data::new(build_http_state(pool, config.policy));
    let server_health_state = health_state.clone();

    let server = HttpServer::new(move || {
        build_app(server_health_state.clone(), http_state.clone())
    })
    .bind(config.bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
