//! OpenAPI documentation configuration.
//!
//! Defines [`ApiDoc`], the generated specification for the REST API. The
//! document registers every HTTP endpoint, the shared payload schemas, and
//! the bearer-token security scheme. Swagger UI serves it in debug builds.

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::order::{
    OrderItem, OrderStatus, PaymentMethod, ShippingAddress, StatusHistoryEntry,
};
use crate::domain::ports::{
    AddCartItemRequest, AuthResponse, CartLinePayload, CartPayload, ChangePasswordRequest,
    CreateProductRequest, ListOrdersResponse, ListProductsResponse, ListUsersResponse,
    LoginRequest, OrderPayload, OrderStatisticsPayload, PlaceOrderItem, PlaceOrderRequest,
    ProductPayload, ProfilePayload, RegisterRequest, SetOrderStatusRequest, UpdateCartItemRequest,
    UpdateProductRequest, UpdateProfileRequest, UpdateUserRequest,
};
use crate::domain::product::Category;
use crate::domain::user::Role;
use crate::domain::{Error, ErrorCode};

/// Enrich the generated document with the bearer-token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Storefront backend API",
        description = "HTTP interface for the catalogue, cart, checkout, and order administration."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::get_profile,
        crate::inbound::http::users::update_profile,
        crate::inbound::http::users::change_password,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::deactivate_user,
        crate::inbound::http::products::list_products,
        crate::inbound::http::products::get_product,
        crate::inbound::http::products::create_product,
        crate::inbound::http::products::update_product,
        crate::inbound::http::products::delete_product,
        crate::inbound::http::cart::get_cart,
        crate::inbound::http::cart::add_item,
        crate::inbound::http::cart::set_item_quantity,
        crate::inbound::http::cart::remove_item,
        crate::inbound::http::cart::clear_cart,
        crate::inbound::http::orders::place_order,
        crate::inbound::http::orders::list_my_orders,
        crate::inbound::http::orders::get_order,
        crate::inbound::http::orders::cancel_order,
        crate::inbound::http::orders::list_orders,
        crate::inbound::http::orders::set_order_status,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        Role,
        Category,
        RegisterRequest,
        LoginRequest,
        UpdateProfileRequest,
        ChangePasswordRequest,
        ProfilePayload,
        AuthResponse,
        ListUsersResponse,
        UpdateUserRequest,
        ProductPayload,
        ListProductsResponse,
        CreateProductRequest,
        UpdateProductRequest,
        CartPayload,
        CartLinePayload,
        AddCartItemRequest,
        UpdateCartItemRequest,
        PlaceOrderRequest,
        PlaceOrderItem,
        SetOrderStatusRequest,
        OrderPayload,
        OrderItem,
        OrderStatus,
        PaymentMethod,
        ShippingAddress,
        StatusHistoryEntry,
        ListOrdersResponse,
        OrderStatisticsPayload,
    )),
    tags(
        (name = "auth", description = "Registration, login, and profile management"),
        (name = "users", description = "Admin account administration"),
        (name = "products", description = "Public catalogue and admin product management"),
        (name = "cart", description = "The authenticated caller's shopping cart"),
        (name = "orders", description = "Checkout, order history, and order administration"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::OpenApi;

    #[test]
    fn document_registers_the_order_endpoints() {
        let doc = ApiDoc::openapi();

        assert!(doc.paths.paths.contains_key("/api/v1/orders"));
        assert!(doc.paths.paths.contains_key("/api/v1/orders/{id}/cancel"));
        assert!(doc
            .paths
            .paths
            .contains_key("/api/v1/admin/orders/{id}/status"));
    }

    #[test]
    fn document_registers_the_account_admin_endpoints() {
        let doc = ApiDoc::openapi();

        assert!(doc.paths.paths.contains_key("/api/v1/auth/password"));
        assert!(doc.paths.paths.contains_key("/api/v1/admin/users"));
        assert!(doc.paths.paths.contains_key("/api/v1/admin/users/{id}"));
    }

    #[test]
    fn document_registers_the_error_schema() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;

        assert!(schemas.keys().any(|name| name.contains("Error")));
    }
}
