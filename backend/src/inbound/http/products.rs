//! Catalogue HTTP handlers.
//!
//! ```text
//! GET    /api/v1/products          public listing with filters
//! GET    /api/v1/products/{id}     public detail
//! POST   /api/v1/products          admin create
//! PUT    /api/v1/products/{id}     admin partial update
//! DELETE /api/v1/products/{id}     admin soft delete
//! ```

use actix_web::{delete, get, post, put, web, HttpResponse};
use uuid::Uuid;

use crate::domain::ports::{
    CreateProductRequest, ListProductsRequest, ListProductsResponse, ProductPayload,
    UpdateProductRequest,
};
use crate::domain::product::ProductId;
use crate::domain::Error;
use crate::inbound::http::auth::AdminContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// List active products matching the query filters.
#[utoipa::path(
    get,
    path = "/api/v1/products",
    params(ListProductsRequest),
    responses(
        (status = 200, description = "Matching products", body = ListProductsResponse),
        (status = 400, description = "Invalid filters", body = Error)
    ),
    security([]),
    tags = ["products"],
    operation_id = "listProducts"
)]
#[get("/products")]
pub async fn list_products(
    state: web::Data<HttpState>,
    query: web::Query<ListProductsRequest>,
) -> ApiResult<web::Json<ListProductsResponse>> {
    let response = state.catalogue.list_products(query.into_inner()).await?;
    Ok(web::Json(response))
}

/// Fetch one active product.
#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    params(("id" = Uuid, Path, description = "Product identifier")),
    responses(
        (status = 200, description = "The product", body = ProductPayload),
        (status = 404, description = "Unknown or inactive product", body = Error)
    ),
    security([]),
    tags = ["products"],
    operation_id = "getProduct"
)]
#[get("/products/{id}")]
pub async fn get_product(
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<ProductPayload>> {
    let product = state
        .catalogue
        .get_product(ProductId::from_uuid(path.into_inner()))
        .await?;
    Ok(web::Json(product))
}

/// Create a new product. Admin only.
#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Created product", body = ProductPayload),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not an administrator", body = Error)
    ),
    tags = ["products"],
    operation_id = "createProduct"
)]
#[post("/products")]
pub async fn create_product(
    state: web::Data<HttpState>,
    _ctx: AdminContext,
    payload: web::Json<CreateProductRequest>,
) -> ApiResult<HttpResponse> {
    let product = state
        .catalogue_admin
        .create_product(payload.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(product))
}

/// Apply a partial update to a product. Admin only.
#[utoipa::path(
    put,
    path = "/api/v1/products/{id}",
    params(("id" = Uuid, Path, description = "Product identifier")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Updated product", body = ProductPayload),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Not an administrator", body = Error),
        (status = 404, description = "Unknown product", body = Error)
    ),
    tags = ["products"],
    operation_id = "updateProduct"
)]
#[put("/products/{id}")]
pub async fn update_product(
    state: web::Data<HttpState>,
    _ctx: AdminContext,
    path: web::Path<Uuid>,
    payload: web::Json<UpdateProductRequest>,
) -> ApiResult<web::Json<ProductPayload>> {
    let product = state
        .catalogue_admin
        .update_product(ProductId::from_uuid(path.into_inner()), payload.into_inner())
        .await?;
    Ok(web::Json(product))
}

/// Soft-delete a product by clearing its active flag. Admin only.
#[utoipa::path(
    delete,
    path = "/api/v1/products/{id}",
    params(("id" = Uuid, Path, description = "Product identifier")),
    responses(
        (status = 204, description = "Product deactivated"),
        (status = 403, description = "Not an administrator", body = Error),
        (status = 404, description = "Unknown product", body = Error)
    ),
    tags = ["products"],
    operation_id = "deleteProduct"
)]
#[delete("/products/{id}")]
pub async fn delete_product(
    state: web::Data<HttpState>,
    _ctx: AdminContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    state
        .catalogue_admin
        .delete_product(ProductId::from_uuid(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{FixtureAuthGate, MockCatalogueCommand, MockCatalogueQuery};
    use crate::domain::product::Category;
    use crate::inbound::http::test_utils::{authed, test_app};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use std::sync::Arc;

    fn sample_payload() -> ProductPayload {
        ProductPayload {
            id: ProductId::random(),
            name: "Laptop Pro".to_owned(),
            description: "Fast".to_owned(),
            price: dec!(499.00),
            category: Category::Laptops,
            image: String::new(),
            featured: false,
            stock: 5,
            active: true,
            brand: String::new(),
            model: String::new(),
            created_at: Utc::now(),
        }
    }

    #[actix_web::test]
    async fn listing_parses_query_filters() {
        let mut catalogue = MockCatalogueQuery::new();
        catalogue
            .expect_list_products()
            .withf(|request| {
                request.category == Some(Category::Laptops)
                    && request.featured == Some(true)
                    && request.min_price == Some(dec!(100))
                    && request.page == Some(2)
            })
            .times(1)
            .return_once(|request| {
                Ok(ListProductsResponse {
                    products: Vec::new(),
                    total: 0,
                    page: request.page.unwrap_or(1),
                    pages: 0,
                })
            });
        let mut state = HttpState::fixtures();
        state.catalogue = Arc::new(catalogue);
        let app =
            actix_test::init_service(test_app(state, |scope| scope.service(list_products))).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/products?category=laptops&featured=true&minPrice=100&page=2")
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: ListProductsResponse = actix_test::read_body_json(res).await;
        assert_eq!(body.page, 2);
    }

    #[actix_web::test]
    async fn detail_returns_not_found_for_unknown_products() {
        let state = HttpState::fixtures();
        let app =
            actix_test::init_service(test_app(state, |scope| scope.service(get_product))).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/v1/products/{}", Uuid::new_v4()))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn create_requires_an_admin_token() {
        let (gate, _) = FixtureAuthGate::customer("tok-1");
        let state = HttpState::fixtures().with_auth(Arc::new(gate));
        let app =
            actix_test::init_service(test_app(state, |scope| scope.service(create_product))).await;

        let res = actix_test::call_service(
            &app,
            authed(
                actix_test::TestRequest::post()
                    .uri("/api/v1/products")
                    .set_json(json!({
                        "name": "Laptop Pro",
                        "price": "499.00",
                        "category": "laptops",
                        "stock": 5,
                    })),
                "tok-1",
            ),
        )
        .await;

        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn create_returns_created_for_admins() {
        let (gate, _) = FixtureAuthGate::admin("tok-a");
        let state = HttpState::fixtures().with_auth(Arc::new(gate));
        let app =
            actix_test::init_service(test_app(state, |scope| scope.service(create_product))).await;

        let res = actix_test::call_service(
            &app,
            authed(
                actix_test::TestRequest::post()
                    .uri("/api/v1/products")
                    .set_json(json!({
                        "name": "Laptop Pro",
                        "price": "499.00",
                        "category": "laptops",
                        "stock": 5,
                    })),
                "tok-a",
            ),
        )
        .await;

        assert_eq!(res.status(), StatusCode::CREATED);
        let body: ProductPayload = actix_test::read_body_json(res).await;
        assert_eq!(body.name, "Laptop Pro");
        assert!(body.active);
    }

    #[actix_web::test]
    async fn update_passes_partial_changes_through() {
        let (gate, _) = FixtureAuthGate::admin("tok-a");
        let expected = sample_payload();
        let product_id = expected.id;
        let returned = expected.clone();
        let mut admin = MockCatalogueCommand::new();
        admin
            .expect_update_product()
            .withf(move |id, request| {
                *id == product_id
                    && request.price == Some(dec!(449.00))
                    && request.name.is_none()
            })
            .times(1)
            .return_once(move |_, _| Ok(returned));
        let mut state = HttpState::fixtures().with_auth(Arc::new(gate));
        state.catalogue_admin = Arc::new(admin);
        let app =
            actix_test::init_service(test_app(state, |scope| scope.service(update_product))).await;

        let res = actix_test::call_service(
            &app,
            authed(
                actix_test::TestRequest::put()
                    .uri(&format!("/api/v1/products/{}", product_id.as_uuid()))
                    .set_json(json!({"price": "449.00"})),
                "tok-a",
            ),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn delete_returns_no_content() {
        let (gate, _) = FixtureAuthGate::admin("tok-a");
        let product_id = ProductId::random();
        let mut admin = MockCatalogueCommand::new();
        admin
            .expect_delete_product()
            .withf(move |id| *id == product_id)
            .times(1)
            .return_once(|_| Ok(()));
        let mut state = HttpState::fixtures().with_auth(Arc::new(gate));
        state.catalogue_admin = Arc::new(admin);
        let app =
            actix_test::init_service(test_app(state, |scope| scope.service(delete_product))).await;

        let res = actix_test::call_service(
            &app,
            authed(
                actix_test::TestRequest::delete()
                    .uri(&format!("/api/v1/products/{}", product_id.as_uuid())),
                "tok-a",
            ),
        )
        .await;

        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }
}
