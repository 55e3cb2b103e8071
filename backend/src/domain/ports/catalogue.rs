//! Driving ports for catalogue operations.
//!
//! [`CatalogueQuery`] serves the public listing and detail pages;
//! [`CatalogueCommand`] serves the admin create/update/delete surface.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::product::{Category, Product, ProductId, ProductSort};
use crate::domain::Error;

/// Query parameters for the public catalogue listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListProductsRequest {
    /// Restrict to one category when set.
    #[serde(default)]
    pub category: Option<Category>,
    /// Restrict to featured (or non-featured) products when set.
    #[serde(default)]
    pub featured: Option<bool>,
    /// Lowest accepted price.
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "100.00")]
    #[param(value_type = Option<String>, example = "100.00")]
    pub min_price: Option<Decimal>,
    /// Highest accepted price.
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "999.99")]
    #[param(value_type = Option<String>, example = "999.99")]
    pub max_price: Option<Decimal>,
    /// Case-insensitive match against name or description.
    #[serde(default)]
    pub search: Option<String>,
    /// Sort order; defaults to newest first.
    #[serde(default)]
    pub sort: Option<ProductSort>,
    /// 1-based page number; defaults to the first page.
    #[serde(default)]
    pub page: Option<u32>,
    /// Page size; clamped server-side.
    #[serde(default)]
    pub per_page: Option<u32>,
}

/// A catalogue product as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    #[schema(value_type = String, example = "499.00")]
    pub price: Decimal,
    pub category: Category,
    pub image: String,
    pub featured: bool,
    pub stock: i32,
    pub active: bool,
    pub brand: String,
    pub model: String,
    pub created_at: DateTime<Utc>,
}

impl From<Product> for ProductPayload {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
            category: product.category,
            image: product.image,
            featured: product.featured,
            stock: product.stock,
            active: product.active,
            brand: product.brand,
            model: product.model,
            created_at: product.created_at,
        }
    }
}

/// Response for the catalogue listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListProductsResponse {
    pub products: Vec<ProductPayload>,
    /// Total matching products across all pages.
    pub total: i64,
    /// The 1-based page returned.
    pub page: u32,
    /// Number of pages at the effective page size.
    pub pages: i64,
}

/// Request body for creating a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[schema(value_type = String, example = "499.00")]
    pub price: Decimal,
    pub category: Category,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub featured: bool,
    pub stock: i32,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub model: String,
}

/// Request body for updating a product; absent fields are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "449.00")]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub featured: Option<bool>,
    #[serde(default)]
    pub stock: Option<i32>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

/// Driving port for catalogue reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogueQuery: Send + Sync {
    /// List active products matching the filters.
    async fn list_products(
        &self,
        request: ListProductsRequest,
    ) -> Result<ListProductsResponse, Error>;

    /// Fetch one active product.
    async fn get_product(&self, product_id: ProductId) -> Result<ProductPayload, Error>;
}

/// Driving port for catalogue mutations. Admin only.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogueCommand: Send + Sync {
    /// Create a new product.
    ///
    /// # Errors
    ///
    /// Rejects blank names, negative prices, and negative stock as invalid
    /// requests.
    async fn create_product(&self, request: CreateProductRequest)
        -> Result<ProductPayload, Error>;

    /// Apply a partial update to a product.
    async fn update_product(
        &self,
        product_id: ProductId,
        request: UpdateProductRequest,
    ) -> Result<ProductPayload, Error>;

    /// Soft-delete a product by clearing its active flag. Existing orders
    /// keep their snapshots; carts referencing it drop the line on next read.
    async fn delete_product(&self, product_id: ProductId) -> Result<(), Error>;
}

/// Fixture query for handler tests that do not exercise the catalogue.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCatalogueQuery;

#[async_trait]
impl CatalogueQuery for FixtureCatalogueQuery {
    async fn list_products(
        &self,
        request: ListProductsRequest,
    ) -> Result<ListProductsResponse, Error> {
        Ok(ListProductsResponse {
            products: Vec::new(),
            total: 0,
            page: request.page.unwrap_or(1).max(1),
            pages: 0,
        })
    }

    async fn get_product(&self, product_id: ProductId) -> Result<ProductPayload, Error> {
        Err(Error::not_found(format!("product {product_id} not found")))
    }
}

/// Fixture command for handler tests that do not exercise catalogue writes.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCatalogueCommand;

#[async_trait]
impl CatalogueCommand for FixtureCatalogueCommand {
    async fn create_product(
        &self,
        request: CreateProductRequest,
    ) -> Result<ProductPayload, Error> {
        Ok(ProductPayload {
            id: ProductId::random(),
            name: request.name,
            description: request.description,
            price: request.price,
            category: request.category,
            image: request.image,
            featured: request.featured,
            stock: request.stock,
            active: true,
            brand: request.brand,
            model: request.model,
            created_at: Utc::now(),
        })
    }

    async fn update_product(
        &self,
        product_id: ProductId,
        _request: UpdateProductRequest,
    ) -> Result<ProductPayload, Error> {
        Err(Error::not_found(format!("product {product_id} not found")))
    }

    async fn delete_product(&self, product_id: ProductId) -> Result<(), Error> {
        Err(Error::not_found(format!("product {product_id} not found")))
    }
}
