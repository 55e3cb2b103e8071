//! Catalogue domain service implementing the driving ports.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;

use crate::domain::ports::{
    CatalogueCommand, CatalogueQuery, CreateProductRequest, ListProductsRequest,
    ListProductsResponse, PageRequest, ProductChanges, ProductFilter, ProductPayload,
    ProductRepository, ProductRepositoryError, UpdateProductRequest,
};
use crate::domain::product::{Product, ProductId};
use crate::domain::Error;

/// Default catalogue page size.
const DEFAULT_PRODUCTS_PER_PAGE: u32 = 12;

/// Catalogue service implementing [`CatalogueQuery`] and [`CatalogueCommand`].
#[derive(Clone)]
pub struct CatalogueService<P> {
    products: Arc<P>,
}

impl<P> CatalogueService<P> {
    /// Create a new service over the given repository.
    pub fn new(products: Arc<P>) -> Self {
        Self { products }
    }
}

impl<P> CatalogueService<P>
where
    P: ProductRepository,
{
    fn map_repository_error(error: ProductRepositoryError) -> Error {
        match error {
            ProductRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("product repository unavailable: {message}"))
            }
            ProductRepositoryError::Query { message } => {
                Error::internal(format!("product repository error: {message}"))
            }
        }
    }

    fn require_non_negative(label: &str, value: Decimal) -> Result<(), Error> {
        if value < Decimal::ZERO {
            return Err(Error::invalid_request(format!(
                "{label} must not be negative"
            )));
        }
        Ok(())
    }

    fn require_non_negative_stock(stock: i32) -> Result<(), Error> {
        if stock < 0 {
            return Err(Error::invalid_request("stock must not be negative"));
        }
        Ok(())
    }
}

#[async_trait]
impl<P> CatalogueQuery for CatalogueService<P>
where
    P: ProductRepository,
{
    async fn list_products(
        &self,
        request: ListProductsRequest,
    ) -> Result<ListProductsResponse, Error> {
        if let (Some(min), Some(max)) = (request.min_price, request.max_price) {
            if min > max {
                return Err(Error::invalid_request(
                    "minPrice must not exceed maxPrice",
                ));
            }
        }

        let filter = ProductFilter {
            category: request.category,
            featured: request.featured,
            min_price: request.min_price,
            max_price: request.max_price,
            search: request
                .search
                .map(|term| term.trim().to_owned())
                .filter(|term| !term.is_empty()),
            only_active: true,
        };
        let page_request = PageRequest::new(
            request.page.unwrap_or(1),
            request.per_page.unwrap_or(DEFAULT_PRODUCTS_PER_PAGE),
        );

        let page = self
            .products
            .list(filter, request.sort.unwrap_or_default(), page_request)
            .await
            .map_err(Self::map_repository_error)?;

        Ok(ListProductsResponse {
            total: page.total,
            page: page.request.page(),
            pages: page.pages(),
            products: page.items.into_iter().map(ProductPayload::from).collect(),
        })
    }

    async fn get_product(&self, product_id: ProductId) -> Result<ProductPayload, Error> {
        self.products
            .find_active_by_id(product_id)
            .await
            .map_err(Self::map_repository_error)?
            .map(ProductPayload::from)
            .ok_or_else(|| Error::not_found(format!("product {product_id} not found")))
    }
}

#[async_trait]
impl<P> CatalogueCommand for CatalogueService<P>
where
    P: ProductRepository,
{
    async fn create_product(
        &self,
        request: CreateProductRequest,
    ) -> Result<ProductPayload, Error> {
        if request.name.trim().is_empty() {
            return Err(Error::invalid_request("product name must not be empty"));
        }
        Self::require_non_negative("price", request.price)?;
        Self::require_non_negative_stock(request.stock)?;

        let product = Product {
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
        };
        self.products
            .insert(&product)
            .await
            .map_err(Self::map_repository_error)?;

        tracing::info!(product_id = %product.id, name = %product.name, "product created");
        Ok(product.into())
    }

    async fn update_product(
        &self,
        product_id: ProductId,
        request: UpdateProductRequest,
    ) -> Result<ProductPayload, Error> {
        if let Some(name) = &request.name {
            if name.trim().is_empty() {
                return Err(Error::invalid_request("product name must not be empty"));
            }
        }
        if let Some(price) = request.price {
            Self::require_non_negative("price", price)?;
        }
        if let Some(stock) = request.stock {
            Self::require_non_negative_stock(stock)?;
        }

        let changes = ProductChanges {
            name: request.name,
            description: request.description,
            price: request.price,
            category: request.category,
            image: request.image,
            featured: request.featured,
            stock: request.stock,
            active: request.active,
            brand: request.brand,
            model: request.model,
        };
        self.products
            .update(product_id, changes)
            .await
            .map_err(Self::map_repository_error)?
            .map(ProductPayload::from)
            .ok_or_else(|| Error::not_found(format!("product {product_id} not found")))
    }

    async fn delete_product(&self, product_id: ProductId) -> Result<(), Error> {
        let deactivated = self
            .products
            .deactivate(product_id)
            .await
            .map_err(Self::map_repository_error)?;
        if !deactivated {
            return Err(Error::not_found(format!("product {product_id} not found")));
        }

        tracing::info!(product_id = %product_id, "product deactivated");
        Ok(())
    }
}
