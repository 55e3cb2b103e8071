//! Driven port for catalogue persistence.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::product::{Category, Product, ProductId, ProductSort};

use super::paging::{Page, PageRequest};

/// Persistence errors raised by [`ProductRepository`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProductRepositoryError {
    /// Repository connection could not be established.
    #[error("product repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("product repository query failed: {message}")]
    Query { message: String },
}

impl ProductRepositoryError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Filters applied to the public catalogue listing.
///
/// All filters combine conjunctively; `search` matches name or description
/// case-insensitively.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    pub category: Option<Category>,
    pub featured: Option<bool>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub search: Option<String>,
    /// When false, inactive products are included (admin views).
    pub only_active: bool,
}

impl ProductFilter {
    /// Filter for shopper-facing listings: active products only.
    pub fn active() -> Self {
        Self {
            only_active: true,
            ..Self::default()
        }
    }
}

/// Partial update applied to an existing product; `None` fields are kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub category: Option<Category>,
    pub image: Option<String>,
    pub featured: Option<bool>,
    pub stock: Option<i32>,
    pub active: Option<bool>,
    pub brand: Option<String>,
    pub model: Option<String>,
}

/// Persistence port for catalogue products.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// List products matching the filter, sorted and paginated.
    async fn list(
        &self,
        filter: ProductFilter,
        sort: ProductSort,
        page: PageRequest,
    ) -> Result<Page<Product>, ProductRepositoryError>;

    /// Fetch an active product by id.
    async fn find_active_by_id(
        &self,
        id: ProductId,
    ) -> Result<Option<Product>, ProductRepositoryError>;

    /// Insert a new product.
    async fn insert(&self, product: &Product) -> Result<(), ProductRepositoryError>;

    /// Apply a partial update, returning the updated product when found.
    async fn update(
        &self,
        id: ProductId,
        changes: ProductChanges,
    ) -> Result<Option<Product>, ProductRepositoryError>;

    /// Soft-delete by clearing the active flag; returns whether a row matched.
    async fn deactivate(&self, id: ProductId) -> Result<bool, ProductRepositoryError>;
}

/// Fixture implementation for tests that do not exercise the catalogue.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureProductRepository;

#[async_trait]
impl ProductRepository for FixtureProductRepository {
    async fn list(
        &self,
        _filter: ProductFilter,
        _sort: ProductSort,
        page: PageRequest,
    ) -> Result<Page<Product>, ProductRepositoryError> {
        Ok(Page {
            items: Vec::new(),
            total: 0,
            request: page,
        })
    }

    async fn find_active_by_id(
        &self,
        _id: ProductId,
    ) -> Result<Option<Product>, ProductRepositoryError> {
        Ok(None)
    }

    async fn insert(&self, _product: &Product) -> Result<(), ProductRepositoryError> {
        Ok(())
    }

    async fn update(
        &self,
        _id: ProductId,
        _changes: ProductChanges,
    ) -> Result<Option<Product>, ProductRepositoryError> {
        Ok(None)
    }

    async fn deactivate(&self, _id: ProductId) -> Result<bool, ProductRepositoryError> {
        Ok(false)
    }
}
