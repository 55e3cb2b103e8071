//! PostgreSQL-backed `ProductRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{
    Page, PageRequest, ProductChanges, ProductFilter, ProductRepository, ProductRepositoryError,
};
use crate::domain::product::{Category, Product, ProductId, ProductSort};

use super::diesel_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewProductRow, ProductChangeset, ProductRow};
use super::pool::{DbPool, PoolError};
use super::schema::products;

/// Diesel-backed implementation of the `ProductRepository` port.
#[derive(Clone)]
pub struct DieselProductRepository {
    pool: DbPool,
}

impl DieselProductRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ProductRepositoryError {
    map_basic_pool_error(error, ProductRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ProductRepositoryError {
    map_basic_diesel_error(
        error,
        ProductRepositoryError::query,
        ProductRepositoryError::connection,
    )
}

/// Convert a stored row to a domain product.
///
/// Unknown category slugs are kept readable instead of failing the whole
/// listing; they fall back to accessories with a warning.
pub(crate) fn row_to_product(row: ProductRow) -> Product {
    let category = row.category.parse::<Category>().unwrap_or_else(|_| {
        warn!(
            product_id = %row.id,
            value = %row.category,
            "unrecognised category slug, defaulting to accessories"
        );
        Category::Accessories
    });

    Product {
        id: ProductId::from_uuid(row.id),
        name: row.name,
        description: row.description,
        price: row.price,
        category,
        image: row.image,
        featured: row.featured,
        stock: row.stock,
        active: row.active,
        brand: row.brand,
        model: row.model,
        created_at: row.created_at,
    }
}

/// Escape LIKE metacharacters in a shopper-supplied search term.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// Boxed query applying every filter conjunctively; used by both the count
/// and the page query so they always agree.
fn filtered(filter: &ProductFilter) -> products::BoxedQuery<'static, Pg> {
    let mut query = products::table.into_boxed();
    if let Some(category) = filter.category {
        query = query.filter(products::category.eq(category.as_str()));
    }
    if let Some(featured) = filter.featured {
        query = query.filter(products::featured.eq(featured));
    }
    if let Some(min) = filter.min_price {
        query = query.filter(products::price.ge(min));
    }
    if let Some(max) = filter.max_price {
        query = query.filter(products::price.le(max));
    }
    if let Some(term) = &filter.search {
        let pattern = like_pattern(term);
        query = query.filter(
            products::name
                .ilike(pattern.clone())
                .or(products::description.ilike(pattern)),
        );
    }
    if filter.only_active {
        query = query.filter(products::active.eq(true));
    }
    query
}

#[async_trait]
impl ProductRepository for DieselProductRepository {
    async fn list(
        &self,
        filter: ProductFilter,
        sort: ProductSort,
        page: PageRequest,
    ) -> Result<Page<Product>, ProductRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = filtered(&filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let query = filtered(&filter).select(ProductRow::as_select());
        let query = match sort {
            ProductSort::Newest => query.order(products::created_at.desc()),
            ProductSort::PriceAsc => query.order(products::price.asc()),
            ProductSort::PriceDesc => query.order(products::price.desc()),
            ProductSort::NameAsc => query.order(products::name.asc()),
            ProductSort::NameDesc => query.order(products::name.desc()),
        };
        let rows: Vec<ProductRow> = query
            .offset(page.offset())
            .limit(page.limit())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(Page {
            items: rows.into_iter().map(row_to_product).collect(),
            total,
            request: page,
        })
    }

    async fn find_active_by_id(
        &self,
        id: ProductId,
    ) -> Result<Option<Product>, ProductRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ProductRow> = products::table
            .filter(products::id.eq(id.as_uuid()).and(products::active.eq(true)))
            .select(ProductRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(row_to_product))
    }

    async fn insert(&self, product: &Product) -> Result<(), ProductRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewProductRow {
            id: *product.id.as_uuid(),
            name: &product.name,
            description: &product.description,
            price: product.price,
            category: product.category.as_str(),
            image: &product.image,
            featured: product.featured,
            stock: product.stock,
            active: product.active,
            brand: &product.brand,
            model: &product.model,
        };
        diesel::insert_into(products::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update(
        &self,
        id: ProductId,
        changes: ProductChanges,
    ) -> Result<Option<Product>, ProductRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changeset = ProductChangeset {
            name: changes.name.as_deref(),
            description: changes.description.as_deref(),
            price: changes.price,
            category: changes.category.map(Category::as_str),
            image: changes.image.as_deref(),
            featured: changes.featured,
            stock: changes.stock,
            active: changes.active,
            brand: changes.brand.as_deref(),
            model: changes.model.as_deref(),
            updated_at: chrono::Utc::now(),
        };
        let row: Option<ProductRow> = diesel::update(products::table.find(id.as_uuid()))
            .set(&changeset)
            .returning(ProductRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(row_to_product))
    }

    async fn deactivate(&self, id: ProductId) -> Result<bool, ProductRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let affected = diesel::update(products::table.find(id.as_uuid()))
            .set((
                products::active.eq(false),
                products::updated_at.eq(chrono::Utc::now()),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(affected > 0)
    }
}
