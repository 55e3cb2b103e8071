//! PostgreSQL-backed `CartRepository` implementation using Diesel.
//!
//! Cart lines are unique per (user, product); adding an existing product
//! accumulates its quantity through an upsert instead of a second row.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::cart::CartLine;
use crate::domain::ports::{CartRepository, CartRepositoryError};
use crate::domain::product::ProductId;
use crate::domain::user::UserId;

use super::diesel_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::diesel_product_repository::row_to_product;
use super::models::{CartItemRow, NewCartItemRow, ProductRow};
use super::pool::{DbPool, PoolError};
use super::schema::{cart_items, products};

/// Diesel-backed implementation of the `CartRepository` port.
#[derive(Clone)]
pub struct DieselCartRepository {
    pool: DbPool,
}

impl DieselCartRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CartRepositoryError {
    map_basic_pool_error(error, CartRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> CartRepositoryError {
    map_basic_diesel_error(
        error,
        CartRepositoryError::query,
        CartRepositoryError::connection,
    )
}

#[async_trait]
impl CartRepository for DieselCartRepository {
    async fn lines_for_user(&self, user_id: UserId) -> Result<Vec<CartLine>, CartRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // Joining on active products drops lines whose product has been
        // soft-deleted since it was added.
        let rows: Vec<(CartItemRow, ProductRow)> = cart_items::table
            .inner_join(products::table)
            .filter(
                cart_items::user_id
                    .eq(user_id.as_uuid())
                    .and(products::active.eq(true)),
            )
            .order(cart_items::created_at.asc())
            .select((CartItemRow::as_select(), ProductRow::as_select()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows
            .into_iter()
            .map(|(item, product)| CartLine {
                user_id,
                product: row_to_product(product),
                quantity: item.quantity,
            })
            .collect())
    }

    async fn add_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<(), CartRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewCartItemRow {
            id: Uuid::new_v4(),
            user_id: *user_id.as_uuid(),
            product_id: *product_id.as_uuid(),
            quantity,
        };
        diesel::insert_into(cart_items::table)
            .values(&new_row)
            .on_conflict((cart_items::user_id, cart_items::product_id))
            .do_update()
            .set((
                cart_items::quantity.eq(cart_items::quantity + excluded(cart_items::quantity)),
                cart_items::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn set_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<bool, CartRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let affected = diesel::update(
            cart_items::table.filter(
                cart_items::user_id
                    .eq(user_id.as_uuid())
                    .and(cart_items::product_id.eq(product_id.as_uuid())),
            ),
        )
        .set((
            cart_items::quantity.eq(quantity),
            cart_items::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        Ok(affected > 0)
    }

    async fn remove_line(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<bool, CartRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let affected = diesel::delete(
            cart_items::table.filter(
                cart_items::user_id
                    .eq(user_id.as_uuid())
                    .and(cart_items::product_id.eq(product_id.as_uuid())),
            ),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        Ok(affected > 0)
    }

    async fn clear(&self, user_id: UserId) -> Result<(), CartRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::delete(cart_items::table.filter(cart_items::user_id.eq(user_id.as_uuid())))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}
