//! PostgreSQL-backed `TokenRepository` implementation using Diesel.
//!
//! The table stores SHA-256 digests, never raw tokens. Resolution joins the
//! owning account so deactivated users fail authentication immediately.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;
use uuid::Uuid;

use crate::domain::ports::{TokenRepository, TokenRepositoryError};
use crate::domain::user::{Caller, Role, UserId};

use super::diesel_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::NewAuthTokenRow;
use super::pool::{DbPool, PoolError};
use super::schema::{auth_tokens, users};

/// Diesel-backed implementation of the `TokenRepository` port.
#[derive(Clone)]
pub struct DieselTokenRepository {
    pool: DbPool,
}

impl DieselTokenRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> TokenRepositoryError {
    map_basic_pool_error(error, TokenRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> TokenRepositoryError {
    map_basic_diesel_error(
        error,
        TokenRepositoryError::query,
        TokenRepositoryError::connection,
    )
}

#[async_trait]
impl TokenRepository for DieselTokenRepository {
    async fn insert(&self, digest: &str, user_id: UserId) -> Result<(), TokenRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewAuthTokenRow {
            token_digest: digest,
            user_id: *user_id.as_uuid(),
        };
        diesel::insert_into(auth_tokens::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn resolve(&self, digest: &str) -> Result<Option<Caller>, TokenRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<(Uuid, String)> = auth_tokens::table
            .inner_join(users::table)
            .filter(
                auth_tokens::token_digest
                    .eq(digest)
                    .and(users::active.eq(true)),
            )
            .select((users::id, users::role))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(|(user_id, role)| {
            let role = role.parse::<Role>().unwrap_or_else(|_| {
                warn!(
                    user_id = %user_id,
                    value = %role,
                    "unrecognised role, defaulting to customer"
                );
                Role::Customer
            });
            Caller {
                user_id: UserId::from_uuid(user_id),
                role,
            }
        }))
    }

    async fn revoke(&self, digest: &str) -> Result<bool, TokenRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let affected =
            diesel::delete(auth_tokens::table.filter(auth_tokens::token_digest.eq(digest)))
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)?;

        Ok(affected > 0)
    }
}
