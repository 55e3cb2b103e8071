//! PostgreSQL-backed `UserRepository` implementation using Diesel.

use async_trait::async_trait;
use chrono::Utc;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{
    AccountChanges, Page, PageRequest, ProfileChanges, UserFilter, UserRepository,
    UserRepositoryError,
};
use crate::domain::user::{Role, User, UserId};

use super::diesel_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewUserRow, UserAccountChangeset, UserProfileChangeset, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserRepositoryError {
    map_basic_pool_error(error, UserRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserRepositoryError {
    map_basic_diesel_error(
        error,
        UserRepositoryError::query,
        UserRepositoryError::connection,
    )
}

/// Map write errors, surfacing the unique email constraint as its own
/// variant.
fn map_insert_error(error: diesel::result::Error) -> UserRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    if let DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) = &error {
        return UserRepositoryError::DuplicateEmail;
    }
    map_diesel_error(error)
}

/// Convert a stored row to a domain user.
pub(crate) fn row_to_user(row: UserRow) -> User {
    let role = row.role.parse::<Role>().unwrap_or_else(|_| {
        warn!(
            user_id = %row.id,
            value = %row.role,
            "unrecognised role, defaulting to customer"
        );
        Role::Customer
    });

    User {
        id: UserId::from_uuid(row.id),
        name: row.name,
        email: row.email,
        phone: row.phone,
        password_digest: row.password_digest,
        role,
        active: row.active,
        created_at: row.created_at,
    }
}

fn filtered(filter: UserFilter) -> users::BoxedQuery<'static, Pg> {
    let mut query = users::table.into_boxed();
    if let Some(role) = filter.role {
        query = query.filter(users::role.eq(role.as_str()));
    }
    if let Some(active) = filter.active {
        query = query.filter(users::active.eq(active));
    }
    query
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewUserRow {
            id: *user.id.as_uuid(),
            name: &user.name,
            email: &user.email,
            phone: &user.phone,
            password_digest: &user.password_digest,
            role: user.role.as_str(),
            active: user.active,
        };
        diesel::insert_into(users::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_insert_error)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(row_to_user))
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(row_to_user))
    }

    async fn update_profile(
        &self,
        id: UserId,
        changes: ProfileChanges,
    ) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changeset = UserProfileChangeset {
            name: changes.name.as_deref(),
            phone: changes.phone.as_deref(),
            updated_at: Utc::now(),
        };
        let row: Option<UserRow> = diesel::update(users::table.find(id.as_uuid()))
            .set(&changeset)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(row_to_user))
    }

    async fn list(
        &self,
        filter: UserFilter,
        page: PageRequest,
    ) -> Result<Page<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = filtered(filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let rows: Vec<UserRow> = filtered(filter)
            .select(UserRow::as_select())
            .order(users::created_at.desc())
            .offset(page.offset())
            .limit(page.limit())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(Page {
            items: rows.into_iter().map(row_to_user).collect(),
            total,
            request: page,
        })
    }

    async fn update_account(
        &self,
        id: UserId,
        changes: AccountChanges,
    ) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changeset = UserAccountChangeset {
            name: changes.name.as_deref(),
            email: changes.email.as_deref(),
            phone: changes.phone.as_deref(),
            role: changes.role.map(Role::as_str),
            active: changes.active,
            updated_at: Utc::now(),
        };
        let row: Option<UserRow> = diesel::update(users::table.find(id.as_uuid()))
            .set(&changeset)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_insert_error)?;

        Ok(row.map(row_to_user))
    }

    async fn set_password_digest(
        &self,
        id: UserId,
        digest: &str,
    ) -> Result<bool, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = diesel::update(users::table.find(id.as_uuid()))
            .set((
                users::password_digest.eq(digest),
                users::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(updated > 0)
    }
}
