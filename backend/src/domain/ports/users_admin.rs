//! Driving port for admin account administration.
//!
//! Separate from [`super::accounts::Accounts`] so the HTTP layer can gate
//! the whole surface behind the admin extractor.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::user::{Caller, Role, UserId};
use crate::domain::Error;

use super::accounts::ProfilePayload;

/// Query parameters for the admin account listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListUsersRequest {
    /// Restrict to one role when set.
    #[serde(default)]
    pub role: Option<Role>,
    /// Restrict to active (or deactivated) accounts when set.
    #[serde(default)]
    pub active: Option<bool>,
    /// 1-based page number; defaults to the first page.
    #[serde(default)]
    pub page: Option<u32>,
    /// Page size; clamped server-side.
    #[serde(default)]
    pub per_page: Option<u32>,
}

/// Response for the admin account listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersResponse {
    pub users: Vec<ProfilePayload>,
    /// Total matching accounts across all pages.
    pub total: i64,
    /// The 1-based page returned.
    pub page: u32,
    /// Number of pages at the effective page size.
    pub pages: i64,
}

/// Request body for an admin account update; absent fields are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub active: Option<bool>,
}

/// Driving port for account administration. Admin only.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserAdmin: Send + Sync {
    /// List accounts matching the filters, newest first.
    async fn list_users(&self, request: ListUsersRequest) -> Result<ListUsersResponse, Error>;

    /// Fetch one account.
    async fn get_user(&self, user_id: UserId) -> Result<ProfilePayload, Error>;

    /// Apply a partial update to an account, including role and active
    /// changes.
    ///
    /// # Errors
    ///
    /// An email already registered to another account surfaces as
    /// [`crate::domain::ErrorCode::Conflict`].
    async fn update_user(
        &self,
        user_id: UserId,
        request: UpdateUserRequest,
    ) -> Result<ProfilePayload, Error>;

    /// Deactivate an account. Admins cannot deactivate themselves.
    async fn deactivate_user(&self, caller: Caller, user_id: UserId) -> Result<(), Error>;
}

/// Fixture implementation for handler tests that do not exercise account
/// administration.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUserAdmin;

#[async_trait]
impl UserAdmin for FixtureUserAdmin {
    async fn list_users(&self, request: ListUsersRequest) -> Result<ListUsersResponse, Error> {
        Ok(ListUsersResponse {
            users: Vec::new(),
            total: 0,
            page: request.page.unwrap_or(1).max(1),
            pages: 0,
        })
    }

    async fn get_user(&self, user_id: UserId) -> Result<ProfilePayload, Error> {
        Err(Error::not_found(format!("user {user_id} not found")))
    }

    async fn update_user(
        &self,
        user_id: UserId,
        _request: UpdateUserRequest,
    ) -> Result<ProfilePayload, Error> {
        Err(Error::not_found(format!("user {user_id} not found")))
    }

    async fn deactivate_user(&self, _caller: Caller, user_id: UserId) -> Result<(), Error> {
        Err(Error::not_found(format!("user {user_id} not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixture_listing_is_empty() {
        let admin = FixtureUserAdmin;

        let response = admin
            .list_users(ListUsersRequest::default())
            .await
            .expect("fixture list succeeds");

        assert!(response.users.is_empty());
        assert_eq!(response.page, 1);
    }

    #[test]
    fn listing_request_parses_from_sparse_query() {
        let parsed: ListUsersRequest = serde_json::from_value(serde_json::json!({
            "role": "admin",
            "active": true,
        }))
        .unwrap_or_else(|err| panic!("request should parse: {err}"));

        assert_eq!(parsed.role, Some(Role::Admin));
        assert_eq!(parsed.active, Some(true));
        assert_eq!(parsed.page, None);
    }
}
