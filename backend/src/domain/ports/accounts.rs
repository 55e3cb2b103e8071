//! Driving port for account registration, login, and profile management.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::user::{Caller, Role, User, UserId};
use crate::domain::Error;

/// Request body for registering an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Full name shown on the account.
    pub name: String,
    /// Unique login email.
    pub email: String,
    /// Plain-text password; digested before storage.
    pub password: String,
    /// Optional contact phone.
    #[serde(default)]
    pub phone: String,
}

/// Request body for logging in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for updating the caller's profile; absent fields are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Request body for changing the caller's password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    /// The password currently on the account.
    pub current_password: String,
    /// The replacement password.
    pub new_password: String,
}

/// Account details safe to return to clients. Never carries the password
/// digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePayload {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: Role,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for ProfilePayload {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            role: user.role,
            active: user.active,
            created_at: user.created_at,
        }
    }
}

/// Response for register and login: a fresh bearer token plus the profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// Opaque bearer token; only its digest is stored server-side.
    pub token: String,
    pub user: ProfilePayload,
}

/// Driving port for account operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Accounts: Send + Sync {
    /// Register a new customer account and issue a token.
    ///
    /// # Errors
    ///
    /// Rejects blank names, emails without an `@`, and short passwords as
    /// invalid requests; duplicate emails as
    /// [`crate::domain::ErrorCode::Conflict`].
    async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, Error>;

    /// Authenticate with email and password and issue a token.
    ///
    /// # Errors
    ///
    /// Unknown emails, wrong passwords, and inactive accounts all surface as
    /// the same unauthorized error.
    async fn login(&self, request: LoginRequest) -> Result<AuthResponse, Error>;

    /// Revoke the presented token.
    async fn logout(&self, token: &str) -> Result<(), Error>;

    /// The caller's own profile.
    async fn profile(&self, caller: Caller) -> Result<ProfilePayload, Error>;

    /// Apply a partial update to the caller's profile.
    async fn update_profile(
        &self,
        caller: Caller,
        request: UpdateProfileRequest,
    ) -> Result<ProfilePayload, Error>;

    /// Replace the caller's password after verifying the current one.
    ///
    /// # Errors
    ///
    /// A wrong current password surfaces as
    /// [`crate::domain::ErrorCode::Unauthorized`]; a too-short replacement
    /// as an invalid request.
    async fn change_password(
        &self,
        caller: Caller,
        request: ChangePasswordRequest,
    ) -> Result<(), Error>;
}

/// Fixture implementation for handler tests that do not exercise accounts.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAccounts;

#[async_trait]
impl Accounts for FixtureAccounts {
    async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, Error> {
        Ok(AuthResponse {
            token: "fixture-token".to_owned(),
            user: ProfilePayload {
                id: UserId::random(),
                name: request.name,
                email: request.email,
                phone: request.phone,
                role: Role::Customer,
                active: true,
                created_at: Utc::now(),
            },
        })
    }

    async fn login(&self, _request: LoginRequest) -> Result<AuthResponse, Error> {
        Err(Error::unauthorized("invalid credentials"))
    }

    async fn logout(&self, _token: &str) -> Result<(), Error> {
        Ok(())
    }

    async fn profile(&self, caller: Caller) -> Result<ProfilePayload, Error> {
        Err(Error::not_found(format!("user {} not found", caller.user_id)))
    }

    async fn update_profile(
        &self,
        caller: Caller,
        _request: UpdateProfileRequest,
    ) -> Result<ProfilePayload, Error> {
        Err(Error::not_found(format!("user {} not found", caller.user_id)))
    }

    async fn change_password(
        &self,
        _caller: Caller,
        _request: ChangePasswordRequest,
    ) -> Result<(), Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixture_register_issues_token() {
        let accounts = FixtureAccounts;
        let request = RegisterRequest {
            name: "Ada Lovelace".to_owned(),
            email: "ada@example.com".to_owned(),
            password: "correct horse".to_owned(),
            phone: String::new(),
        };

        let response = accounts.register(request).await.expect("fixture register");

        assert_eq!(response.token, "fixture-token");
        assert_eq!(response.user.role, Role::Customer);
    }

    #[tokio::test]
    async fn fixture_login_is_unauthorized() {
        let accounts = FixtureAccounts;
        let request = LoginRequest {
            email: "ada@example.com".to_owned(),
            password: "wrong".to_owned(),
        };

        let error = accounts.login(request).await.expect_err("unauthorized");

        assert_eq!(error.code(), crate::domain::ErrorCode::Unauthorized);
    }

    #[test]
    fn profile_payload_drops_password_digest() {
        let value = serde_json::to_value(ProfilePayload {
            id: UserId::random(),
            name: "Ada Lovelace".to_owned(),
            email: "ada@example.com".to_owned(),
            phone: String::new(),
            role: Role::Customer,
            active: true,
            created_at: Utc::now(),
        })
        .unwrap_or_default();

        assert!(value.get("passwordDigest").is_none());
        assert_eq!(value["role"], "customer");
    }
}
