//! Accounts domain service: registration, login, tokens, and profiles.
//!
//! Issued tokens are opaque: 32 random bytes rendered as hex behind a short
//! prefix. Only the SHA-256 digest of a token is ever stored, so a leaked
//! token table cannot be replayed.

use std::sync::Arc;

use async_trait::async_trait;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::domain::ports::{
    AccountChanges, Accounts, AuthGate, AuthResponse, ChangePasswordRequest, ListUsersRequest,
    ListUsersResponse, LoginRequest, PageRequest, ProfileChanges, ProfilePayload, RegisterRequest,
    TokenRepository, TokenRepositoryError, UpdateProfileRequest, UpdateUserRequest, UserAdmin,
    UserFilter, UserRepository, UserRepositoryError,
};
use crate::domain::user::{Caller, Role, User, UserId};
use crate::domain::Error;

/// Prefix identifying storefront tokens in logs and support tickets.
const TOKEN_PREFIX: &str = "sf_";

/// Shortest accepted password.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Hex SHA-256 digest of a credential.
fn digest_hex(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}

/// Generate fresh token material from the system RNG.
fn generate_token() -> String {
    let mut bytes = [0_u8; 32];
    OsRng.fill_bytes(&mut bytes);
    format!("{TOKEN_PREFIX}{}", hex::encode(bytes))
}

fn map_user_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserRepositoryError::DuplicateEmail => Error::conflict("email is already registered"),
    }
}

fn map_token_error(error: TokenRepositoryError) -> Error {
    match error {
        TokenRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("token repository unavailable: {message}"))
        }
        TokenRepositoryError::Query { message } => {
            Error::internal(format!("token repository error: {message}"))
        }
    }
}

/// Accounts service implementing [`Accounts`].
#[derive(Clone)]
pub struct AccountsService<U, T> {
    users: Arc<U>,
    tokens: Arc<T>,
}

impl<U, T> AccountsService<U, T> {
    /// Create a new service over the given repositories.
    pub fn new(users: Arc<U>, tokens: Arc<T>) -> Self {
        Self { users, tokens }
    }
}

impl<U, T> AccountsService<U, T>
where
    U: UserRepository,
    T: TokenRepository,
{
    fn validate_registration(request: &RegisterRequest) -> Result<(), Error> {
        if request.name.trim().is_empty() {
            return Err(Error::invalid_request("name must not be empty"));
        }
        let email = request.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(Error::invalid_request("email is not valid"));
        }
        if request.password.len() < MIN_PASSWORD_LENGTH {
            return Err(Error::invalid_request(format!(
                "password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }
        Ok(())
    }

    async fn issue_token(&self, user_id: UserId) -> Result<String, Error> {
        let token = generate_token();
        self.tokens
            .insert(&digest_hex(&token), user_id)
            .await
            .map_err(map_token_error)?;
        Ok(token)
    }
}

#[async_trait]
impl<U, T> Accounts for AccountsService<U, T>
where
    U: UserRepository,
    T: TokenRepository,
{
    async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, Error> {
        Self::validate_registration(&request)?;

        let user = User {
            id: UserId::random(),
            name: request.name.trim().to_owned(),
            email: request.email.trim().to_lowercase(),
            phone: request.phone,
            password_digest: digest_hex(&request.password),
            role: Role::Customer,
            active: true,
            created_at: chrono::Utc::now(),
        };
        self.users.insert(&user).await.map_err(map_user_error)?;
        let token = self.issue_token(user.id).await?;

        tracing::info!(user_id = %user.id, "account registered");
        Ok(AuthResponse {
            token,
            user: user.into(),
        })
    }

    async fn login(&self, request: LoginRequest) -> Result<AuthResponse, Error> {
        // One error for every failure mode; callers cannot tell which check failed.
        let rejection = || Error::unauthorized("invalid credentials");

        let user = self
            .users
            .find_by_email(&request.email.trim().to_lowercase())
            .await
            .map_err(map_user_error)?
            .ok_or_else(rejection)?;
        if !user.active || user.password_digest != digest_hex(&request.password) {
            return Err(rejection());
        }
        let token = self.issue_token(user.id).await?;

        tracing::info!(user_id = %user.id, "login succeeded");
        Ok(AuthResponse {
            token,
            user: user.into(),
        })
    }

    async fn logout(&self, token: &str) -> Result<(), Error> {
        // Revoking an already dead token is fine; logout is idempotent.
        self.tokens
            .revoke(&digest_hex(token))
            .await
            .map_err(map_token_error)?;
        Ok(())
    }

    async fn profile(&self, caller: Caller) -> Result<ProfilePayload, Error> {
        self.users
            .find_by_id(caller.user_id)
            .await
            .map_err(map_user_error)?
            .map(ProfilePayload::from)
            .ok_or_else(|| Error::not_found("account not found"))
    }

    async fn update_profile(
        &self,
        caller: Caller,
        request: UpdateProfileRequest,
    ) -> Result<ProfilePayload, Error> {
        if let Some(name) = &request.name {
            if name.trim().is_empty() {
                return Err(Error::invalid_request("name must not be empty"));
            }
        }

        let changes = ProfileChanges {
            name: request.name,
            phone: request.phone,
        };
        self.users
            .update_profile(caller.user_id, changes)
            .await
            .map_err(map_user_error)?
            .map(ProfilePayload::from)
            .ok_or_else(|| Error::not_found("account not found"))
    }

    async fn change_password(
        &self,
        caller: Caller,
        request: ChangePasswordRequest,
    ) -> Result<(), Error> {
        if request.new_password.len() < MIN_PASSWORD_LENGTH {
            return Err(Error::invalid_request(format!(
                "password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        let user = self
            .users
            .find_by_id(caller.user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("account not found"))?;
        if user.password_digest != digest_hex(&request.current_password) {
            return Err(Error::unauthorized("current password is incorrect"));
        }

        let updated = self
            .users
            .set_password_digest(caller.user_id, &digest_hex(&request.new_password))
            .await
            .map_err(map_user_error)?;
        if !updated {
            return Err(Error::not_found("account not found"));
        }

        tracing::info!(user_id = %caller.user_id, "password changed");
        Ok(())
    }
}

#[async_trait]
impl<U, T> UserAdmin for AccountsService<U, T>
where
    U: UserRepository,
    T: Send + Sync,
{
    async fn list_users(&self, request: ListUsersRequest) -> Result<ListUsersResponse, Error> {
        let filter = UserFilter {
            role: request.role,
            active: request.active,
        };
        let page = PageRequest::new(request.page.unwrap_or(1), request.per_page.unwrap_or(50));
        let users = self
            .users
            .list(filter, page)
            .await
            .map_err(map_user_error)?;

        let pages = users.pages();
        Ok(ListUsersResponse {
            total: users.total,
            page: page.page(),
            pages,
            users: users.items.into_iter().map(ProfilePayload::from).collect(),
        })
    }

    async fn get_user(&self, user_id: UserId) -> Result<ProfilePayload, Error> {
        self.users
            .find_by_id(user_id)
            .await
            .map_err(map_user_error)?
            .map(ProfilePayload::from)
            .ok_or_else(|| Error::not_found("account not found"))
    }

    async fn update_user(
        &self,
        user_id: UserId,
        request: UpdateUserRequest,
    ) -> Result<ProfilePayload, Error> {
        if let Some(name) = &request.name {
            if name.trim().is_empty() {
                return Err(Error::invalid_request("name must not be empty"));
            }
        }
        let email = match request.email {
            Some(email) => {
                let email = email.trim().to_lowercase();
                if email.is_empty() || !email.contains('@') {
                    return Err(Error::invalid_request("email is not valid"));
                }
                Some(email)
            }
            None => None,
        };

        let changes = AccountChanges {
            name: request.name,
            email,
            phone: request.phone,
            role: request.role,
            active: request.active,
        };
        self.users
            .update_account(user_id, changes)
            .await
            .map_err(map_user_error)?
            .map(ProfilePayload::from)
            .ok_or_else(|| Error::not_found("account not found"))
    }

    async fn deactivate_user(&self, caller: Caller, user_id: UserId) -> Result<(), Error> {
        if caller.user_id == user_id {
            return Err(Error::invalid_request(
                "administrators cannot deactivate their own account",
            ));
        }

        let changes = AccountChanges {
            active: Some(false),
            ..AccountChanges::default()
        };
        self.users
            .update_account(user_id, changes)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::not_found("account not found"))?;

        tracing::info!(user_id = %user_id, "account deactivated");
        Ok(())
    }
}

/// Auth gate backed by the token repository.
#[derive(Clone)]
pub struct TokenAuthGate<T> {
    tokens: Arc<T>,
}

impl<T> TokenAuthGate<T> {
    /// Create a gate over the given token repository.
    pub fn new(tokens: Arc<T>) -> Self {
        Self { tokens }
    }
}

#[async_trait]
impl<T> AuthGate for TokenAuthGate<T>
where
    T: TokenRepository,
{
    async fn resolve_caller(&self, token: &str) -> Result<Caller, Error> {
        self.tokens
            .resolve(&digest_hex(token))
            .await
            .map_err(map_token_error)?
            .ok_or_else(|| Error::unauthorized("invalid or expired token"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockTokenRepository, MockUserRepository};
    use crate::domain::ErrorCode;
    use chrono::Utc;

    fn make_service(
        users: MockUserRepository,
        tokens: MockTokenRepository,
    ) -> AccountsService<MockUserRepository, MockTokenRepository> {
        AccountsService::new(Arc::new(users), Arc::new(tokens))
    }

    fn sample_user(password: &str) -> User {
        User {
            id: UserId::random(),
            name: "Ada Lovelace".to_owned(),
            email: "ada@example.com".to_owned(),
            phone: String::new(),
            password_digest: digest_hex(password),
            role: Role::Customer,
            active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn tokens_are_prefixed_and_unique() {
        let first = generate_token();
        let second = generate_token();
        assert!(first.starts_with(TOKEN_PREFIX));
        assert_eq!(first.len(), TOKEN_PREFIX.len() + 64);
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn registration_rejects_short_passwords() {
        let mut users = MockUserRepository::new();
        users.expect_insert().times(0);

        let service = make_service(users, MockTokenRepository::new());
        let request = RegisterRequest {
            name: "Ada Lovelace".to_owned(),
            email: "ada@example.com".to_owned(),
            password: "short".to_owned(),
            phone: String::new(),
        };

        let error = service.register(request).await.expect_err("weak password");

        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn registration_stores_a_digest_and_issues_a_token() {
        let mut users = MockUserRepository::new();
        users
            .expect_insert()
            .withf(|user: &User| {
                user.role == Role::Customer
                    && user.email == "ada@example.com"
                    && user.password_digest != "correct horse"
            })
            .times(1)
            .return_once(|_| Ok(()));
        let mut tokens = MockTokenRepository::new();
        tokens
            .expect_insert()
            .withf(|digest, _| digest.len() == 64)
            .times(1)
            .return_once(|_, _| Ok(()));

        let service = make_service(users, tokens);
        let request = RegisterRequest {
            name: "Ada Lovelace".to_owned(),
            email: "Ada@Example.com".to_owned(),
            password: "correct horse".to_owned(),
            phone: String::new(),
        };

        let response = service.register(request).await.expect("registration");

        assert!(response.token.starts_with(TOKEN_PREFIX));
        assert_eq!(response.user.email, "ada@example.com");
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let mut users = MockUserRepository::new();
        users
            .expect_insert()
            .times(1)
            .return_once(|_| Err(UserRepositoryError::DuplicateEmail));

        let service = make_service(users, MockTokenRepository::new());
        let request = RegisterRequest {
            name: "Ada Lovelace".to_owned(),
            email: "ada@example.com".to_owned(),
            password: "correct horse".to_owned(),
            phone: String::new(),
        };

        let error = service.register(request).await.expect_err("duplicate");

        assert_eq!(error.code(), ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_identical() {
        let user = sample_user("correct horse");
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .times(1)
            .return_once(move |_| Ok(Some(user)));
        let service = make_service(users, MockTokenRepository::new());

        let wrong_password = service
            .login(LoginRequest {
                email: "ada@example.com".to_owned(),
                password: "wrong".to_owned(),
            })
            .await
            .expect_err("wrong password");

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .times(1)
            .return_once(|_| Ok(None));
        let service = make_service(users, MockTokenRepository::new());

        let unknown_email = service
            .login(LoginRequest {
                email: "nobody@example.com".to_owned(),
                password: "correct horse".to_owned(),
            })
            .await
            .expect_err("unknown email");

        assert_eq!(wrong_password.code(), ErrorCode::Unauthorized);
        assert_eq!(wrong_password.message(), unknown_email.message());
    }

    #[tokio::test]
    async fn inactive_accounts_cannot_log_in() {
        let user = User {
            active: false,
            ..sample_user("correct horse")
        };
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .times(1)
            .return_once(move |_| Ok(Some(user)));

        let service = make_service(users, MockTokenRepository::new());
        let error = service
            .login(LoginRequest {
                email: "ada@example.com".to_owned(),
                password: "correct horse".to_owned(),
            })
            .await
            .expect_err("inactive");

        assert_eq!(error.code(), ErrorCode::Unauthorized);
    }

    #[tokio::test]
    async fn login_issues_a_fresh_token() {
        let user = sample_user("correct horse");
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .times(1)
            .return_once(move |_| Ok(Some(user)));
        let mut tokens = MockTokenRepository::new();
        tokens
            .expect_insert()
            .times(1)
            .return_once(|_, _| Ok(()));

        let service = make_service(users, tokens);
        let response = service
            .login(LoginRequest {
                email: "ada@example.com".to_owned(),
                password: "correct horse".to_owned(),
            })
            .await
            .expect("login succeeds");

        assert!(response.token.starts_with(TOKEN_PREFIX));
    }

    #[tokio::test]
    async fn logout_revokes_the_digest_not_the_token() {
        let token = generate_token();
        let expected = digest_hex(&token);
        let mut tokens = MockTokenRepository::new();
        tokens
            .expect_revoke()
            .withf(move |digest| digest == expected)
            .times(1)
            .return_once(|_| Ok(true));

        let service = make_service(MockUserRepository::new(), tokens);
        service.logout(&token).await.expect("logout succeeds");
    }

    #[tokio::test]
    async fn change_password_rejects_the_wrong_current_password() {
        let user = sample_user("correct horse");
        let caller = Caller {
            user_id: user.id,
            role: Role::Customer,
        };
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .times(1)
            .return_once(move |_| Ok(Some(user)));
        users.expect_set_password_digest().times(0);

        let service = make_service(users, MockTokenRepository::new());
        let error = service
            .change_password(
                caller,
                ChangePasswordRequest {
                    current_password: "wrong".to_owned(),
                    new_password: "battery staple".to_owned(),
                },
            )
            .await
            .expect_err("wrong current password");

        assert_eq!(error.code(), ErrorCode::Unauthorized);
    }

    #[tokio::test]
    async fn change_password_rejects_short_replacements() {
        let caller = Caller {
            user_id: UserId::random(),
            role: Role::Customer,
        };
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().times(0);

        let service = make_service(users, MockTokenRepository::new());
        let error = service
            .change_password(
                caller,
                ChangePasswordRequest {
                    current_password: "correct horse".to_owned(),
                    new_password: "short".to_owned(),
                },
            )
            .await
            .expect_err("short replacement");

        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn change_password_stores_the_new_digest() {
        let user = sample_user("correct horse");
        let caller = Caller {
            user_id: user.id,
            role: Role::Customer,
        };
        let expected = digest_hex("battery staple");
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .times(1)
            .return_once(move |_| Ok(Some(user)));
        users
            .expect_set_password_digest()
            .withf(move |_, digest| digest == expected)
            .times(1)
            .return_once(|_, _| Ok(true));

        let service = make_service(users, MockTokenRepository::new());
        service
            .change_password(
                caller,
                ChangePasswordRequest {
                    current_password: "correct horse".to_owned(),
                    new_password: "battery staple".to_owned(),
                },
            )
            .await
            .expect("password change succeeds");
    }

    #[tokio::test]
    async fn listing_maps_accounts_onto_profiles() {
        let user = sample_user("correct horse");
        let mut users = MockUserRepository::new();
        users
            .expect_list()
            .withf(|filter, page| {
                filter.role == Some(Role::Customer) && page.page() == 2 && page.per_page() == 10
            })
            .times(1)
            .return_once(move |_, page| {
                Ok(crate::domain::ports::Page {
                    items: vec![user],
                    total: 11,
                    request: page,
                })
            });

        let service = make_service(users, MockTokenRepository::new());
        let response = service
            .list_users(ListUsersRequest {
                role: Some(Role::Customer),
                active: None,
                page: Some(2),
                per_page: Some(10),
            })
            .await
            .expect("listing succeeds");

        assert_eq!(response.total, 11);
        assert_eq!(response.page, 2);
        assert_eq!(response.pages, 2);
        assert_eq!(response.users.len(), 1);
        assert_eq!(response.users[0].email, "ada@example.com");
    }

    #[tokio::test]
    async fn admin_update_rejects_invalid_emails() {
        let mut users = MockUserRepository::new();
        users.expect_update_account().times(0);

        let service = make_service(users, MockTokenRepository::new());
        let error = service
            .update_user(
                UserId::random(),
                UpdateUserRequest {
                    email: Some("not-an-email".to_owned()),
                    ..UpdateUserRequest::default()
                },
            )
            .await
            .expect_err("invalid email");

        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn admin_update_surfaces_email_collisions_as_conflicts() {
        let mut users = MockUserRepository::new();
        users
            .expect_update_account()
            .times(1)
            .return_once(|_, _| Err(UserRepositoryError::DuplicateEmail));

        let service = make_service(users, MockTokenRepository::new());
        let error = service
            .update_user(
                UserId::random(),
                UpdateUserRequest {
                    email: Some("taken@example.com".to_owned()),
                    ..UpdateUserRequest::default()
                },
            )
            .await
            .expect_err("collision");

        assert_eq!(error.code(), ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn admins_cannot_deactivate_themselves() {
        let caller = Caller {
            user_id: UserId::random(),
            role: Role::Admin,
        };
        let mut users = MockUserRepository::new();
        users.expect_update_account().times(0);

        let service = make_service(users, MockTokenRepository::new());
        let error = service
            .deactivate_user(caller, caller.user_id)
            .await
            .expect_err("self deactivation");

        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn deactivation_clears_only_the_active_flag() {
        let caller = Caller {
            user_id: UserId::random(),
            role: Role::Admin,
        };
        let target = sample_user("correct horse");
        let target_id = target.id;
        let mut users = MockUserRepository::new();
        users
            .expect_update_account()
            .withf(move |id, changes| {
                *id == target_id
                    && changes.active == Some(false)
                    && changes.name.is_none()
                    && changes.role.is_none()
            })
            .times(1)
            .return_once(move |_, _| Ok(Some(target)));

        let service = make_service(users, MockTokenRepository::new());
        service
            .deactivate_user(caller, target_id)
            .await
            .expect("deactivation succeeds");
    }

    #[tokio::test]
    async fn gate_rejects_unknown_tokens() {
        let mut tokens = MockTokenRepository::new();
        tokens.expect_resolve().times(1).return_once(|_| Ok(None));

        let gate = TokenAuthGate::new(Arc::new(tokens));
        let error = gate
            .resolve_caller("sf_deadbeef")
            .await
            .expect_err("unknown token");

        assert_eq!(error.code(), ErrorCode::Unauthorized);
    }

    #[tokio::test]
    async fn gate_resolves_known_tokens() {
        let caller = Caller {
            user_id: UserId::random(),
            role: Role::Admin,
        };
        let token = generate_token();
        let expected = digest_hex(&token);
        let mut tokens = MockTokenRepository::new();
        tokens
            .expect_resolve()
            .withf(move |digest| digest == expected)
            .times(1)
            .return_once(move |_| Ok(Some(caller)));

        let gate = TokenAuthGate::new(Arc::new(tokens));
        let resolved = gate.resolve_caller(&token).await.expect("known token");

        assert_eq!(resolved, caller);
    }
}
