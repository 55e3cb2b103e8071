//! Account HTTP handlers: registration, login, logout, profile, and admin
//! account administration.
//!
//! ```text
//! POST   /api/v1/auth/register
//! POST   /api/v1/auth/login
//! POST   /api/v1/auth/logout
//! GET    /api/v1/auth/profile
//! PUT    /api/v1/auth/profile
//! PUT    /api/v1/auth/password
//! GET    /api/v1/admin/users
//! GET    /api/v1/admin/users/{id}
//! PUT    /api/v1/admin/users/{id}
//! DELETE /api/v1/admin/users/{id}
//! ```

use actix_web::{delete, get, post, put, web, HttpResponse};
use uuid::Uuid;

use crate::domain::ports::{
    AuthResponse, ChangePasswordRequest, ListUsersRequest, ListUsersResponse, LoginRequest,
    ProfilePayload, RegisterRequest, UpdateProfileRequest, UpdateUserRequest,
};
use crate::domain::user::UserId;
use crate::domain::Error;
use crate::inbound::http::auth::{AdminContext, BearerToken, CallerContext};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Register a new customer account and issue a bearer token.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Email already registered", body = Error)
    ),
    security([]),
    tags = ["auth"],
    operation_id = "register"
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let response = state.accounts.register(payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(response))
}

/// Authenticate with email and password and issue a bearer token.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = Error)
    ),
    security([]),
    tags = ["auth"],
    operation_id = "login"
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<AuthResponse>> {
    let response = state.accounts.login(payload.into_inner()).await?;
    Ok(web::Json(response))
}

/// Revoke the presented bearer token.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses(
        (status = 204, description = "Token revoked"),
        (status = 401, description = "Missing bearer token", body = Error)
    ),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/auth/logout")]
pub async fn logout(
    state: web::Data<HttpState>,
    token: BearerToken,
) -> ApiResult<HttpResponse> {
    state.accounts.logout(&token.0).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Fetch the authenticated caller's profile.
#[utoipa::path(
    get,
    path = "/api/v1/auth/profile",
    responses(
        (status = 200, description = "The caller's profile", body = ProfilePayload),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["auth"],
    operation_id = "getProfile"
)]
#[get("/auth/profile")]
pub async fn get_profile(
    state: web::Data<HttpState>,
    ctx: CallerContext,
) -> ApiResult<web::Json<ProfilePayload>> {
    let profile = state.accounts.profile(ctx.0).await?;
    Ok(web::Json(profile))
}

/// Apply a partial update to the caller's profile.
#[utoipa::path(
    put,
    path = "/api/v1/auth/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = ProfilePayload),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["auth"],
    operation_id = "updateProfile"
)]
#[put("/auth/profile")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    ctx: CallerContext,
    payload: web::Json<UpdateProfileRequest>,
) -> ApiResult<web::Json<ProfilePayload>> {
    let profile = state
        .accounts
        .update_profile(ctx.0, payload.into_inner())
        .await?;
    Ok(web::Json(profile))
}

/// Replace the caller's password after verifying the current one.
#[utoipa::path(
    put,
    path = "/api/v1/auth/password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised or wrong current password", body = Error)
    ),
    tags = ["auth"],
    operation_id = "changePassword"
)]
#[put("/auth/password")]
pub async fn change_password(
    state: web::Data<HttpState>,
    ctx: CallerContext,
    payload: web::Json<ChangePasswordRequest>,
) -> ApiResult<HttpResponse> {
    state
        .accounts
        .change_password(ctx.0, payload.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Filtered, paginated account listing. Admin only.
#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    params(ListUsersRequest),
    responses(
        (status = 200, description = "Matching accounts", body = ListUsersResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not an administrator", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/admin/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    _admin: AdminContext,
    query: web::Query<ListUsersRequest>,
) -> ApiResult<web::Json<ListUsersResponse>> {
    let response = state.users_admin.list_users(query.into_inner()).await?;
    Ok(web::Json(response))
}

/// Fetch one account. Admin only.
#[utoipa::path(
    get,
    path = "/api/v1/admin/users/{id}",
    params(("id" = Uuid, Path, description = "Account identifier")),
    responses(
        (status = 200, description = "The account", body = ProfilePayload),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not an administrator", body = Error),
        (status = 404, description = "Unknown account", body = Error)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/admin/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    _admin: AdminContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<ProfilePayload>> {
    let profile = state
        .users_admin
        .get_user(UserId::from_uuid(path.into_inner()))
        .await?;
    Ok(web::Json(profile))
}

/// Apply a partial update to an account, including role and active flags.
/// Admin only.
#[utoipa::path(
    put,
    path = "/api/v1/admin/users/{id}",
    params(("id" = Uuid, Path, description = "Account identifier")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated account", body = ProfilePayload),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not an administrator", body = Error),
        (status = 404, description = "Unknown account", body = Error),
        (status = 409, description = "Email already registered", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/admin/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    _admin: AdminContext,
    path: web::Path<Uuid>,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<web::Json<ProfilePayload>> {
    let profile = state
        .users_admin
        .update_user(UserId::from_uuid(path.into_inner()), payload.into_inner())
        .await?;
    Ok(web::Json(profile))
}

/// Deactivate an account. Admin only; self-deactivation is rejected.
#[utoipa::path(
    delete,
    path = "/api/v1/admin/users/{id}",
    params(("id" = Uuid, Path, description = "Account identifier")),
    responses(
        (status = 204, description = "Account deactivated"),
        (status = 400, description = "Cannot deactivate the calling account", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not an administrator", body = Error),
        (status = 404, description = "Unknown account", body = Error)
    ),
    tags = ["users"],
    operation_id = "deactivateUser"
)]
#[delete("/admin/users/{id}")]
pub async fn deactivate_user(
    state: web::Data<HttpState>,
    admin: AdminContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    state
        .users_admin
        .deactivate_user(admin.0, UserId::from_uuid(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{FixtureAuthGate, MockAccounts, MockUserAdmin};
    use crate::domain::user::Role;
    use crate::inbound::http::test_utils::{authed, test_app};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use chrono::Utc;
    use serde_json::json;
    use std::sync::Arc;

    fn profile_for(caller: crate::domain::Caller) -> ProfilePayload {
        ProfilePayload {
            id: caller.user_id,
            name: "Ada Lovelace".to_owned(),
            email: "ada@example.com".to_owned(),
            phone: String::new(),
            role: caller.role,
            active: true,
            created_at: Utc::now(),
        }
    }

    #[actix_web::test]
    async fn register_returns_created_with_token() {
        let state = HttpState::fixtures();
        let app = actix_test::init_service(test_app(state, |scope| scope.service(register))).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/auth/register")
                .set_json(json!({
                    "name": "Ada Lovelace",
                    "email": "ada@example.com",
                    "password": "correct horse",
                }))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::CREATED);
        let body: AuthResponse = actix_test::read_body_json(res).await;
        assert_eq!(body.token, "fixture-token");
        assert_eq!(body.user.role, Role::Customer);
    }

    #[actix_web::test]
    async fn login_rejects_bad_credentials() {
        let state = HttpState::fixtures();
        let app = actix_test::init_service(test_app(state, |scope| scope.service(login))).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/auth/login")
                .set_json(json!({"email": "ada@example.com", "password": "wrong"}))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn logout_revokes_the_presented_token() {
        let mut accounts = MockAccounts::new();
        accounts
            .expect_logout()
            .withf(|token| token == "tok-1")
            .times(1)
            .return_once(|_| Ok(()));
        let mut state = HttpState::fixtures();
        state.accounts = Arc::new(accounts);
        let app = actix_test::init_service(test_app(state, |scope| scope.service(logout))).await;

        let res = actix_test::call_service(
            &app,
            authed(
                actix_test::TestRequest::post().uri("/api/v1/auth/logout"),
                "tok-1",
            ),
        )
        .await;

        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }

    #[actix_web::test]
    async fn profile_requires_a_valid_token() {
        let state = HttpState::fixtures();
        let app =
            actix_test::init_service(test_app(state, |scope| scope.service(get_profile))).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/auth/profile")
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn profile_returns_the_callers_account() {
        let (gate, caller) = FixtureAuthGate::customer("tok-1");
        let expected = profile_for(caller);
        let returned = expected.clone();
        let mut accounts = MockAccounts::new();
        accounts
            .expect_profile()
            .withf(move |c| *c == caller)
            .times(1)
            .return_once(move |_| Ok(returned));
        let mut state = HttpState::fixtures().with_auth(Arc::new(gate));
        state.accounts = Arc::new(accounts);
        let app =
            actix_test::init_service(test_app(state, |scope| scope.service(get_profile))).await;

        let res = actix_test::call_service(
            &app,
            authed(
                actix_test::TestRequest::get().uri("/api/v1/auth/profile"),
                "tok-1",
            ),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: ProfilePayload = actix_test::read_body_json(res).await;
        assert_eq!(body, expected);
    }

    #[actix_web::test]
    async fn update_profile_passes_partial_changes() {
        let (gate, caller) = FixtureAuthGate::customer("tok-1");
        let mut expected = profile_for(caller);
        expected.name = "Ada King".to_owned();
        let returned = expected.clone();
        let mut accounts = MockAccounts::new();
        accounts
            .expect_update_profile()
            .withf(move |c, request| {
                *c == caller
                    && request.name.as_deref() == Some("Ada King")
                    && request.phone.is_none()
            })
            .times(1)
            .return_once(move |_, _| Ok(returned));
        let mut state = HttpState::fixtures().with_auth(Arc::new(gate));
        state.accounts = Arc::new(accounts);
        let app =
            actix_test::init_service(test_app(state, |scope| scope.service(update_profile))).await;

        let res = actix_test::call_service(
            &app,
            authed(
                actix_test::TestRequest::put()
                    .uri("/api/v1/auth/profile")
                    .set_json(json!({"name": "Ada King"})),
                "tok-1",
            ),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: ProfilePayload = actix_test::read_body_json(res).await;
        assert_eq!(body.name, "Ada King");
    }

    #[actix_web::test]
    async fn change_password_verifies_the_current_one() {
        let (gate, caller) = FixtureAuthGate::customer("tok-1");
        let mut accounts = MockAccounts::new();
        accounts
            .expect_change_password()
            .withf(move |c, request| {
                *c == caller
                    && request.current_password == "correct horse"
                    && request.new_password == "battery staple"
            })
            .times(1)
            .return_once(|_, _| Ok(()));
        let mut state = HttpState::fixtures().with_auth(Arc::new(gate));
        state.accounts = Arc::new(accounts);
        let app =
            actix_test::init_service(test_app(state, |scope| scope.service(change_password)))
                .await;

        let res = actix_test::call_service(
            &app,
            authed(
                actix_test::TestRequest::put()
                    .uri("/api/v1/auth/password")
                    .set_json(json!({
                        "currentPassword": "correct horse",
                        "newPassword": "battery staple",
                    })),
                "tok-1",
            ),
        )
        .await;

        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }

    #[actix_web::test]
    async fn account_listing_is_forbidden_for_customers() {
        let (gate, _) = FixtureAuthGate::customer("tok-1");
        let state = HttpState::fixtures().with_auth(Arc::new(gate));
        let app = actix_test::init_service(test_app(state, |scope| scope.service(list_users))).await;

        let res = actix_test::call_service(
            &app,
            authed(
                actix_test::TestRequest::get().uri("/api/v1/admin/users"),
                "tok-1",
            ),
        )
        .await;

        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn account_listing_parses_the_query_filters() {
        let (gate, _) = FixtureAuthGate::admin("tok-a");
        let mut admin = MockUserAdmin::new();
        admin
            .expect_list_users()
            .withf(|request| {
                request.role == Some(Role::Customer)
                    && request.active == Some(true)
                    && request.page == Some(2)
            })
            .times(1)
            .return_once(|request| {
                Ok(ListUsersResponse {
                    users: Vec::new(),
                    total: 60,
                    page: request.page.unwrap_or(1),
                    pages: 2,
                })
            });
        let mut state = HttpState::fixtures().with_auth(Arc::new(gate));
        state.users_admin = Arc::new(admin);
        let app = actix_test::init_service(test_app(state, |scope| scope.service(list_users))).await;

        let res = actix_test::call_service(
            &app,
            authed(
                actix_test::TestRequest::get().uri("/api/v1/admin/users?role=customer&active=true&page=2"),
                "tok-a",
            ),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: ListUsersResponse = actix_test::read_body_json(res).await;
        assert_eq!(body.total, 60);
        assert_eq!(body.page, 2);
    }

    #[actix_web::test]
    async fn admin_update_passes_role_changes() {
        let (gate, _) = FixtureAuthGate::admin("tok-a");
        let target = crate::domain::Caller {
            user_id: crate::domain::UserId::random(),
            role: Role::Admin,
        };
        let expected = profile_for(target);
        let returned = expected.clone();
        let target_id = target.user_id;
        let mut admin = MockUserAdmin::new();
        admin
            .expect_update_user()
            .withf(move |id, request| {
                *id == target_id
                    && request.role == Some(Role::Admin)
                    && request.name.is_none()
            })
            .times(1)
            .return_once(move |_, _| Ok(returned));
        let mut state = HttpState::fixtures().with_auth(Arc::new(gate));
        state.users_admin = Arc::new(admin);
        let app = actix_test::init_service(test_app(state, |scope| scope.service(update_user))).await;

        let res = actix_test::call_service(
            &app,
            authed(
                actix_test::TestRequest::put()
                    .uri(&format!("/api/v1/admin/users/{target_id}"))
                    .set_json(json!({"role": "admin"})),
                "tok-a",
            ),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: ProfilePayload = actix_test::read_body_json(res).await;
        assert_eq!(body, expected);
    }

    #[actix_web::test]
    async fn deactivation_returns_no_content() {
        let (gate, admin_caller) = FixtureAuthGate::admin("tok-a");
        let target_id = crate::domain::UserId::random();
        let mut admin = MockUserAdmin::new();
        admin
            .expect_deactivate_user()
            .withf(move |caller, id| *caller == admin_caller && *id == target_id)
            .times(1)
            .return_once(|_, _| Ok(()));
        let mut state = HttpState::fixtures().with_auth(Arc::new(gate));
        state.users_admin = Arc::new(admin);
        let app =
            actix_test::init_service(test_app(state, |scope| scope.service(deactivate_user)))
                .await;

        let res = actix_test::call_service(
            &app,
            authed(
                actix_test::TestRequest::delete()
                    .uri(&format!("/api/v1/admin/users/{target_id}")),
                "tok-a",
            ),
        )
        .await;

        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }
}
