//! Bearer-credential extraction for HTTP handlers.
//!
//! Handlers never touch the `Authorization` header themselves: the
//! [`CallerContext`] and [`AdminContext`] extractors parse the bearer token,
//! resolve it through the [`crate::domain::ports::AuthGate`] port, and hand
//! the handler a plain [`Caller`].

use actix_web::http::header::{self, HeaderMap};
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;

use crate::domain::user::Caller;
use crate::domain::Error;

use super::state::HttpState;

const BEARER_PREFIX: &str = "Bearer ";

/// Extract the raw bearer token from the `Authorization` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<String, Error> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized("missing bearer token"))?;
    let value = value
        .to_str()
        .map_err(|_| Error::unauthorized("malformed authorization header"))?;
    let token = value
        .strip_prefix(BEARER_PREFIX)
        .ok_or_else(|| Error::unauthorized("authorization scheme must be Bearer"))?;
    if token.is_empty() {
        return Err(Error::unauthorized("missing bearer token"));
    }
    Ok(token.to_owned())
}

fn state_from_request(req: &HttpRequest) -> Result<web::Data<HttpState>, Error> {
    req.app_data::<web::Data<HttpState>>()
        .cloned()
        .ok_or_else(|| Error::internal("HTTP state not configured"))
}

async fn resolve_caller(req: HttpRequest) -> Result<Caller, Error> {
    let state = state_from_request(&req)?;
    let token = bearer_token(req.headers())?;
    state.auth.resolve_caller(&token).await
}

/// The authenticated caller, resolved from the bearer token.
#[derive(Debug, Clone, Copy)]
pub struct CallerContext(pub Caller);

impl FromRequest for CallerContext {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move { resolve_caller(req).await.map(Self) })
    }
}

/// The authenticated caller, additionally required to be an administrator.
#[derive(Debug, Clone, Copy)]
pub struct AdminContext(pub Caller);

impl FromRequest for AdminContext {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let caller = resolve_caller(req).await?;
            if !caller.role.is_admin() {
                return Err(Error::forbidden("administrator access required"));
            }
            Ok(Self(caller))
        })
    }
}

/// The raw bearer token, for endpoints that operate on the credential
/// itself (logout).
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl FromRequest for BearerToken {
    type Error = Error;
    type Future = futures_util::future::Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        futures_util::future::ready(bearer_token(req.headers()).map(Self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::FixtureAuthGate;
    use crate::domain::ErrorCode;
    use actix_web::http::StatusCode;
    use actix_web::{web, App, HttpResponse};
    use rstest::rstest;
    use std::sync::Arc;

    #[rstest]
    fn bearer_token_requires_the_bearer_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_static("Basic dXNlcjpwYXNz"),
        );

        let error = bearer_token(&headers).expect_err("wrong scheme");

        assert_eq!(error.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    fn bearer_token_rejects_empty_tokens() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_static("Bearer "),
        );

        assert!(bearer_token(&headers).is_err());
    }

    #[rstest]
    fn bearer_token_strips_the_prefix() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_static("Bearer sf_abc123"),
        );

        assert_eq!(bearer_token(&headers).expect("token"), "sf_abc123");
    }

    fn app_with_gate(
        gate: FixtureAuthGate,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let state = HttpState::fixtures().with_auth(Arc::new(gate));
        App::new()
            .app_data(web::Data::new(state))
            .route(
                "/me",
                web::get().to(|ctx: CallerContext| async move {
                    HttpResponse::Ok().body(ctx.0.user_id.to_string())
                }),
            )
            .route(
                "/admin",
                web::get().to(|_ctx: AdminContext| async move { HttpResponse::Ok().finish() }),
            )
    }

    #[actix_web::test]
    async fn known_token_resolves_to_the_caller() {
        let (gate, caller) = FixtureAuthGate::customer("tok-1");
        let app = actix_web::test::init_service(app_with_gate(gate)).await;

        let res = actix_web::test::call_service(
            &app,
            actix_web::test::TestRequest::get()
                .uri("/me")
                .insert_header((header::AUTHORIZATION, "Bearer tok-1"))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body = actix_web::test::read_body(res).await;
        assert_eq!(body, caller.user_id.to_string().as_bytes());
    }

    #[actix_web::test]
    async fn missing_token_is_unauthorized() {
        let app = actix_web::test::init_service(app_with_gate(FixtureAuthGate::empty())).await;

        let res =
            actix_web::test::call_service(&app, actix_web::test::TestRequest::get().uri("/me").to_request()).await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn customers_are_forbidden_from_admin_routes() {
        let (gate, _) = FixtureAuthGate::customer("tok-1");
        let app = actix_web::test::init_service(app_with_gate(gate)).await;

        let res = actix_web::test::call_service(
            &app,
            actix_web::test::TestRequest::get()
                .uri("/admin")
                .insert_header((header::AUTHORIZATION, "Bearer tok-1"))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn admins_pass_the_admin_extractor() {
        let (gate, _) = FixtureAuthGate::admin("tok-a");
        let app = actix_web::test::init_service(app_with_gate(gate)).await;

        let res = actix_web::test::call_service(
            &app,
            actix_web::test::TestRequest::get()
                .uri("/admin")
                .insert_header((header::AUTHORIZATION, "Bearer tok-a"))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
    }
}
