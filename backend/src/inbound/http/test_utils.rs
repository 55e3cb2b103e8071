//! Shared helpers for handler tests.

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::header;
use actix_web::{test, web, App, Scope};

use super::state::HttpState;

/// Build a test app exposing the given state under the `/api/v1` scope.
///
/// The closure registers the handlers under test on the scope.
pub fn test_app<F>(
    state: HttpState,
    register: F,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    F: FnOnce(Scope) -> Scope,
{
    App::new()
        .app_data(web::Data::new(state))
        .service(register(web::scope("/api/v1")))
}

/// Finish a test request with a bearer token attached.
pub fn authed(request: test::TestRequest, token: &str) -> actix_http::Request {
    request
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .to_request()
}
