//! `_method` override for HTML forms.
//!
//! Browsers only submit `GET` and `POST`, so edit and delete forms post to
//! `?_method=PUT` or `?_method=DELETE`. This middleware rewrites the request
//! method before routing. Only `POST` requests are rewritten and only to
//! `PUT`, `PATCH` or `DELETE`.

use std::task::{Context, Poll};

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::Method;
use futures_util::future::{Ready, ready};

/// Query parameter naming the intended method.
pub const METHOD_OVERRIDE_PARAM: &str = "_method";

/// Middleware applying `?_method=` overrides.
#[derive(Clone, Copy, Default)]
pub struct MethodOverride;

impl<S, B> Transform<S, ServiceRequest> for MethodOverride
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = MethodOverrideMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(MethodOverrideMiddleware { service }))
    }
}

/// Service wrapper produced by [`MethodOverride`].
pub struct MethodOverrideMiddleware<S> {
    service: S,
}

/// Method requested through the query string, if it is an allowed override.
fn requested_override(query: &str) -> Option<Method> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(name, _)| name == METHOD_OVERRIDE_PARAM)
        .and_then(|(_, value)| match value.to_ascii_uppercase().as_str() {
            "PUT" => Some(Method::PUT),
            "PATCH" => Some(Method::PATCH),
            "DELETE" => Some(Method::DELETE),
            _ => None,
        })
}

impl<S, B> Service<ServiceRequest> for MethodOverrideMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = S::Future;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        if req.method() == Method::POST {
            if let Some(method) = requested_override(req.query_string()) {
                req.head_mut().method = method;
            }
        }
        self.service.call(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, HttpResponse, test as actix_test, web};
    use rstest::rstest;

    #[rstest]
    #[case("_method=PUT", Some(Method::PUT))]
    #[case("_method=delete", Some(Method::DELETE))]
    #[case("a=1&_method=PATCH", Some(Method::PATCH))]
    #[case("_method=GET", None)]
    #[case("", None)]
    fn parses_allowed_overrides(#[case] query: &str, #[case] expected: Option<Method>) {
        assert_eq!(requested_override(query), expected);
    }

    #[actix_web::test]
    async fn post_with_override_reaches_the_delete_route() {
        let app = actix_test::init_service(
            App::new().wrap(MethodOverride).route(
                "/things/1",
                web::delete().to(|| async { HttpResponse::Ok().body("deleted") }),
            ),
        )
        .await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/things/1?_method=DELETE")
                .to_request(),
        )
        .await;

        assert!(res.status().is_success());
        assert_eq!(actix_test::read_body(res).await, "deleted");
    }

    #[actix_web::test]
    async fn get_requests_are_never_rewritten() {
        let app = actix_test::init_service(
            App::new().wrap(MethodOverride).route(
                "/things/1",
                web::delete().to(|| async { HttpResponse::Ok().finish() }),
            ),
        )
        .await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/things/1?_method=DELETE")
                .to_request(),
        )
        .await;

        assert!(res.status().is_client_error());
    }
}
