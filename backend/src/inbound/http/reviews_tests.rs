//! Tests for review handlers.

use std::sync::Arc;

use actix_web::http::{StatusCode, header::LOCATION};
use actix_web::{App, test as actix_test, web};
use rstest::rstest;

use super::*;
use crate::domain::ports::MockReviewLifecycle;
use crate::domain::{FORBIDDEN_MESSAGE, LISTING_NOT_FOUND_MESSAGE, Review};
use crate::inbound::http::state::HttpStatePorts;
use crate::inbound::http::test_utils::{
    RETURN_TO_PATH, SIGN_IN_PATH, fixture_identity, return_to_fixture, session_cookie,
    sign_in_fixture, state, test_session_middleware, untouched_ports,
};

const LISTING_ID: &str = "8c7a4c3e-2f0b-4d59-9a51-3b0f4c9f1a20";
const REVIEW_ID: &str = "0b6f1f8e-5d2a-4f3c-8e7b-1a2b3c4d5e6f";

fn test_app(
    reviews: MockReviewLifecycle,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let ports = HttpStatePorts {
        reviews: Arc::new(reviews),
        ..untouched_ports()
    };
    App::new()
        .app_data(state(ports))
        .wrap(test_session_middleware())
        .route(SIGN_IN_PATH, web::get().to(sign_in_fixture))
        .route(RETURN_TO_PATH, web::get().to(return_to_fixture))
        .service(create)
        .service(destroy)
}

fn location(res: &actix_web::dev::ServiceResponse) -> &str {
    res.headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .expect("location header")
}

#[actix_web::test]
async fn posting_a_review_returns_to_the_listing() {
    let mut reviews = MockReviewLifecycle::new();
    reviews
        .expect_create()
        .withf(|identity, listing, draft| {
            identity == &fixture_identity()
                && listing.to_string() == LISTING_ID
                && draft.rating().value() == 4
        })
        .times(1)
        .returning(|identity, _, draft| Ok(Review::create(*identity.user_id(), draft)));
    let app = actix_test::init_service(test_app(reviews)).await;
    let cookie = session_cookie(
        &actix_test::call_service(&app, actix_test::TestRequest::get().uri(SIGN_IN_PATH).to_request()).await,
    );

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/campgrounds/{LISTING_ID}/reviews"))
            .cookie(cookie)
            .set_form([("review[rating]", "4"), ("review[body]", "Lovely creek")])
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), format!("/campgrounds/{LISTING_ID}"));
}

#[actix_web::test]
async fn out_of_range_rating_is_a_bad_request() {
    let app = actix_test::init_service(test_app(MockReviewLifecycle::new())).await;
    let cookie = session_cookie(
        &actix_test::call_service(&app, actix_test::TestRequest::get().uri(SIGN_IN_PATH).to_request()).await,
    );

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/campgrounds/{LISTING_ID}/reviews"))
            .cookie(cookie)
            .set_form([("review[rating]", "9"), ("review[body]", "Too good")])
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[rstest]
#[case::post_review(
    actix_test::TestRequest::post()
        .uri(&format!("/campgrounds/{LISTING_ID}/reviews"))
        .set_form([("review[rating]", "4"), ("review[body]", "Lovely creek")])
)]
#[case::delete_review(
    actix_test::TestRequest::delete()
        .uri(&format!("/campgrounds/{LISTING_ID}/reviews/{REVIEW_ID}"))
)]
#[actix_web::test]
async fn anonymous_review_changes_are_sent_to_login(#[case] req: actix_test::TestRequest) {
    let app = actix_test::init_service(test_app(MockReviewLifecycle::new())).await;

    let res = actix_test::call_service(&app, req.to_request()).await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/login");
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(RETURN_TO_PATH)
            .cookie(session_cookie(&res))
            .to_request(),
    )
    .await;
    let expected = format!("/campgrounds/{LISTING_ID}");
    assert_eq!(actix_test::read_body(res).await, expected.as_str());
}

#[actix_web::test]
async fn review_on_a_missing_listing_returns_to_the_index() {
    let mut reviews = MockReviewLifecycle::new();
    reviews
        .expect_create()
        .times(1)
        .returning(|_, _, _| Err(Error::not_found(LISTING_NOT_FOUND_MESSAGE)));
    let app = actix_test::init_service(test_app(reviews)).await;
    let cookie = session_cookie(
        &actix_test::call_service(&app, actix_test::TestRequest::get().uri(SIGN_IN_PATH).to_request()).await,
    );

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/campgrounds/{LISTING_ID}/reviews"))
            .cookie(cookie)
            .set_form([("review[rating]", "3"), ("review[body]", "Where is it")])
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/campgrounds");
}

#[actix_web::test]
async fn deleting_a_review_passes_both_ids() {
    let mut reviews = MockReviewLifecycle::new();
    reviews
        .expect_delete()
        .withf(|_, listing, review| {
            listing.to_string() == LISTING_ID && review.to_string() == REVIEW_ID
        })
        .times(1)
        .returning(|_, _, _| Ok(()));
    let app = actix_test::init_service(test_app(reviews)).await;
    let cookie = session_cookie(
        &actix_test::call_service(&app, actix_test::TestRequest::get().uri(SIGN_IN_PATH).to_request()).await,
    );

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/campgrounds/{LISTING_ID}/reviews/{REVIEW_ID}"))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), format!("/campgrounds/{LISTING_ID}"));
}

#[actix_web::test]
async fn deleting_someone_elses_review_is_refused() {
    let mut reviews = MockReviewLifecycle::new();
    reviews
        .expect_delete()
        .times(1)
        .returning(|_, _, _| Err(Error::forbidden(FORBIDDEN_MESSAGE)));
    let app = actix_test::init_service(test_app(reviews)).await;
    let cookie = session_cookie(
        &actix_test::call_service(&app, actix_test::TestRequest::get().uri(SIGN_IN_PATH).to_request()).await,
    );

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/campgrounds/{LISTING_ID}/reviews/{REVIEW_ID}"))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), format!("/campgrounds/{LISTING_ID}"));
}

#[actix_web::test]
async fn malformed_review_id_is_not_found() {
    let app = actix_test::init_service(test_app(MockReviewLifecycle::new())).await;
    let cookie = session_cookie(
        &actix_test::call_service(&app, actix_test::TestRequest::get().uri(SIGN_IN_PATH).to_request()).await,
    );

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri(&format!("/campgrounds/{LISTING_ID}/reviews/nope"))
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/campgrounds");
}
