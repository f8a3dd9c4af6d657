//! End-to-end listing and review flows through the assembled application.

mod support;

use actix_web::cookie::time::Duration;
use actix_web::http::StatusCode;
use actix_web::http::header::CONTENT_SECURITY_POLICY;
use actix_web::test::{self as actix_test, TestRequest};
use campgrounds::domain::ListingId;
use campgrounds::domain::ports::{ListingRepository, ReviewRepository};
use campgrounds::inbound::http::session::SIGN_IN_REQUIRED_MESSAGE;
use campgrounds::server::{SESSION_COOKIE_NAME, SESSION_TTL_DAYS, build_app};
use rstest::rstest;

use support::{
    Browser, Harness, UNKNOWN_PLACE, body_text, listing_fields, location, multipart,
};

fn registration(username: &str) -> [(String, String); 3] {
    [
        ("email".to_owned(), format!("{username}@example.com")),
        ("username".to_owned(), username.to_owned()),
        ("password".to_owned(), "correct horse".to_owned()),
    ]
}

fn listing_id_from(path: &str) -> ListingId {
    let raw = path
        .strip_prefix("/campgrounds/")
        .expect("listing path");
    ListingId::new(raw).expect("listing id")
}

#[actix_web::test]
async fn register_create_and_read_a_listing() {
    let harness = Harness::new();
    let app = actix_test::init_service(build_app(harness.deps.clone())).await;
    let mut browser = Browser::default();

    let res = actix_test::call_service(
        &app,
        browser
            .prepare(TestRequest::post().uri("/register"))
            .set_form(registration("ada"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/campgrounds");
    browser.remember(&res);

    let res = actix_test::call_service(
        &app,
        multipart(
            browser.prepare(TestRequest::post().uri("/campgrounds")),
            &listing_fields("Tall Pines", "Yosemite Valley", "12.5"),
            &["tent.png"],
        )
        .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FOUND);
    browser.remember(&res);
    let listing_path = location(&res);

    let res = actix_test::call_service(
        &app,
        browser
            .prepare(TestRequest::get().uri(&listing_path))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_text(res).await;
    assert!(body.contains("Tall Pines"));
    assert!(body.contains("Submitted by ada"));
    assert!(body.contains("Successfully made a new campground!"));
    assert!(body.contains("res.cloudinary.com"));

    let stored = ListingRepository::find(harness.store.as_ref(), &listing_id_from(&listing_path))
        .await
        .expect("store reachable")
        .expect("listing stored");
    assert_eq!(stored.images().len(), 1);
}

#[actix_web::test]
async fn session_for_an_account_this_store_lacks_is_signed_out() {
    let origin = Harness::new();
    let mut elsewhere = Harness::new();
    elsewhere.deps.key = origin.deps.key.clone();
    let origin_app = actix_test::init_service(build_app(origin.deps.clone())).await;
    let app = actix_test::init_service(build_app(elsewhere.deps.clone())).await;
    let mut browser = Browser::default();

    let res = actix_test::call_service(
        &origin_app,
        browser
            .prepare(TestRequest::post().uri("/register"))
            .set_form(registration("ada"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FOUND);
    browser.remember(&res);

    let res = actix_test::call_service(
        &app,
        multipart(
            browser.prepare(TestRequest::post().uri("/campgrounds")),
            &listing_fields("Tall Pines", "Yosemite Valley", "12.5"),
            &[],
        )
        .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/login");
    browser.remember(&res);

    let stored = ListingRepository::list(elsewhere.store.as_ref())
        .await
        .expect("store reachable");
    assert!(stored.is_empty());

    let res = actix_test::call_service(
        &app,
        browser.prepare(TestRequest::get().uri("/login")).to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_text(res).await;
    assert!(body.contains(SIGN_IN_REQUIRED_MESSAGE));
    assert!(!body.contains(">ada<"));
}

#[actix_web::test]
async fn only_the_author_may_delete_and_reviews_go_with_the_listing() {
    let harness = Harness::new();
    let app = actix_test::init_service(build_app(harness.deps.clone())).await;
    let mut author = Browser::default();
    let mut stranger = Browser::default();

    for (browser, username) in [(&mut author, "ada"), (&mut stranger, "grace")] {
        let res = actix_test::call_service(
            &app,
            TestRequest::post()
                .uri("/register")
                .set_form(registration(username))
                .to_request(),
        )
        .await;
        browser.remember(&res);
    }

    let res = actix_test::call_service(
        &app,
        author
            .prepare(TestRequest::post().uri("/campgrounds"))
            .set_form(listing_fields("Tall Pines", "Yosemite Valley", "20"))
            .to_request(),
    )
    .await;
    author.remember(&res);
    let listing_path = location(&res);
    let id = listing_id_from(&listing_path);

    let res = actix_test::call_service(
        &app,
        stranger
            .prepare(TestRequest::post().uri(&format!("{listing_path}/reviews")))
            .set_form([("review[rating]", "5"), ("review[body]", "Lovely creek")])
            .to_request(),
    )
    .await;
    assert_eq!(location(&res), listing_path);
    stranger.remember(&res);

    let res = actix_test::call_service(
        &app,
        stranger
            .prepare(TestRequest::post().uri(&format!("{listing_path}?_method=DELETE")))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), listing_path);
    stranger.remember(&res);

    let stored = ListingRepository::find(harness.store.as_ref(), &id)
        .await
        .expect("store reachable")
        .expect("listing survives a stranger");
    let review_id = *stored.reviews().first().expect("review attached");

    let res = actix_test::call_service(
        &app,
        stranger
            .prepare(TestRequest::get().uri(&listing_path))
            .to_request(),
    )
    .await;
    let body = body_text(res).await;
    assert!(body.contains("You do not have permission to do that"));

    let res = actix_test::call_service(
        &app,
        author
            .prepare(TestRequest::post().uri(&format!("{listing_path}?_method=DELETE")))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/campgrounds");

    assert!(
        ListingRepository::find(harness.store.as_ref(), &id)
            .await
            .expect("store reachable")
            .is_none()
    );
    assert!(
        ReviewRepository::find(harness.store.as_ref(), &id, &review_id)
            .await
            .expect("store reachable")
            .is_none()
    );
}

#[rstest]
#[case::negative_price("Tall Pines", "Yosemite Valley", "-5", StatusCode::BAD_REQUEST)]
#[case::unknown_place("Sunken Camp", UNKNOWN_PLACE, "15", StatusCode::BAD_GATEWAY)]
#[actix_rt::test]
async fn rejected_listings_write_nothing(
    #[case] title: &str,
    #[case] place: &str,
    #[case] price: &str,
    #[case] expected: StatusCode,
) {
    let harness = Harness::new();
    let app = actix_test::init_service(build_app(harness.deps.clone())).await;
    let mut browser = Browser::default();
    let res = actix_test::call_service(
        &app,
        TestRequest::post()
            .uri("/register")
            .set_form(registration("ada"))
            .to_request(),
    )
    .await;
    browser.remember(&res);

    let res = actix_test::call_service(
        &app,
        multipart(
            browser.prepare(TestRequest::post().uri("/campgrounds")),
            &listing_fields(title, place, price),
            &["tent.png"],
        )
        .to_request(),
    )
    .await;

    assert_eq!(res.status(), expected);
    assert!(harness.store.list().await.expect("store reachable").is_empty());
}

#[actix_web::test]
async fn update_appends_uploads_and_destroys_marked_images() {
    let harness = Harness::new();
    let app = actix_test::init_service(build_app(harness.deps.clone())).await;
    let mut browser = Browser::default();
    let res = actix_test::call_service(
        &app,
        TestRequest::post()
            .uri("/register")
            .set_form(registration("ada"))
            .to_request(),
    )
    .await;
    browser.remember(&res);

    let res = actix_test::call_service(
        &app,
        multipart(
            browser.prepare(TestRequest::post().uri("/campgrounds")),
            &listing_fields("Tall Pines", "Yosemite Valley", "12"),
            &["first.png"],
        )
        .to_request(),
    )
    .await;
    browser.remember(&res);
    let listing_path = location(&res);
    let id = listing_id_from(&listing_path);
    let original = ListingRepository::find(harness.store.as_ref(), &id)
        .await
        .expect("store reachable")
        .expect("listing stored");
    let first = original
        .images()
        .first()
        .expect("first image")
        .filename
        .clone();

    let mut fields = listing_fields("Taller Pines", "Yosemite Valley", "14");
    fields.push(("deleteImages[]".to_owned(), first.clone()));
    let res = actix_test::call_service(
        &app,
        multipart(
            browser.prepare(TestRequest::post().uri(&format!("{listing_path}?_method=PUT"))),
            &fields,
            &["second.png"],
        )
        .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), listing_path);

    let updated = ListingRepository::find(harness.store.as_ref(), &id)
        .await
        .expect("store reachable")
        .expect("listing stored");
    assert_eq!(updated.title(), "Taller Pines");
    assert_eq!(updated.images().len(), 1);
    assert!(!updated.has_image(&first));
    assert_eq!(harness.images.destroyed(), vec![first]);
}

#[actix_web::test]
async fn anonymous_visitors_log_in_and_return_to_the_form() {
    let harness = Harness::new();
    let app = actix_test::init_service(build_app(harness.deps.clone())).await;
    let mut browser = Browser::default();
    let res = actix_test::call_service(
        &app,
        TestRequest::post()
            .uri("/register")
            .set_form(registration("ada"))
            .to_request(),
    )
    .await;
    browser.remember(&res);
    let res = actix_test::call_service(
        &app,
        browser.prepare(TestRequest::get().uri("/logout")).to_request(),
    )
    .await;
    browser.remember(&res);

    let res = actix_test::call_service(
        &app,
        browser
            .prepare(TestRequest::get().uri("/campgrounds/new"))
            .to_request(),
    )
    .await;
    assert_eq!(location(&res), "/login");
    browser.remember(&res);

    let res = actix_test::call_service(
        &app,
        browser
            .prepare(TestRequest::post().uri("/login"))
            .set_form([("username", "ada"), ("password", "correct horse")])
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/campgrounds/new");
}

#[actix_web::test]
async fn unknown_routes_render_the_not_found_page() {
    let harness = Harness::new();
    let app = actix_test::init_service(build_app(harness.deps.clone())).await;

    let res = actix_test::call_service(
        &app,
        TestRequest::get().uri("/no/such/page").to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert!(res.headers().contains_key(CONTENT_SECURITY_POLICY));
    let body = body_text(res).await;
    assert!(body.contains("Page not found"));
}

#[actix_web::test]
async fn session_cookie_is_http_only_and_lasts_a_week() {
    let harness = Harness::new();
    let app = actix_test::init_service(build_app(harness.deps.clone())).await;

    let res = actix_test::call_service(
        &app,
        TestRequest::post()
            .uri("/register")
            .set_form(registration("ada"))
            .to_request(),
    )
    .await;

    let cookie = res
        .response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
        .expect("session cookie");
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.max_age(), Some(Duration::days(SESSION_TTL_DAYS)));
}
