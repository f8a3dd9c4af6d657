//! Tests for the listing lifecycle service.

use std::sync::Arc;

use super::*;
use crate::domain::ports::{
    GeocoderError, ImageHostError, ListingPersistenceError, MockGeocoder, MockImageHost,
    MockListingRepository,
};
use crate::domain::{
    ErrorCode, GeoPoint, ListingDraft, Price, ReviewId, UserId, Username,
};
use rstest::rstest;

type Service = ListingService<MockListingRepository, MockGeocoder, MockImageHost>;

fn make_service(
    listings: MockListingRepository,
    geocoder: MockGeocoder,
    images: MockImageHost,
) -> Service {
    ListingService::new(Arc::new(listings), Arc::new(geocoder), Arc::new(images))
}

fn identity(user_id: UserId) -> Identity {
    Identity::new(user_id, Username::new("a").expect("username"))
}

fn draft(title: &str, price: f64) -> ListingDraft {
    ListingDraft::new(
        title,
        "Nowhere",
        Price::new(price).expect("price"),
        "Quiet pitch",
    )
    .expect("draft")
}

fn form(title: &str, delete_images: &[&str]) -> ListingForm {
    ListingForm {
        draft: draft(title, 10.0),
        delete_images: delete_images.iter().map(|name| (*name).to_owned()).collect(),
    }
}

fn image(name: &str) -> Image {
    Image {
        url: format!("https://res.cloudinary.com/demo/image/upload/YelpCamp/{name}.png"),
        filename: format!("YelpCamp/{name}"),
    }
}

fn upload(file_name: &str) -> ImageUpload {
    ImageUpload {
        file_name: file_name.to_owned(),
        content_type: Some("image/png".to_owned()),
        bytes: vec![1, 2, 3],
    }
}

fn point() -> GeoPoint {
    GeoPoint::new(-3.19, 55.95).expect("point")
}

fn stored_listing(author: UserId, images: Vec<Image>) -> Listing {
    Listing::create(author, draft("Spot", 10.0), point(), images)
}

#[rstest]
#[tokio::test]
async fn create_geocodes_uploads_and_persists_with_author() {
    let author = UserId::random();
    let mut geocoder = MockGeocoder::new();
    geocoder
        .expect_forward()
        .withf(|query: &str| query == "Nowhere")
        .times(1)
        .return_once(|_| Ok(Some(point())));
    let mut images = MockImageHost::new();
    images
        .expect_upload()
        .times(1)
        .return_once(|_| Ok(image("a")));
    let mut listings = MockListingRepository::new();
    listings
        .expect_insert()
        .withf(move |listing: &Listing| listing.author() == &author)
        .times(1)
        .return_once(|_| Ok(()));

    let service = make_service(listings, geocoder, images);
    let listing = service
        .create(&identity(author), form("Spot", &[]), vec![upload("tent.png")])
        .await
        .expect("create succeeds");

    assert_eq!(listing.author(), &author);
    assert_eq!(listing.geometry(), &point());
    assert_eq!(listing.images(), [image("a")]);
    assert!(listing.reviews().is_empty());
}

#[rstest]
#[tokio::test]
async fn create_with_unresolvable_location_persists_nothing() {
    let mut geocoder = MockGeocoder::new();
    geocoder.expect_forward().times(1).return_once(|_| Ok(None));
    let mut images = MockImageHost::new();
    images.expect_upload().times(0);
    let mut listings = MockListingRepository::new();
    listings.expect_insert().times(0);

    let service = make_service(listings, geocoder, images);
    let err = service
        .create(
            &identity(UserId::random()),
            form("Spot", &[]),
            vec![upload("tent.png")],
        )
        .await
        .expect_err("no geocode match");

    assert_eq!(err.code(), ErrorCode::UpstreamFailure);
}

#[rstest]
#[tokio::test]
async fn create_surfaces_geocoder_failure_as_upstream() {
    let mut geocoder = MockGeocoder::new();
    geocoder
        .expect_forward()
        .return_once(|_| Err(GeocoderError::transport("timed out")));
    let mut listings = MockListingRepository::new();
    listings.expect_insert().times(0);

    let service = make_service(listings, geocoder, MockImageHost::new());
    let err = service
        .create(&identity(UserId::random()), form("Spot", &[]), Vec::new())
        .await
        .expect_err("geocoder down");

    assert_eq!(err.code(), ErrorCode::UpstreamFailure);
}

#[rstest]
#[tokio::test]
async fn create_rejects_disallowed_format_before_any_call() {
    let mut geocoder = MockGeocoder::new();
    geocoder.expect_forward().times(0);
    let mut listings = MockListingRepository::new();
    listings.expect_insert().times(0);

    let service = make_service(listings, geocoder, MockImageHost::new());
    let bad = ImageUpload {
        file_name: "tent.gif".to_owned(),
        content_type: Some("image/gif".to_owned()),
        bytes: Vec::new(),
    };
    let err = service
        .create(&identity(UserId::random()), form("Spot", &[]), vec![bad])
        .await
        .expect_err("gif rejected");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn create_discards_uploads_when_insert_fails() {
    let mut geocoder = MockGeocoder::new();
    geocoder.expect_forward().return_once(|_| Ok(Some(point())));
    let mut images = MockImageHost::new();
    images.expect_upload().return_once(|_| Ok(image("a")));
    images
        .expect_destroy()
        .withf(|filename: &str| filename == "YelpCamp/a")
        .times(1)
        .return_once(|_| Ok(()));
    let mut listings = MockListingRepository::new();
    listings
        .expect_insert()
        .return_once(|_| Err(ListingPersistenceError::connection("down")));

    let service = make_service(listings, geocoder, images);
    let err = service
        .create(
            &identity(UserId::random()),
            form("Spot", &[]),
            vec![upload("tent.png")],
        )
        .await
        .expect_err("insert fails");

    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
#[tokio::test]
async fn update_appends_new_images_and_destroys_exactly_the_marked_one() {
    let author = UserId::random();
    let existing = stored_listing(author, vec![image("a"), image("b")]);
    let id = *existing.id();
    let mut listings = MockListingRepository::new();
    listings
        .expect_find()
        .return_once(move |_| Ok(Some(existing)));
    listings
        .expect_update()
        .withf(move |listing: &Listing| {
            listing.images() == [image("b"), image("c")]
                && listing.title() == "Renamed"
                && listing.author() == &author
        })
        .times(1)
        .return_once(|_| Ok(true));
    let mut images = MockImageHost::new();
    images.expect_upload().times(1).return_once(|_| Ok(image("c")));
    images
        .expect_destroy()
        .withf(|filename: &str| filename == "YelpCamp/a")
        .times(1)
        .return_once(|_| Ok(()));

    let service = make_service(listings, MockGeocoder::new(), images);
    let updated = service
        .update(
            &identity(author),
            &id,
            form("Renamed", &["YelpCamp/a"]),
            vec![upload("tent.png")],
        )
        .await
        .expect("update succeeds");

    assert_eq!(updated.images(), [image("b"), image("c")]);
    assert_eq!(updated.geometry(), &point());
}

#[rstest]
#[tokio::test]
async fn update_ignores_filenames_not_on_the_listing() {
    let author = UserId::random();
    let existing = stored_listing(author, vec![image("a")]);
    let id = *existing.id();
    let mut listings = MockListingRepository::new();
    listings
        .expect_find()
        .return_once(move |_| Ok(Some(existing)));
    listings.expect_update().times(1).return_once(|_| Ok(true));
    let mut images = MockImageHost::new();
    images.expect_destroy().times(0);

    let service = make_service(listings, MockGeocoder::new(), images);
    let updated = service
        .update(&identity(author), &id, form("Spot", &["YelpCamp/zzz"]), Vec::new())
        .await
        .expect("update succeeds");

    assert_eq!(updated.images(), [image("a")]);
}

#[rstest]
#[tokio::test]
async fn update_keeps_images_whose_remote_deletion_failed() {
    let author = UserId::random();
    let existing = stored_listing(author, vec![image("a"), image("b")]);
    let id = *existing.id();
    let mut listings = MockListingRepository::new();
    listings
        .expect_find()
        .return_once(move |_| Ok(Some(existing)));
    listings
        .expect_update()
        .withf(|listing: &Listing| listing.images() == [image("a")])
        .times(1)
        .return_once(|_| Ok(true));
    let mut images = MockImageHost::new();
    images
        .expect_destroy()
        .withf(|filename: &str| filename == "YelpCamp/a")
        .return_once(|_| Err(ImageHostError::status(500_u16, "boom")));
    images
        .expect_destroy()
        .withf(|filename: &str| filename == "YelpCamp/b")
        .return_once(|_| Ok(()));

    let service = make_service(listings, MockGeocoder::new(), images);
    let err = service
        .update(
            &identity(author),
            &id,
            form("Spot", &["YelpCamp/a", "YelpCamp/b"]),
            Vec::new(),
        )
        .await
        .expect_err("one deletion failed");

    assert_eq!(err.code(), ErrorCode::UpstreamFailure);
}

#[rstest]
#[tokio::test]
async fn update_by_another_identity_is_forbidden_before_uploading() {
    let existing = stored_listing(UserId::random(), Vec::new());
    let id = *existing.id();
    let mut listings = MockListingRepository::new();
    listings
        .expect_find()
        .return_once(move |_| Ok(Some(existing)));
    listings.expect_update().times(0);
    let mut images = MockImageHost::new();
    images.expect_upload().times(0);

    let service = make_service(listings, MockGeocoder::new(), images);
    let err = service
        .update(
            &identity(UserId::random()),
            &id,
            form("Hijacked", &[]),
            vec![upload("tent.png")],
        )
        .await
        .expect_err("stranger");

    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(3)]
#[tokio::test]
async fn delete_hands_every_review_to_the_cascade(#[case] review_count: usize) {
    let author = UserId::random();
    let mut existing = stored_listing(author, Vec::new());
    let reviews: Vec<ReviewId> = (0..review_count).map(|_| ReviewId::random()).collect();
    for review in &reviews {
        existing.attach_review(*review);
    }
    let id = *existing.id();
    let mut listings = MockListingRepository::new();
    listings
        .expect_find()
        .return_once(move |_| Ok(Some(existing)));
    listings
        .expect_delete_cascade()
        .withf(move |plan: &CascadePlan| plan.listing() == &id && plan.reviews() == reviews)
        .times(1)
        .return_once(|_| Ok(true));

    let service = make_service(listings, MockGeocoder::new(), MockImageHost::new());
    service
        .delete(&identity(author), &id)
        .await
        .expect("author deletes");
}

#[rstest]
#[tokio::test]
async fn delete_by_another_identity_never_reaches_the_store() {
    let existing = stored_listing(UserId::random(), Vec::new());
    let id = *existing.id();
    let mut listings = MockListingRepository::new();
    listings
        .expect_find()
        .return_once(move |_| Ok(Some(existing)));
    listings.expect_delete_cascade().times(0);

    let service = make_service(listings, MockGeocoder::new(), MockImageHost::new());
    let err = service
        .delete(&identity(UserId::random()), &id)
        .await
        .expect_err("stranger");

    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn read_missing_listing_is_not_found() {
    let mut listings = MockListingRepository::new();
    listings.expect_find_detail().return_once(|_| Ok(None));

    let service = make_service(listings, MockGeocoder::new(), MockImageHost::new());
    let err = service
        .read(&ListingId::random())
        .await
        .expect_err("missing");

    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(err.message(), LISTING_NOT_FOUND_MESSAGE);
}
