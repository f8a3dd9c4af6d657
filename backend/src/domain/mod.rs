//! Campground domain: listings, reviews and accounts.
//!
//! Entities validate themselves on construction and expose no setters beyond
//! their documented mutators. The services here enforce sign-in, authorship
//! and the review cascade, and reach storage and third parties only through
//! [`ports`].

pub mod account_service;
pub mod auth;
pub mod error;
pub mod listing;
pub mod listing_service;
pub mod ownership;
pub(crate) mod port_error_mapping;
pub mod ports;
pub mod review;
pub mod review_service;
pub mod trace_id;
pub mod user;
pub mod validation;

pub use self::account_service::{AccountService, BAD_CREDENTIALS_MESSAGE};
pub use self::auth::{CredentialValidationError, LoginCredentials, Registration};
pub use self::error::{Error, ErrorCode};
pub use self::listing::{
    CascadePlan, GeoPoint, Image, Listing, ListingDetail, ListingDraft, ListingId, ListingRecord,
    ListingValidationError, Price, popup_markup, thumbnail_url,
};
pub use self::listing_service::ListingService;
pub use self::ownership::{
    Authored, FORBIDDEN_MESSAGE, LISTING_NOT_FOUND_MESSAGE, REVIEW_NOT_FOUND_MESSAGE,
    ResourceKind, owned_listing, owned_review, require_owner,
};
pub use self::review::{
    RATING_MAX, RATING_MIN, Rating, Review, ReviewDetail, ReviewDraft, ReviewId,
    ReviewValidationError,
};
pub use self::review_service::ReviewService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{Email, Identity, User, UserId, UserValidationError, Username};
pub use self::validation::{
    DELETE_IMAGES_FIELD, FieldRule, FieldSpec, FieldViolation, FormPayload, LISTING_SCHEMA,
    ListingForm, REGISTRATION_SCHEMA, REVIEW_SCHEMA, Schema, ValidationErrors, ViolationKind,
    parse_listing, parse_registration, parse_review, validate,
};

/// Convenient result alias for domain and handler code.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use campgrounds::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
