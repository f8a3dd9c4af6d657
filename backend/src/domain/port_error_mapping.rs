//! Translation of driven-port errors into domain [`Error`]s.
//!
//! Connection failures surface as `service_unavailable`; everything else a
//! store reports is an internal fault and is redacted at the HTTP boundary.

use super::Error;
use super::ports::{
    GeocoderError, ImageHostError, ListingPersistenceError, PasswordHashError,
    ReviewPersistenceError, UserPersistenceError,
};

pub(crate) fn map_listing_error(error: ListingPersistenceError) -> Error {
    match error {
        ListingPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("listing repository unavailable: {message}"))
        }
        ListingPersistenceError::Query { message } => {
            Error::internal(format!("listing repository error: {message}"))
        }
        ListingPersistenceError::Corrupt { message } => {
            Error::internal(format!("stored listing is invalid: {message}"))
        }
    }
}

pub(crate) fn map_review_error(error: ReviewPersistenceError) -> Error {
    match error {
        ReviewPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("review repository unavailable: {message}"))
        }
        ReviewPersistenceError::Query { message } => {
            Error::internal(format!("review repository error: {message}"))
        }
        ReviewPersistenceError::Corrupt { message } => {
            Error::internal(format!("stored review is invalid: {message}"))
        }
    }
}

pub(crate) fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        duplicate @ UserPersistenceError::Duplicate { .. } => Error::conflict(duplicate.to_string()),
    }
}

pub(crate) fn map_geocoder_error(error: GeocoderError) -> Error {
    Error::upstream_failure(error.to_string())
}

pub(crate) fn map_image_host_error(error: ImageHostError) -> Error {
    match error {
        unsupported @ ImageHostError::UnsupportedFormat { .. } => {
            Error::invalid_request(unsupported.to_string())
        }
        other => Error::upstream_failure(other.to_string()),
    }
}

pub(crate) fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(error.to_string())
}
