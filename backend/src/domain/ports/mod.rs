//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, geocoder, image host, password hasher) expose
//! strongly typed errors so adapters map their failures into predictable
//! variants. Driving ports are what inbound adapters call.

mod macros;
pub(crate) use macros::define_port_error;

mod geocoder;
mod image_host;
mod listing_lifecycle;
mod listing_repository;
mod login_service;
mod password_hasher;
mod review_lifecycle;
mod review_repository;
mod user_repository;

#[cfg(test)]
pub use geocoder::MockGeocoder;
pub use geocoder::{FixtureGeocoder, Geocoder, GeocoderError};
#[cfg(test)]
pub use image_host::MockImageHost;
pub use image_host::{
    ALLOWED_IMAGE_FORMATS, FixtureImageHost, IMAGE_FOLDER, ImageHost, ImageHostError, ImageUpload,
};
#[cfg(test)]
pub use listing_lifecycle::MockListingLifecycle;
pub use listing_lifecycle::ListingLifecycle;
#[cfg(test)]
pub use listing_repository::MockListingRepository;
pub use listing_repository::{ListingPersistenceError, ListingRepository};
#[cfg(test)]
pub use login_service::{MockLoginService, MockRegistrationService};
pub use login_service::{LoginService, RegistrationService};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use review_lifecycle::MockReviewLifecycle;
pub use review_lifecycle::ReviewLifecycle;
#[cfg(test)]
pub use review_repository::MockReviewRepository;
pub use review_repository::{ReviewPersistenceError, ReviewRepository};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{StoredCredentials, UserPersistenceError, UserRepository};
