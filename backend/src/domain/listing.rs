//! Listing aggregate: a campground with its location, images and reviews.
//!
//! A listing is created once (after its location has been geocoded), mutated
//! only by its author, and destroyed together with every review it holds.
//! The author reference is fixed at creation; no method changes it.

use std::fmt;

use minijinja::HtmlEscape;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ReviewDetail, ReviewId, User, UserId};

/// Validation errors for listing values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ListingValidationError {
    /// The identifier is not a UUID.
    #[error("listing id must be a valid UUID")]
    InvalidId,
    /// Price is negative or not a finite number.
    #[error("price must be a finite number of at least 0, got {value}")]
    InvalidPrice { value: f64 },
    /// Longitude or latitude outside the WGS84 ranges.
    #[error("coordinates out of range: longitude {longitude}, latitude {latitude}")]
    InvalidCoordinates { longitude: f64, latitude: f64 },
    /// A required text field was blank.
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },
}

/// Stable listing identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingId(Uuid);

impl ListingId {
    /// Parse a listing identifier from a path segment.
    pub fn new(id: impl AsRef<str>) -> Result<Self, ListingValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| ListingValidationError::InvalidId)
    }

    /// Generate a fresh identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Nightly price; finite and non-negative.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Price(f64);

impl Price {
    /// Validate a price.
    pub fn new(value: f64) -> Result<Self, ListingValidationError> {
        if !value.is_finite() || value < 0.0 {
            return Err(ListingValidationError::InvalidPrice { value });
        }
        Ok(Self(value))
    }

    /// Raw value.
    pub fn value(self) -> f64 {
        self.0
    }
}

/// Geocoded WGS84 point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    longitude: f64,
    latitude: f64,
}

impl GeoPoint {
    /// Validate a longitude/latitude pair.
    pub fn new(longitude: f64, latitude: f64) -> Result<Self, ListingValidationError> {
        let in_range = longitude.is_finite()
            && latitude.is_finite()
            && (-180.0..=180.0).contains(&longitude)
            && (-90.0..=90.0).contains(&latitude);
        if !in_range {
            return Err(ListingValidationError::InvalidCoordinates {
                longitude,
                latitude,
            });
        }
        Ok(Self {
            longitude,
            latitude,
        })
    }

    /// Longitude in degrees.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Latitude in degrees.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// `[longitude, latitude]`, the GeoJSON coordinate order.
    pub fn coordinates(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }
}

/// Image stored with the remote asset host.
///
/// `filename` is the host's identifier: it is the deletion key and the base
/// for derived renditions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Publicly reachable URL.
    pub url: String,
    /// Remote identifier.
    pub filename: String,
}

/// URL of the 300px-wide rendition of `image`.
///
/// # Examples
/// ```
/// use campgrounds::domain::{thumbnail_url, Image};
///
/// let image = Image {
///     url: "https://res.cloudinary.com/demo/image/upload/v1/YelpCamp/a.png".into(),
///     filename: "YelpCamp/a".into(),
/// };
/// assert_eq!(
///     thumbnail_url(&image),
///     "https://res.cloudinary.com/demo/image/upload/w_300/v1/YelpCamp/a.png"
/// );
/// ```
pub fn thumbnail_url(image: &Image) -> String {
    image.url.replacen("/upload", "/upload/w_300", 1)
}

const POPUP_EXCERPT_CHARS: usize = 20;

/// Map popup markup for a listing: the first 20 characters of the
/// description, HTML-escaped, followed by an ellipsis.
pub fn popup_markup(listing: &Listing) -> String {
    let excerpt: String = listing
        .description()
        .chars()
        .take(POPUP_EXCERPT_CHARS)
        .collect();
    format!("<p>{}...</p>", HtmlEscape(&excerpt))
}

fn require_text(value: &str, field: &'static str) -> Result<String, ListingValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ListingValidationError::EmptyField { field });
    }
    Ok(trimmed.to_owned())
}

/// Author-editable listing fields, already validated.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingDraft {
    title: String,
    location: String,
    price: Price,
    description: String,
}

impl ListingDraft {
    /// Build a draft from field values.
    pub fn new(
        title: &str,
        location: &str,
        price: Price,
        description: &str,
    ) -> Result<Self, ListingValidationError> {
        Ok(Self {
            title: require_text(title, "title")?,
            location: require_text(location, "location")?,
            price,
            description: require_text(description, "description")?,
        })
    }

    /// Free-text location resolved by the geocoder on creation.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Submitted title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Submitted price.
    pub fn price(&self) -> Price {
        self.price
    }

    /// Submitted description.
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Every stored field of a listing; used by persistence adapters to rebuild
/// the aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingRecord {
    pub id: ListingId,
    pub title: String,
    pub location: String,
    pub price: Price,
    pub description: String,
    pub geometry: GeoPoint,
    pub images: Vec<Image>,
    pub author: UserId,
    pub reviews: Vec<ReviewId>,
}

/// Listing aggregate.
///
/// ## Invariants
/// - `geometry` is always present.
/// - `images` keep insertion order.
/// - `author` never changes after creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    id: ListingId,
    title: String,
    location: String,
    price: Price,
    description: String,
    geometry: GeoPoint,
    images: Vec<Image>,
    author: UserId,
    reviews: Vec<ReviewId>,
}

impl Listing {
    /// Create a new listing authored by `author`.
    pub fn create(author: UserId, draft: ListingDraft, geometry: GeoPoint, images: Vec<Image>) -> Self {
        let ListingDraft {
            title,
            location,
            price,
            description,
        } = draft;
        Self {
            id: ListingId::random(),
            title,
            location,
            price,
            description,
            geometry,
            images,
            author,
            reviews: Vec::new(),
        }
    }

    /// Rebuild a listing from stored fields.
    pub fn restore(record: ListingRecord) -> Self {
        let ListingRecord {
            id,
            title,
            location,
            price,
            description,
            geometry,
            images,
            author,
            reviews,
        } = record;
        Self {
            id,
            title,
            location,
            price,
            description,
            geometry,
            images,
            author,
            reviews,
        }
    }

    /// Apply the author-editable fields of `draft`.
    ///
    /// Geometry is left as-is: an edited location is not re-geocoded.
    pub fn apply_changes(&mut self, draft: ListingDraft) {
        let ListingDraft {
            title,
            location,
            price,
            description,
        } = draft;
        self.title = title;
        self.location = location;
        self.price = price;
        self.description = description;
    }

    /// Append images after the existing ones.
    pub fn append_images(&mut self, images: impl IntoIterator<Item = Image>) {
        self.images.extend(images);
    }

    /// Remove every image whose filename is listed, returning the removed ones.
    pub fn remove_images(&mut self, filenames: &[String]) -> Vec<Image> {
        let (removed, kept): (Vec<Image>, Vec<Image>) = std::mem::take(&mut self.images)
            .into_iter()
            .partition(|image| filenames.contains(&image.filename));
        self.images = kept;
        removed
    }

    /// Whether an image with `filename` is attached.
    pub fn has_image(&self, filename: &str) -> bool {
        self.images.iter().any(|image| image.filename == filename)
    }

    /// Record a review reference.
    pub fn attach_review(&mut self, review: ReviewId) {
        if !self.reviews.contains(&review) {
            self.reviews.push(review);
        }
    }

    /// Drop a review reference; returns whether it was present.
    pub fn detach_review(&mut self, review: &ReviewId) -> bool {
        let before = self.reviews.len();
        self.reviews.retain(|id| id != review);
        self.reviews.len() != before
    }

    /// Identifier.
    pub fn id(&self) -> &ListingId {
        &self.id
    }

    /// Title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Free-text location.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Price.
    pub fn price(&self) -> Price {
        self.price
    }

    /// Description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Geocoded point.
    pub fn geometry(&self) -> &GeoPoint {
        &self.geometry
    }

    /// Images in insertion order.
    pub fn images(&self) -> &[Image] {
        &self.images
    }

    /// Author reference.
    pub fn author(&self) -> &UserId {
        &self.author
    }

    /// Review references.
    pub fn reviews(&self) -> &[ReviewId] {
        &self.reviews
    }
}

/// Listing with its author and reviews resolved for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingDetail {
    pub listing: Listing,
    pub author: User,
    pub reviews: Vec<ReviewDetail>,
}

/// Everything removed when a listing is destroyed.
///
/// Built from the stored listing and handed to the store, which must remove
/// the listing and all referenced reviews in one atomic step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadePlan {
    listing: ListingId,
    reviews: Vec<ReviewId>,
}

impl CascadePlan {
    /// Plan the removal of `listing` and its reviews.
    pub fn for_listing(listing: &Listing) -> Self {
        Self {
            listing: *listing.id(),
            reviews: listing.reviews().to_vec(),
        }
    }

    /// Listing to remove.
    pub fn listing(&self) -> &ListingId {
        &self.listing
    }

    /// Reviews to remove alongside it.
    pub fn reviews(&self) -> &[ReviewId] {
        &self.reviews
    }
}
