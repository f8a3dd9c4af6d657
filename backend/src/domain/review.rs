//! Reviews left by any signed-in user on a listing.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{User, UserId};

/// Lowest accepted star rating.
pub const RATING_MIN: u8 = 1;
/// Highest accepted star rating.
pub const RATING_MAX: u8 = 5;

/// Validation errors for review values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReviewValidationError {
    /// The identifier is not a UUID.
    #[error("review id must be a valid UUID")]
    InvalidId,
    /// Rating outside `RATING_MIN..=RATING_MAX`.
    #[error("rating must be between {RATING_MIN} and {RATING_MAX}, got {value}")]
    RatingOutOfRange { value: i64 },
    /// Body was blank.
    #[error("review body must not be empty")]
    EmptyBody,
}

/// Stable review identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewId(Uuid);

impl ReviewId {
    /// Parse a review identifier from a path segment.
    pub fn new(id: impl AsRef<str>) -> Result<Self, ReviewValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| ReviewValidationError::InvalidId)
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

impl fmt::Display for ReviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Star rating in `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Rating(u8);

impl Rating {
    /// Validate a rating.
    pub fn new(value: i64) -> Result<Self, ReviewValidationError> {
        u8::try_from(value)
            .ok()
            .filter(|stars| (RATING_MIN..=RATING_MAX).contains(stars))
            .map(Self)
            .ok_or(ReviewValidationError::RatingOutOfRange { value })
    }

    /// Number of stars.
    pub fn value(self) -> u8 {
        self.0
    }
}

/// Validated review submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewDraft {
    body: String,
    rating: Rating,
}

impl ReviewDraft {
    /// Build a draft; the body is trimmed and must not be blank.
    pub fn new(body: &str, rating: Rating) -> Result<Self, ReviewValidationError> {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            return Err(ReviewValidationError::EmptyBody);
        }
        Ok(Self {
            body: trimmed.to_owned(),
            rating,
        })
    }

    /// Trimmed review text.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Submitted star rating.
    pub fn rating(&self) -> Rating {
        self.rating
    }
}

/// Review entity.
///
/// ## Invariants
/// - `author` is fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Review {
    id: ReviewId,
    body: String,
    rating: Rating,
    author: UserId,
}

impl Review {
    /// Create a review authored by `author`.
    pub fn create(author: UserId, draft: ReviewDraft) -> Self {
        Self {
            id: ReviewId::random(),
            body: draft.body,
            rating: draft.rating,
            author,
        }
    }

    /// Rebuild a review from stored fields.
    pub fn restore(id: ReviewId, body: String, rating: Rating, author: UserId) -> Self {
        Self {
            id,
            body,
            rating,
            author,
        }
    }

    /// Identifier.
    pub fn id(&self) -> &ReviewId {
        &self.id
    }

    /// Text.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Stars.
    pub fn rating(&self) -> Rating {
        self.rating
    }

    /// Author reference.
    pub fn author(&self) -> &UserId {
        &self.author
    }
}

/// Review with its author resolved for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewDetail {
    pub review: Review,
    pub author: User,
}
