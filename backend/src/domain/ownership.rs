//! Ownership authorization for listings and reviews.
//!
//! Mutations load the stored resource and compare its recorded author with
//! the acting [`Identity`] by [`UserId`]. A missing resource is reported as
//! `not_found`, never as `forbidden`, so callers can tell the two apart.

use serde_json::json;

use super::ports::{ListingRepository, ReviewRepository};
use super::port_error_mapping::{map_listing_error, map_review_error};
use super::{Error, Identity, Listing, ListingId, Review, ReviewId, UserId};

/// Notice shown when someone other than the author attempts a mutation.
pub const FORBIDDEN_MESSAGE: &str = "You do not have permission to do that";
/// Notice shown when a listing id does not resolve.
pub const LISTING_NOT_FOUND_MESSAGE: &str = "Campground not found!";
/// Notice shown when a review id does not resolve within its listing.
pub const REVIEW_NOT_FOUND_MESSAGE: &str = "Review not found!";

/// Kind of resource guarded by an ownership check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Listing,
    Review,
}

impl ResourceKind {
    /// Stable label used in error details and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Listing => "listing",
            Self::Review => "review",
        }
    }
}

/// Resource with an immutable recorded author.
pub trait Authored {
    /// Which kind of resource this is.
    const KIND: ResourceKind;

    /// Recorded author.
    fn author_id(&self) -> &UserId;
}

impl Authored for Listing {
    const KIND: ResourceKind = ResourceKind::Listing;

    fn author_id(&self) -> &UserId {
        self.author()
    }
}

impl Authored for Review {
    const KIND: ResourceKind = ResourceKind::Review;

    fn author_id(&self) -> &UserId {
        self.author()
    }
}

/// Succeed only when `identity` is the recorded author of `resource`.
pub fn require_owner<T: Authored>(identity: &Identity, resource: &T) -> Result<(), Error> {
    if identity.is(resource.author_id()) {
        return Ok(());
    }
    tracing::info!(
        user_id = %identity.user_id(),
        resource = T::KIND.as_str(),
        "ownership check failed"
    );
    Err(Error::forbidden(FORBIDDEN_MESSAGE).with_details(json!({
        "resource": T::KIND.as_str(),
    })))
}

/// Load a listing the acting identity is allowed to mutate.
pub async fn owned_listing<L>(
    listings: &L,
    identity: &Identity,
    id: &ListingId,
) -> Result<Listing, Error>
where
    L: ListingRepository + ?Sized,
{
    let listing = listings
        .find(id)
        .await
        .map_err(map_listing_error)?
        .ok_or_else(|| Error::not_found(LISTING_NOT_FOUND_MESSAGE))?;
    require_owner(identity, &listing)?;
    Ok(listing)
}

/// Load a review of `listing` the acting identity is allowed to remove.
pub async fn owned_review<R>(
    reviews: &R,
    identity: &Identity,
    listing: &ListingId,
    review: &ReviewId,
) -> Result<Review, Error>
where
    R: ReviewRepository + ?Sized,
{
    let review = reviews
        .find(listing, review)
        .await
        .map_err(map_review_error)?
        .ok_or_else(|| Error::not_found(REVIEW_NOT_FOUND_MESSAGE))?;
    require_owner(identity, &review)?;
    Ok(review)
}
