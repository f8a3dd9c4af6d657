//! Driving port for review use-cases.

use async_trait::async_trait;

use crate::domain::{Error, Identity, ListingId, Review, ReviewDraft, ReviewId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewLifecycle: Send + Sync {
    /// Add a review by `identity` to the listing.
    async fn create(
        &self,
        identity: &Identity,
        listing: &ListingId,
        draft: ReviewDraft,
    ) -> Result<Review, Error>;

    /// Remove a review; only its author may do so.
    async fn delete(
        &self,
        identity: &Identity,
        listing: &ListingId,
        review: &ReviewId,
    ) -> Result<(), Error>;
}
