//! Review lifecycle service implementing the [`ReviewLifecycle`] port.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::domain::port_error_mapping::map_review_error;
use crate::domain::ports::{ReviewLifecycle, ReviewRepository};
use crate::domain::{
    Error, Identity, LISTING_NOT_FOUND_MESSAGE, ListingId, REVIEW_NOT_FOUND_MESSAGE, Review,
    ReviewDraft, ReviewId, owned_review,
};

/// Review service over a review repository.
///
/// The repository applies the review write and the listing's reference
/// update together, so a review never exists without its back-reference.
pub struct ReviewService<R: ?Sized> {
    reviews: Arc<R>,
}

impl<R: ?Sized> ReviewService<R> {
    /// Create a new service with the given repository.
    pub fn new(reviews: Arc<R>) -> Self {
        Self { reviews }
    }
}

#[async_trait]
impl<R> ReviewLifecycle for ReviewService<R>
where
    R: ReviewRepository + ?Sized,
{
    async fn create(
        &self,
        identity: &Identity,
        listing: &ListingId,
        draft: ReviewDraft,
    ) -> Result<Review, Error> {
        let review = Review::create(*identity.user_id(), draft);
        let attached = self
            .reviews
            .attach(listing, &review)
            .await
            .map_err(map_review_error)?;
        if !attached {
            return Err(Error::not_found(LISTING_NOT_FOUND_MESSAGE));
        }
        info!(listing_id = %listing, review_id = %review.id(), "review created");
        Ok(review)
    }

    async fn delete(
        &self,
        identity: &Identity,
        listing: &ListingId,
        review: &ReviewId,
    ) -> Result<(), Error> {
        owned_review(&*self.reviews, identity, listing, review).await?;
        let detached = self
            .reviews
            .detach(listing, review)
            .await
            .map_err(map_review_error)?;
        if !detached {
            return Err(Error::not_found(REVIEW_NOT_FOUND_MESSAGE));
        }
        info!(listing_id = %listing, review_id = %review, "review deleted");
        Ok(())
    }
}
