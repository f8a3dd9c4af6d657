//! Port abstraction for review persistence.
//!
//! Creating or removing a review touches both the review and its listing's
//! review set; adapters apply each pair of writes atomically.
use async_trait::async_trait;

use crate::domain::{ListingId, Review, ReviewId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by review repository adapters.
    pub enum ReviewPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "review repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "review repository query failed: {message}",
        /// A stored row could not be turned back into a review.
        Corrupt { message: String } => "stored review is invalid: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Fetch a review, but only if it belongs to `listing`.
    async fn find(
        &self,
        listing: &ListingId,
        review: &ReviewId,
    ) -> Result<Option<Review>, ReviewPersistenceError>;

    /// Store `review` and add it to the listing's review set. Returns `false`
    /// (and writes nothing) when the listing does not exist.
    async fn attach(
        &self,
        listing: &ListingId,
        review: &Review,
    ) -> Result<bool, ReviewPersistenceError>;

    /// Remove the review and its reference from the listing. Returns `false`
    /// when there was nothing to remove.
    async fn detach(
        &self,
        listing: &ListingId,
        review: &ReviewId,
    ) -> Result<bool, ReviewPersistenceError>;
}
