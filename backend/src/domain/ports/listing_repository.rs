//! Port abstraction for listing persistence.
use async_trait::async_trait;

use crate::domain::{CascadePlan, Listing, ListingDetail, ListingId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by listing repository adapters.
    pub enum ListingPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "listing repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "listing repository query failed: {message}",
        /// A stored row could not be turned back into a listing.
        Corrupt { message: String } => "stored listing is invalid: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingRepository: Send + Sync {
    /// Every listing, newest last.
    async fn list(&self) -> Result<Vec<Listing>, ListingPersistenceError>;

    /// Fetch one listing with review references but nothing resolved.
    async fn find(&self, id: &ListingId) -> Result<Option<Listing>, ListingPersistenceError>;

    /// Fetch one listing with its author, reviews and review authors.
    async fn find_detail(
        &self,
        id: &ListingId,
    ) -> Result<Option<ListingDetail>, ListingPersistenceError>;

    /// Persist a freshly created listing.
    async fn insert(&self, listing: &Listing) -> Result<(), ListingPersistenceError>;

    /// Write the editable fields and image sequence of an existing listing.
    ///
    /// Author and review references are never written by this call. Returns
    /// `false` when the listing no longer exists.
    async fn update(&self, listing: &Listing) -> Result<bool, ListingPersistenceError>;

    /// Remove the listing and every review named in `plan` as one atomic
    /// step. Returns `false` when the listing was already gone.
    async fn delete_cascade(&self, plan: &CascadePlan) -> Result<bool, ListingPersistenceError>;
}
