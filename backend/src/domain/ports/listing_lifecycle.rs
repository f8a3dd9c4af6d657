//! Driving port for listing use-cases.
//!
//! Inbound adapters call [`ListingLifecycle`] with an explicit [`Identity`]
//! produced by the authentication guard and a payload that already passed
//! the validation gate. Files travel as [`ImageUpload`]s and are only sent
//! to the image host once ownership has been confirmed.

use async_trait::async_trait;

use crate::domain::{Error, Identity, Listing, ListingDetail, ListingForm, ListingId};

use super::ImageUpload;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingLifecycle: Send + Sync {
    /// Every listing, for the index page and cluster map.
    async fn index(&self) -> Result<Vec<Listing>, Error>;

    /// Geocode, upload and persist a new listing authored by `identity`.
    async fn create(
        &self,
        identity: &Identity,
        form: ListingForm,
        uploads: Vec<ImageUpload>,
    ) -> Result<Listing, Error>;

    /// Listing with author and reviews resolved.
    async fn read(&self, id: &ListingId) -> Result<ListingDetail, Error>;

    /// Listing for the edit form; only its author may load it.
    async fn edit(&self, identity: &Identity, id: &ListingId) -> Result<Listing, Error>;

    /// Apply scalar changes, append uploads and remove marked images.
    async fn update(
        &self,
        identity: &Identity,
        id: &ListingId,
        form: ListingForm,
        uploads: Vec<ImageUpload>,
    ) -> Result<Listing, Error>;

    /// Remove the listing and cascade to its reviews.
    async fn delete(&self, identity: &Identity, id: &ListingId) -> Result<(), Error>;
}
