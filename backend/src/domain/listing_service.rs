//! Listing lifecycle service implementing the [`ListingLifecycle`] port.
//!
//! Every operation receives an already validated [`ListingForm`]; ownership
//! is checked before any file reaches the image host, and the geocoder is
//! consulted exactly once per creation.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::ports::{Geocoder, ImageHost, ImageUpload, ListingLifecycle, ListingRepository};
use crate::domain::port_error_mapping::{
    map_geocoder_error, map_image_host_error, map_listing_error,
};
use crate::domain::{
    CascadePlan, Error, Identity, Image, LISTING_NOT_FOUND_MESSAGE, Listing, ListingDetail,
    ListingForm, ListingId, owned_listing,
};

/// Listing service over a repository, a geocoder and an image host.
pub struct ListingService<L: ?Sized, G: ?Sized, H: ?Sized> {
    listings: Arc<L>,
    geocoder: Arc<G>,
    images: Arc<H>,
}

impl<L: ?Sized, G: ?Sized, H: ?Sized> ListingService<L, G, H> {
    /// Create a new service with the given collaborators.
    pub fn new(listings: Arc<L>, geocoder: Arc<G>, images: Arc<H>) -> Self {
        Self {
            listings,
            geocoder,
            images,
        }
    }
}

fn ensure_allowed(uploads: &[ImageUpload]) -> Result<(), Error> {
    match uploads.iter().find(|upload| !upload.is_allowed()) {
        Some(rejected) => Err(Error::invalid_request(format!(
            "{} is not a jpeg, png or jpg image",
            rejected.file_name
        ))),
        None => Ok(()),
    }
}

impl<L, G, H> ListingService<L, G, H>
where
    L: ListingRepository + ?Sized,
    G: Geocoder + ?Sized,
    H: ImageHost + ?Sized,
{
    /// Upload every file, rolling back the ones already stored if any fails.
    async fn upload_all(&self, uploads: &[ImageUpload]) -> Result<Vec<Image>, Error> {
        let mut stored = Vec::with_capacity(uploads.len());
        for upload in uploads {
            match self.images.upload(upload).await {
                Ok(image) => stored.push(image),
                Err(err) => {
                    self.discard(&stored).await;
                    return Err(map_image_host_error(err));
                }
            }
        }
        Ok(stored)
    }

    /// Best-effort removal of images that will not be referenced by any
    /// stored listing.
    async fn discard(&self, images: &[Image]) {
        for image in images {
            if let Err(err) = self.images.destroy(&image.filename).await {
                warn!(filename = %image.filename, error = %err, "failed to discard uploaded image");
            }
        }
    }

    /// Destroy each named image that is attached to `listing`, remotely first.
    ///
    /// Returns the filenames whose remote deletion succeeded and those that
    /// failed. Names not attached to the listing are ignored.
    async fn destroy_marked(
        &self,
        listing: &Listing,
        filenames: &[String],
    ) -> (Vec<String>, Vec<String>) {
        let mut destroyed = Vec::new();
        let mut failed = Vec::new();
        for filename in filenames {
            if !listing.has_image(filename) || destroyed.contains(filename) {
                continue;
            }
            match self.images.destroy(filename).await {
                Ok(()) => destroyed.push(filename.clone()),
                Err(err) => {
                    warn!(listing_id = %listing.id(), %filename, error = %err, "remote image deletion failed");
                    failed.push(filename.clone());
                }
            }
        }
        (destroyed, failed)
    }
}

#[async_trait]
impl<L, G, H> ListingLifecycle for ListingService<L, G, H>
where
    L: ListingRepository + ?Sized,
    G: Geocoder + ?Sized,
    H: ImageHost + ?Sized,
{
    async fn index(&self) -> Result<Vec<Listing>, Error> {
        self.listings.list().await.map_err(map_listing_error)
    }

    async fn create(
        &self,
        identity: &Identity,
        form: ListingForm,
        uploads: Vec<ImageUpload>,
    ) -> Result<Listing, Error> {
        ensure_allowed(&uploads)?;
        let ListingForm { draft, .. } = form;

        let geometry = self
            .geocoder
            .forward(draft.location())
            .await
            .map_err(map_geocoder_error)?
            .ok_or_else(|| {
                Error::upstream_failure(format!(
                    "Could not find a location matching \"{}\"",
                    draft.location()
                ))
            })?;

        let images = self.upload_all(&uploads).await?;
        let listing = Listing::create(*identity.user_id(), draft, geometry, images);
        if let Err(err) = self.listings.insert(&listing).await {
            self.discard(listing.images()).await;
            return Err(map_listing_error(err));
        }
        info!(listing_id = %listing.id(), author = %identity.user_id(), "listing created");
        Ok(listing)
    }

    async fn read(&self, id: &ListingId) -> Result<ListingDetail, Error> {
        self.listings
            .find_detail(id)
            .await
            .map_err(map_listing_error)?
            .ok_or_else(|| Error::not_found(LISTING_NOT_FOUND_MESSAGE))
    }

    async fn edit(&self, identity: &Identity, id: &ListingId) -> Result<Listing, Error> {
        owned_listing(&*self.listings, identity, id).await
    }

    async fn update(
        &self,
        identity: &Identity,
        id: &ListingId,
        form: ListingForm,
        uploads: Vec<ImageUpload>,
    ) -> Result<Listing, Error> {
        ensure_allowed(&uploads)?;
        let mut listing = owned_listing(&*self.listings, identity, id).await?;
        let ListingForm {
            draft,
            delete_images,
        } = form;

        let added = self.upload_all(&uploads).await?;
        listing.apply_changes(draft);
        listing.append_images(added.iter().cloned());

        let (destroyed, failed) = self.destroy_marked(&listing, &delete_images).await;
        listing.remove_images(&destroyed);

        match self.listings.update(&listing).await {
            Ok(true) => {}
            Ok(false) => {
                self.discard(&added).await;
                return Err(Error::not_found(LISTING_NOT_FOUND_MESSAGE));
            }
            Err(err) => {
                self.discard(&added).await;
                return Err(map_listing_error(err));
            }
        }
        info!(
            listing_id = %listing.id(),
            added = added.len(),
            removed = destroyed.len(),
            "listing updated"
        );

        if failed.is_empty() {
            Ok(listing)
        } else {
            Err(Error::upstream_failure(format!(
                "Campground updated, but {} image(s) could not be deleted from the image host",
                failed.len()
            ))
            .with_details(serde_json::json!({ "filenames": failed })))
        }
    }

    async fn delete(&self, identity: &Identity, id: &ListingId) -> Result<(), Error> {
        let listing = owned_listing(&*self.listings, identity, id).await?;
        let plan = CascadePlan::for_listing(&listing);
        let removed = self
            .listings
            .delete_cascade(&plan)
            .await
            .map_err(map_listing_error)?;
        if !removed {
            return Err(Error::not_found(LISTING_NOT_FOUND_MESSAGE));
        }
        info!(
            listing_id = %plan.listing(),
            reviews = plan.reviews().len(),
            "listing deleted with its reviews"
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "listing_service_tests.rs"]
mod tests;
