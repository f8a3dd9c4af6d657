//! In-process entity store used when no database is configured.
//!
//! One mutex guards users, listings and reviews together, so the multi-entity
//! writes (review attach/detach, cascade delete) are atomic just as they are
//! inside a PostgreSQL transaction. State is lost on restart.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{
    ListingPersistenceError, ListingRepository, ReviewPersistenceError, ReviewRepository,
    StoredCredentials, UserPersistenceError, UserRepository,
};
use crate::domain::{
    CascadePlan, Listing, ListingDetail, ListingId, ListingRecord, Review, ReviewDetail,
    ReviewId, User, UserId, Username,
};

#[derive(Default)]
struct Tables {
    users: HashMap<UserId, StoredCredentials>,
    listings: Vec<Listing>,
    reviews: HashMap<ReviewId, (ListingId, Review)>,
}

impl Tables {
    fn listing_mut(&mut self, id: &ListingId) -> Option<&mut Listing> {
        self.listings.iter_mut().find(|listing| listing.id() == id)
    }

    fn listing(&self, id: &ListingId) -> Option<&Listing> {
        self.listings.iter().find(|listing| listing.id() == id)
    }

    fn user(&self, id: &UserId) -> Option<&User> {
        self.users.get(id).map(|stored| &stored.user)
    }
}

/// Shared in-memory implementation of every repository port.
///
/// Cloning yields another handle onto the same tables.
#[derive(Clone, Default)]
pub struct InMemoryEntityStore {
    tables: Arc<Mutex<Tables>>,
}

const POISONED: &str = "in-memory store lock poisoned";

impl InMemoryEntityStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock<E>(&self, poisoned: impl FnOnce(&'static str) -> E) -> Result<MutexGuard<'_, Tables>, E> {
        self.tables.lock().map_err(|_| poisoned(POISONED))
    }
}

#[async_trait]
impl UserRepository for InMemoryEntityStore {
    async fn create(&self, user: &User, password_hash: &str) -> Result<(), UserPersistenceError> {
        let mut tables = self.lock(UserPersistenceError::connection)?;
        let clash = |field: &str| {
            tables.users.values().any(|stored| match field {
                "username" => stored.user.username() == user.username(),
                _ => stored.user.email() == user.email(),
            })
        };
        for field in ["username", "email"] {
            if clash(field) {
                return Err(UserPersistenceError::duplicate(field));
            }
        }
        tables.users.insert(
            *user.id(),
            StoredCredentials {
                user: user.clone(),
                password_hash: password_hash.to_owned(),
            },
        );
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let tables = self.lock(UserPersistenceError::connection)?;
        Ok(tables.user(id).cloned())
    }

    async fn find_credentials(
        &self,
        username: &Username,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError> {
        let tables = self.lock(UserPersistenceError::connection)?;
        Ok(tables
            .users
            .values()
            .find(|stored| stored.user.username() == username)
            .cloned())
    }
}

#[async_trait]
impl ListingRepository for InMemoryEntityStore {
    async fn list(&self) -> Result<Vec<Listing>, ListingPersistenceError> {
        let tables = self.lock(ListingPersistenceError::connection)?;
        Ok(tables.listings.clone())
    }

    async fn find(&self, id: &ListingId) -> Result<Option<Listing>, ListingPersistenceError> {
        let tables = self.lock(ListingPersistenceError::connection)?;
        Ok(tables.listing(id).cloned())
    }

    async fn find_detail(
        &self,
        id: &ListingId,
    ) -> Result<Option<ListingDetail>, ListingPersistenceError> {
        let tables = self.lock(ListingPersistenceError::connection)?;
        let Some(listing) = tables.listing(id) else {
            return Ok(None);
        };
        let author = tables
            .user(listing.author())
            .cloned()
            .ok_or_else(|| ListingPersistenceError::corrupt("listing author is missing"))?;
        let mut reviews = Vec::with_capacity(listing.reviews().len());
        for review_id in listing.reviews() {
            let Some((_, review)) = tables.reviews.get(review_id) else {
                continue;
            };
            let review_author = tables
                .user(review.author())
                .cloned()
                .ok_or_else(|| ListingPersistenceError::corrupt("review author is missing"))?;
            reviews.push(ReviewDetail {
                review: review.clone(),
                author: review_author,
            });
        }
        Ok(Some(ListingDetail {
            listing: listing.clone(),
            author,
            reviews,
        }))
    }

    async fn insert(&self, listing: &Listing) -> Result<(), ListingPersistenceError> {
        let mut tables = self.lock(ListingPersistenceError::connection)?;
        if tables.listing(listing.id()).is_some() {
            return Err(ListingPersistenceError::query("listing already exists"));
        }
        tables.listings.push(listing.clone());
        Ok(())
    }

    async fn update(&self, listing: &Listing) -> Result<bool, ListingPersistenceError> {
        let mut tables = self.lock(ListingPersistenceError::connection)?;
        let Some(stored) = tables.listing_mut(listing.id()) else {
            return Ok(false);
        };
        *stored = Listing::restore(ListingRecord {
            id: *stored.id(),
            title: listing.title().to_owned(),
            location: listing.location().to_owned(),
            price: listing.price(),
            description: listing.description().to_owned(),
            geometry: *listing.geometry(),
            images: listing.images().to_vec(),
            author: *stored.author(),
            reviews: stored.reviews().to_vec(),
        });
        Ok(true)
    }

    async fn delete_cascade(&self, plan: &CascadePlan) -> Result<bool, ListingPersistenceError> {
        let mut tables = self.lock(ListingPersistenceError::connection)?;
        let listing_id = *plan.listing();
        tables.reviews.retain(|review_id, (owner, _)| {
            *owner != listing_id && !plan.reviews().contains(review_id)
        });
        let before = tables.listings.len();
        tables.listings.retain(|listing| listing.id() != &listing_id);
        Ok(tables.listings.len() != before)
    }
}

#[async_trait]
impl ReviewRepository for InMemoryEntityStore {
    async fn find(
        &self,
        listing: &ListingId,
        review: &ReviewId,
    ) -> Result<Option<Review>, ReviewPersistenceError> {
        let tables = self.lock(ReviewPersistenceError::connection)?;
        Ok(tables
            .reviews
            .get(review)
            .filter(|(owner, _)| owner == listing)
            .map(|(_, review)| review.clone()))
    }

    async fn attach(
        &self,
        listing: &ListingId,
        review: &Review,
    ) -> Result<bool, ReviewPersistenceError> {
        let mut tables = self.lock(ReviewPersistenceError::connection)?;
        let Some(parent) = tables.listing_mut(listing) else {
            return Ok(false);
        };
        parent.attach_review(*review.id());
        tables.reviews.insert(*review.id(), (*listing, review.clone()));
        Ok(true)
    }

    async fn detach(
        &self,
        listing: &ListingId,
        review: &ReviewId,
    ) -> Result<bool, ReviewPersistenceError> {
        let mut tables = self.lock(ReviewPersistenceError::connection)?;
        let owned = matches!(tables.reviews.get(review), Some((owner, _)) if owner == listing);
        if !owned {
            return Ok(false);
        }
        tables.reviews.remove(review);
        if let Some(parent) = tables.listing_mut(listing) {
            parent.detach_review(review);
        }
        Ok(true)
    }
}
