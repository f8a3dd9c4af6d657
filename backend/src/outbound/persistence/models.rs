//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions back into domain types
//! re-validate every value, so a corrupt row surfaces as an error rather than
//! as an aggregate that breaks its invariants.

use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    Email, GeoPoint, Image, Listing, ListingId, ListingRecord, Price, Rating, Review, ReviewId,
    User, UserId, Username,
};

use super::schema::{listings, reviews, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub username: String,
}

impl UserRow {
    pub(crate) fn into_user(self) -> Result<User, String> {
        let email = Email::new(&self.email).map_err(|err| err.to_string())?;
        let username = Username::new(&self.username).map_err(|err| err.to_string())?;
        Ok(User::new(UserId::from_uuid(self.id), email, username))
    }
}

/// Row struct carrying the password hash for login.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CredentialsRow {
    #[diesel(embed)]
    pub user: UserRow,
    pub password_hash: String,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub username: &'a str,
    pub password_hash: &'a str,
}

/// Row struct for reading from the listings table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = listings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ListingRow {
    pub id: Uuid,
    pub title: String,
    pub location: String,
    pub price: f64,
    pub description: String,
    pub longitude: f64,
    pub latitude: f64,
    pub images: serde_json::Value,
    pub author_id: Uuid,
}

impl ListingRow {
    /// Rebuild the aggregate with the given review references.
    pub(crate) fn into_listing(self, reviews: Vec<Uuid>) -> Result<Listing, String> {
        let price = Price::new(self.price).map_err(|err| err.to_string())?;
        let geometry =
            GeoPoint::new(self.longitude, self.latitude).map_err(|err| err.to_string())?;
        let images: Vec<Image> =
            serde_json::from_value(self.images).map_err(|err| format!("images: {err}"))?;
        Ok(Listing::restore(ListingRecord {
            id: ListingId::from_uuid(self.id),
            title: self.title,
            location: self.location,
            price,
            description: self.description,
            geometry,
            images,
            author: UserId::from_uuid(self.author_id),
            reviews: reviews.into_iter().map(ReviewId::from_uuid).collect(),
        }))
    }
}

/// Insertable struct for creating new listing records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = listings)]
pub(crate) struct NewListingRow<'a> {
    pub id: Uuid,
    pub title: &'a str,
    pub location: &'a str,
    pub price: f64,
    pub description: &'a str,
    pub longitude: f64,
    pub latitude: f64,
    pub images: serde_json::Value,
    pub author_id: Uuid,
}

impl<'a> NewListingRow<'a> {
    pub(crate) fn from_listing(listing: &'a Listing) -> Result<Self, String> {
        Ok(Self {
            id: *listing.id().as_uuid(),
            title: listing.title(),
            location: listing.location(),
            price: listing.price().value(),
            description: listing.description(),
            longitude: listing.geometry().longitude(),
            latitude: listing.geometry().latitude(),
            images: images_json(listing)?,
            author_id: *listing.author().as_uuid(),
        })
    }
}

/// Changeset for the author-editable columns and the image sequence.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = listings)]
pub(crate) struct ListingChangeset<'a> {
    pub title: &'a str,
    pub location: &'a str,
    pub price: f64,
    pub description: &'a str,
    pub images: serde_json::Value,
}

impl<'a> ListingChangeset<'a> {
    pub(crate) fn from_listing(listing: &'a Listing) -> Result<Self, String> {
        Ok(Self {
            title: listing.title(),
            location: listing.location(),
            price: listing.price().value(),
            description: listing.description(),
            images: images_json(listing)?,
        })
    }
}

fn images_json(listing: &Listing) -> Result<serde_json::Value, String> {
    serde_json::to_value(listing.images()).map_err(|err| format!("images: {err}"))
}

/// Row struct for reading from the reviews table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = reviews)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ReviewRow {
    pub id: Uuid,
    pub body: String,
    pub rating: i16,
    pub author_id: Uuid,
}

impl ReviewRow {
    pub(crate) fn into_review(self) -> Result<Review, String> {
        let rating = Rating::new(i64::from(self.rating)).map_err(|err| err.to_string())?;
        Ok(Review::restore(
            ReviewId::from_uuid(self.id),
            self.body,
            rating,
            UserId::from_uuid(self.author_id),
        ))
    }
}

/// Insertable struct for creating new review records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = reviews)]
pub(crate) struct NewReviewRow<'a> {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub body: &'a str,
    pub rating: i16,
    pub author_id: Uuid,
}

impl<'a> NewReviewRow<'a> {
    pub(crate) fn from_review(listing: &ListingId, review: &'a Review) -> Self {
        Self {
            id: *review.id().as_uuid(),
            listing_id: *listing.as_uuid(),
            body: review.body(),
            rating: i16::from(review.rating().value()),
            author_id: *review.author().as_uuid(),
        }
    }
}
