//! PostgreSQL-backed `ReviewRepository` implementation using Diesel ORM.
//!
//! Attaching locks the parent listing row for the duration of the insert, so
//! a concurrent cascade delete either sees the new review or runs after the
//! listing check fails.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{ReviewPersistenceError, ReviewRepository};
use crate::domain::{ListingId, Review, ReviewId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewReviewRow, ReviewRow};
use super::pool::DbPool;
use super::schema::{listings, reviews};

/// Diesel-backed implementation of the `ReviewRepository` port.
#[derive(Clone)]
pub struct DieselReviewRepository {
    pool: DbPool,
}

impl DieselReviewRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_error(error: diesel::result::Error) -> ReviewPersistenceError {
    map_diesel_error(
        error,
        ReviewPersistenceError::query,
        ReviewPersistenceError::connection,
    )
}

#[async_trait]
impl ReviewRepository for DieselReviewRepository {
    async fn find(
        &self,
        listing: &ListingId,
        review: &ReviewId,
    ) -> Result<Option<Review>, ReviewPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, ReviewPersistenceError::connection))?;
        reviews::table
            .filter(reviews::id.eq(review.as_uuid()))
            .filter(reviews::listing_id.eq(listing.as_uuid()))
            .select(ReviewRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_error)?
            .map(|row| row.into_review().map_err(ReviewPersistenceError::corrupt))
            .transpose()
    }

    async fn attach(
        &self,
        listing: &ListingId,
        review: &Review,
    ) -> Result<bool, ReviewPersistenceError> {
        let row = NewReviewRow::from_review(listing, review);
        let listing_id = *listing.as_uuid();
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, ReviewPersistenceError::connection))?;
        conn.transaction(|conn| {
            async move {
                let parent: Option<Uuid> = listings::table
                    .filter(listings::id.eq(listing_id))
                    .select(listings::id)
                    .for_update()
                    .first(conn)
                    .await
                    .optional()?;
                if parent.is_none() {
                    return Ok(false);
                }
                diesel::insert_into(reviews::table)
                    .values(&row)
                    .execute(conn)
                    .await?;
                diesel::update(listings::table.filter(listings::id.eq(listing_id)))
                    .set(listings::updated_at.eq(diesel::dsl::now))
                    .execute(conn)
                    .await?;
                Ok::<_, diesel::result::Error>(true)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_error)
    }

    async fn detach(
        &self,
        listing: &ListingId,
        review: &ReviewId,
    ) -> Result<bool, ReviewPersistenceError> {
        let listing_id = *listing.as_uuid();
        let review_id = *review.as_uuid();
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, ReviewPersistenceError::connection))?;
        conn.transaction(|conn| {
            async move {
                let removed = diesel::delete(
                    reviews::table
                        .filter(reviews::id.eq(review_id))
                        .filter(reviews::listing_id.eq(listing_id)),
                )
                .execute(conn)
                .await?;
                if removed > 0 {
                    diesel::update(listings::table.filter(listings::id.eq(listing_id)))
                        .set(listings::updated_at.eq(diesel::dsl::now))
                        .execute(conn)
                        .await?;
                }
                Ok::<_, diesel::result::Error>(removed > 0)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_error)
    }
}
