//! PostgreSQL-backed `ListingRepository` implementation using Diesel ORM.
//!
//! A listing's review set is not stored on the listing row; it is the set of
//! `reviews` rows pointing at it, ordered by creation time. Deleting a
//! listing removes those rows and the listing in one transaction.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{ListingPersistenceError, ListingRepository};
use crate::domain::{CascadePlan, Listing, ListingDetail, ListingId, ReviewDetail};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{ListingChangeset, ListingRow, NewListingRow, ReviewRow, UserRow};
use super::pool::DbPool;
use super::schema::{listings, reviews, users};

/// Diesel-backed implementation of the `ListingRepository` port.
#[derive(Clone)]
pub struct DieselListingRepository {
    pool: DbPool,
}

impl DieselListingRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn connection(
        &self,
    ) -> Result<
        diesel_async::pooled_connection::bb8::PooledConnection<'_, AsyncPgConnection>,
        ListingPersistenceError,
    > {
        self.pool
            .get()
            .await
            .map_err(|err| map_pool_error(err, ListingPersistenceError::connection))
    }

    /// Remove every review and listing, then insert `seed`, as one
    /// transaction. Returns the number of listings written.
    pub async fn replace_all(&self, seed: &[Listing]) -> Result<usize, ListingPersistenceError> {
        let rows = seed
            .iter()
            .map(NewListingRow::from_listing)
            .collect::<Result<Vec<_>, _>>()
            .map_err(corrupt)?;
        let mut conn = self.connection().await?;
        conn.transaction(|conn| {
            async move {
                diesel::delete(reviews::table).execute(conn).await?;
                diesel::delete(listings::table).execute(conn).await?;
                diesel::insert_into(listings::table)
                    .values(&rows)
                    .execute(conn)
                    .await
            }
            .scope_boxed()
        })
        .await
        .map_err(map_error)
    }
}

fn map_error(error: diesel::result::Error) -> ListingPersistenceError {
    map_diesel_error(
        error,
        ListingPersistenceError::query,
        ListingPersistenceError::connection,
    )
}

fn corrupt(message: String) -> ListingPersistenceError {
    ListingPersistenceError::corrupt(message)
}

async fn review_ids_for(
    conn: &mut AsyncPgConnection,
    listing_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<Uuid>>, diesel::result::Error> {
    let pairs: Vec<(Uuid, Uuid)> = reviews::table
        .filter(reviews::listing_id.eq_any(listing_ids))
        .order((reviews::created_at.asc(), reviews::id.asc()))
        .select((reviews::listing_id, reviews::id))
        .load(conn)
        .await?;
    let mut grouped: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for (listing_id, review_id) in pairs {
        grouped.entry(listing_id).or_default().push(review_id);
    }
    Ok(grouped)
}

#[async_trait]
impl ListingRepository for DieselListingRepository {
    async fn list(&self) -> Result<Vec<Listing>, ListingPersistenceError> {
        let mut conn = self.connection().await?;
        let rows: Vec<ListingRow> = listings::table
            .order((listings::created_at.asc(), listings::id.asc()))
            .select(ListingRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_error)?;
        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let mut review_ids = review_ids_for(&mut conn, &ids).await.map_err(map_error)?;
        rows.into_iter()
            .map(|row| {
                let reviews = review_ids.remove(&row.id).unwrap_or_default();
                row.into_listing(reviews).map_err(corrupt)
            })
            .collect()
    }

    async fn find(&self, id: &ListingId) -> Result<Option<Listing>, ListingPersistenceError> {
        let mut conn = self.connection().await?;
        let Some(row) = listings::table
            .filter(listings::id.eq(id.as_uuid()))
            .select(ListingRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_error)?
        else {
            return Ok(None);
        };
        let mut review_ids = review_ids_for(&mut conn, &[row.id])
            .await
            .map_err(map_error)?;
        let reviews = review_ids.remove(&row.id).unwrap_or_default();
        row.into_listing(reviews).map(Some).map_err(corrupt)
    }

    async fn find_detail(
        &self,
        id: &ListingId,
    ) -> Result<Option<ListingDetail>, ListingPersistenceError> {
        let mut conn = self.connection().await?;
        let Some((row, author)) = listings::table
            .inner_join(users::table)
            .filter(listings::id.eq(id.as_uuid()))
            .select((ListingRow::as_select(), UserRow::as_select()))
            .first::<(ListingRow, UserRow)>(&mut conn)
            .await
            .optional()
            .map_err(map_error)?
        else {
            return Ok(None);
        };
        let review_rows: Vec<(ReviewRow, UserRow)> = reviews::table
            .inner_join(users::table)
            .filter(reviews::listing_id.eq(id.as_uuid()))
            .order((reviews::created_at.asc(), reviews::id.asc()))
            .select((ReviewRow::as_select(), UserRow::as_select()))
            .load(&mut conn)
            .await
            .map_err(map_error)?;

        let mut reviews = Vec::with_capacity(review_rows.len());
        for (review, review_author) in review_rows {
            reviews.push(ReviewDetail {
                review: review.into_review().map_err(corrupt)?,
                author: review_author.into_user().map_err(corrupt)?,
            });
        }
        let review_ids = reviews
            .iter()
            .map(|detail| *detail.review.id().as_uuid())
            .collect();
        Ok(Some(ListingDetail {
            listing: row.into_listing(review_ids).map_err(corrupt)?,
            author: author.into_user().map_err(corrupt)?,
            reviews,
        }))
    }

    async fn insert(&self, listing: &Listing) -> Result<(), ListingPersistenceError> {
        let row = NewListingRow::from_listing(listing).map_err(corrupt)?;
        let mut conn = self.connection().await?;
        diesel::insert_into(listings::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_error)
    }

    async fn update(&self, listing: &Listing) -> Result<bool, ListingPersistenceError> {
        let changes = ListingChangeset::from_listing(listing).map_err(corrupt)?;
        let mut conn = self.connection().await?;
        let updated = diesel::update(listings::table.filter(listings::id.eq(listing.id().as_uuid())))
            .set((&changes, listings::updated_at.eq(diesel::dsl::now)))
            .execute(&mut conn)
            .await
            .map_err(map_error)?;
        Ok(updated > 0)
    }

    async fn delete_cascade(&self, plan: &CascadePlan) -> Result<bool, ListingPersistenceError> {
        let listing_id = *plan.listing().as_uuid();
        let planned: Vec<Uuid> = plan.reviews().iter().map(|id| *id.as_uuid()).collect();
        let mut conn = self.connection().await?;
        conn.transaction(|conn| {
            async move {
                // Rows added after the plan was taken still point at the
                // listing, so they are matched by `listing_id` as well.
                diesel::delete(
                    reviews::table.filter(
                        reviews::listing_id
                            .eq(listing_id)
                            .or(reviews::id.eq_any(&planned)),
                    ),
                )
                .execute(conn)
                .await?;
                let removed = diesel::delete(listings::table.filter(listings::id.eq(listing_id)))
                    .execute(conn)
                    .await?;
                Ok::<_, diesel::result::Error>(removed > 0)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_error)
    }
}
