//! Review mutations nested under a listing.
//!
//! ```text
//! POST   /campgrounds/{id}/reviews
//! DELETE /campgrounds/{id}/reviews/{review_id}
//! ```

use actix_web::{HttpRequest, HttpResponse, delete, post, web};

use crate::domain::{ApiResult, Error, REVIEW_NOT_FOUND_MESSAGE, ReviewId, parse_review};
use crate::inbound::http::campgrounds::{listing_id, listing_path, resource_path};
use crate::inbound::http::error::{recover, redirect};
use crate::inbound::http::forms::read_submission;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Notice after a review is posted.
pub const REVIEW_CREATED_MESSAGE: &str = "Created new review!";
/// Notice after a review is removed.
pub const REVIEW_DELETED_MESSAGE: &str = "Successfully deleted review";

fn review_id(raw: &str) -> Result<ReviewId, Error> {
    ReviewId::new(raw).map_err(|_| Error::not_found(REVIEW_NOT_FOUND_MESSAGE))
}

#[post("/campgrounds/{id}/reviews")]
pub async fn create(
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Payload,
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let resource = resource_path(&path);
    let outcome: ApiResult<HttpResponse> = async {
        let identity = session
            .require_identity(state.login.as_ref(), &resource)
            .await?;
        let id = listing_id(&path)?;
        let submission = read_submission(&req, body).await?;
        let draft = parse_review(&submission.payload)?;
        state.reviews.create(&identity, &id, draft).await?;
        session.flash_success(REVIEW_CREATED_MESSAGE)?;
        Ok(redirect(&listing_path(&id)))
    }
    .await;
    outcome.or_else(|err| recover(&session, err, &resource))
}

#[delete("/campgrounds/{id}/reviews/{review_id}")]
pub async fn destroy(
    path: web::Path<(String, String)>,
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let (raw_listing, raw_review) = path.into_inner();
    let resource = resource_path(&raw_listing);
    let outcome: ApiResult<HttpResponse> = async {
        let identity = session
            .require_identity(state.login.as_ref(), &resource)
            .await?;
        let id = listing_id(&raw_listing)?;
        let review = review_id(&raw_review)?;
        state.reviews.delete(&identity, &id, &review).await?;
        session.flash_success(REVIEW_DELETED_MESSAGE)?;
        Ok(redirect(&listing_path(&id)))
    }
    .await;
    outcome.or_else(|err| recover(&session, err, &resource))
}

#[cfg(test)]
#[path = "reviews_tests.rs"]
mod tests;
