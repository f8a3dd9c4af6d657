//! Listing pages and mutations.
//!
//! ```text
//! GET    /campgrounds
//! GET    /campgrounds/new
//! POST   /campgrounds
//! GET    /campgrounds/{id}
//! GET    /campgrounds/{id}/edit
//! PUT    /campgrounds/{id}
//! DELETE /campgrounds/{id}
//! ```
//!
//! Every mutation runs the same pipeline: session guard, form read, field
//! validation, then the listing service (which owns ownership checks,
//! geocoding and image hosting). Recoverable failures become a flash notice
//! plus redirect; the rest render the error page.

use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use tracing::debug;

use crate::domain::{ApiResult, Error, LISTING_NOT_FOUND_MESSAGE, ListingId, parse_listing};
use crate::inbound::http::error::{recover, redirect};
use crate::inbound::http::forms::read_submission;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::views::{self, Blank, EditView, IndexView, ShowView};

/// Notice after a listing is created.
pub const CREATED_MESSAGE: &str = "Successfully made a new campground!";
/// Notice after a listing is updated.
pub const UPDATED_MESSAGE: &str = "Campground successfully updated!";
/// Notice after a listing is deleted.
pub const DELETED_MESSAGE: &str = "Campground successfully deleted!";

const INDEX_PATH: &str = "/campgrounds";
const NEW_FORM_PATH: &str = "/campgrounds/new";

/// Canonical page for one listing.
pub fn listing_path(id: &ListingId) -> String {
    format!("{INDEX_PATH}/{id}")
}

/// Parse a path segment as a listing id; malformed ids are simply not found.
pub(crate) fn listing_id(raw: &str) -> Result<ListingId, Error> {
    ListingId::new(raw).map_err(|_| Error::not_found(LISTING_NOT_FOUND_MESSAGE))
}

/// Where a forbidden request is sent back to.
pub(crate) fn resource_path(raw: &str) -> String {
    listing_id(raw).map_or_else(|_| INDEX_PATH.to_owned(), |id| listing_path(&id))
}

#[get("/campgrounds")]
pub async fn index(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let listings = state.listings.index().await?;
    views::page(
        &session,
        &state,
        "campgrounds/index.html",
        IndexView::new(&listings),
    )
    .await
}

#[get("/campgrounds/new")]
pub async fn new_form(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let outcome: ApiResult<HttpResponse> = async {
        session
            .require_identity(state.login.as_ref(), req.path())
            .await?;
        views::page(&session, &state, "campgrounds/new.html", Blank {}).await
    }
    .await;
    outcome.or_else(|err| recover(&session, err, INDEX_PATH))
}

#[post("/campgrounds")]
pub async fn create(
    req: HttpRequest,
    body: web::Payload,
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let outcome: ApiResult<HttpResponse> = async {
        let identity = session
            .require_identity(state.login.as_ref(), NEW_FORM_PATH)
            .await?;
        let submission = read_submission(&req, body).await?;
        let form = parse_listing(&submission.payload)?;
        let listing = state
            .listings
            .create(&identity, form, submission.uploads)
            .await?;
        session.flash_success(CREATED_MESSAGE)?;
        Ok(redirect(&listing_path(listing.id())))
    }
    .await;
    outcome.or_else(|err| recover(&session, err, INDEX_PATH))
}

#[get("/campgrounds/{id}")]
pub async fn show(
    path: web::Path<String>,
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let outcome: ApiResult<HttpResponse> = async {
        let id = listing_id(&path)?;
        let detail = state.listings.read(&id).await?;
        views::page(
            &session,
            &state,
            "campgrounds/show.html",
            ShowView::from(&detail),
        )
        .await
    }
    .await;
    outcome.or_else(|err| recover(&session, err, INDEX_PATH))
}

#[get("/campgrounds/{id}/edit")]
pub async fn edit_form(
    req: HttpRequest,
    path: web::Path<String>,
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let resource = resource_path(&path);
    let outcome: ApiResult<HttpResponse> = async {
        let identity = session
            .require_identity(state.login.as_ref(), req.path())
            .await?;
        let id = listing_id(&path)?;
        let listing = state.listings.edit(&identity, &id).await?;
        views::page(
            &session,
            &state,
            "campgrounds/edit.html",
            EditView::from(&listing),
        )
        .await
    }
    .await;
    outcome.or_else(|err| recover(&session, err, &resource))
}

#[put("/campgrounds/{id}")]
pub async fn update(
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
        let form = parse_listing(&submission.payload)?;
        debug!(listing_id = %id, uploads = submission.uploads.len(), "updating listing");
        let listing = state
            .listings
            .update(&identity, &id, form, submission.uploads)
            .await?;
        session.flash_success(UPDATED_MESSAGE)?;
        Ok(redirect(&listing_path(listing.id())))
    }
    .await;
    outcome.or_else(|err| recover(&session, err, &resource))
}

#[delete("/campgrounds/{id}")]
pub async fn destroy(
    path: web::Path<String>,
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let resource = resource_path(&path);
    let outcome: ApiResult<HttpResponse> = async {
        let identity = session
            .require_identity(state.login.as_ref(), &resource)
            .await?;
        let id = listing_id(&path)?;
        state.listings.delete(&identity, &id).await?;
        session.flash_success(DELETED_MESSAGE)?;
        Ok(redirect(INDEX_PATH))
    }
    .await;
    outcome.or_else(|err| recover(&session, err, &resource))
}

#[cfg(test)]
#[path = "campgrounds_tests.rs"]
mod tests;
