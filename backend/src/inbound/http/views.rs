//! Server-side HTML rendering.
//!
//! Templates are compiled once into a process-wide `minijinja` environment.
//! Every page receives the navigation identity, the pending flash notices and
//! the public map token alongside its own view model.

use std::sync::LazyLock;

use actix_web::HttpResponse;
use actix_web::http::header::ContentType;
use minijinja::Environment;
use serde::Serialize;
use tracing::error;

use crate::domain::{
    ApiResult, Error, GeoPoint, Identity, Image, Listing, ListingDetail, ReviewDetail,
    popup_markup, thumbnail_url,
};

use super::session::{Flash, SessionContext};
use super::state::HttpState;

const TEMPLATE_SOURCES: [(&str, &str); 9] = [
    ("layout.html", include_str!("../../../templates/layout.html")),
    ("home.html", include_str!("../../../templates/home.html")),
    ("error.html", include_str!("../../../templates/error.html")),
    (
        "campgrounds/index.html",
        include_str!("../../../templates/campgrounds/index.html"),
    ),
    (
        "campgrounds/new.html",
        include_str!("../../../templates/campgrounds/new.html"),
    ),
    (
        "campgrounds/show.html",
        include_str!("../../../templates/campgrounds/show.html"),
    ),
    (
        "campgrounds/edit.html",
        include_str!("../../../templates/campgrounds/edit.html"),
    ),
    (
        "users/register.html",
        include_str!("../../../templates/users/register.html"),
    ),
    (
        "users/login.html",
        include_str!("../../../templates/users/login.html"),
    ),
];

static TEMPLATES: LazyLock<Environment<'static>> = LazyLock::new(|| {
    let mut env = Environment::new();
    for (name, source) in TEMPLATE_SOURCES {
        if let Err(err) = env.add_template(name, source) {
            error!(template = name, error = %err, "template failed to compile");
        }
    }
    env
});

/// Render a named template to a string.
pub(crate) fn render(name: &str, ctx: impl Serialize) -> Result<String, minijinja::Error> {
    TEMPLATES.get_template(name)?.render(ctx)
}

#[derive(Debug, Serialize)]
struct CurrentUser {
    id: String,
    username: String,
}

impl From<&Identity> for CurrentUser {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.user_id().to_string(),
            username: identity.username().to_string(),
        }
    }
}

#[derive(Serialize)]
struct Page<'a, T> {
    current_user: Option<CurrentUser>,
    success: &'a [String],
    error: &'a [String],
    map_token: Option<&'a str>,
    #[serde(flatten)]
    data: T,
}

/// Render a full page, draining the session's flash notices into it.
pub(crate) async fn page<T: Serialize>(
    session: &SessionContext,
    state: &HttpState,
    template: &str,
    data: T,
) -> ApiResult<HttpResponse> {
    let identity = session.identity(state.login.as_ref()).await?;
    let Flash { success, error } = session.take_flash()?;
    let body = render(
        template,
        Page {
            current_user: identity.as_ref().map(CurrentUser::from),
            success: &success,
            error: &error,
            map_token: state.map_token.as_deref(),
            data,
        },
    )
    .map_err(|err| Error::internal(format!("failed to render {template}: {err}")))?;
    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(body))
}

/// View model for pages that only need the shared layout context.
#[derive(Debug, Serialize)]
pub(crate) struct Blank {}

#[derive(Debug, Serialize)]
pub(crate) struct GeometryView {
    #[serde(rename = "type")]
    kind: &'static str,
    coordinates: [f64; 2],
}

impl From<&GeoPoint> for GeometryView {
    fn from(point: &GeoPoint) -> Self {
        Self {
            kind: "Point",
            coordinates: point.coordinates(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ImageView<'a> {
    url: &'a str,
    filename: &'a str,
    thumbnail: String,
}

impl<'a> From<&'a Image> for ImageView<'a> {
    fn from(image: &'a Image) -> Self {
        Self {
            url: &image.url,
            filename: &image.filename,
            thumbnail: thumbnail_url(image),
        }
    }
}

/// A listing as templates see it.
#[derive(Debug, Serialize)]
pub(crate) struct ListingView<'a> {
    id: String,
    title: &'a str,
    location: &'a str,
    price: f64,
    description: &'a str,
    images: Vec<ImageView<'a>>,
    geometry: GeometryView,
    author_id: String,
}

impl<'a> From<&'a Listing> for ListingView<'a> {
    fn from(listing: &'a Listing) -> Self {
        Self {
            id: listing.id().to_string(),
            title: listing.title(),
            location: listing.location(),
            price: listing.price().value(),
            description: listing.description(),
            images: listing.images().iter().map(ImageView::from).collect(),
            geometry: GeometryView::from(listing.geometry()),
            author_id: listing.author().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FeatureProperties<'a> {
    id: String,
    title: &'a str,
    pop_up_markup: String,
}

#[derive(Debug, Serialize)]
struct Feature<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    geometry: GeometryView,
    properties: FeatureProperties<'a>,
}

/// GeoJSON `FeatureCollection` for the cluster map on the index page.
#[derive(Debug, Serialize)]
pub(crate) struct FeatureCollection<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    features: Vec<Feature<'a>>,
}

impl<'a> FeatureCollection<'a> {
    pub(crate) fn from_listings(listings: &'a [Listing]) -> Self {
        let features = listings
            .iter()
            .map(|listing| Feature {
                kind: "Feature",
                geometry: GeometryView::from(listing.geometry()),
                properties: FeatureProperties {
                    id: listing.id().to_string(),
                    title: listing.title(),
                    pop_up_markup: popup_markup(listing),
                },
            })
            .collect();
        Self {
            kind: "FeatureCollection",
            features,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct IndexView<'a> {
    campgrounds: Vec<ListingView<'a>>,
    geojson: FeatureCollection<'a>,
}

impl<'a> IndexView<'a> {
    pub(crate) fn new(listings: &'a [Listing]) -> Self {
        Self {
            campgrounds: listings.iter().map(ListingView::from).collect(),
            geojson: FeatureCollection::from_listings(listings),
        }
    }
}

#[derive(Debug, Serialize)]
struct ReviewView<'a> {
    id: String,
    body: &'a str,
    rating: u8,
    author_id: String,
    author_username: &'a str,
}

impl<'a> From<&'a ReviewDetail> for ReviewView<'a> {
    fn from(detail: &'a ReviewDetail) -> Self {
        Self {
            id: detail.review.id().to_string(),
            body: detail.review.body(),
            rating: detail.review.rating().value(),
            author_id: detail.author.id().to_string(),
            author_username: detail.author.username().as_ref(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ShowView<'a> {
    campground: ListingView<'a>,
    author_username: &'a str,
    reviews: Vec<ReviewView<'a>>,
}

impl<'a> From<&'a ListingDetail> for ShowView<'a> {
    fn from(detail: &'a ListingDetail) -> Self {
        Self {
            campground: ListingView::from(&detail.listing),
            author_username: detail.author.username().as_ref(),
            reviews: detail.reviews.iter().map(ReviewView::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct EditView<'a> {
    campground: ListingView<'a>,
}

impl<'a> From<&'a Listing> for EditView<'a> {
    fn from(listing: &'a Listing) -> Self {
        Self {
            campground: ListingView::from(listing),
        }
    }
}
