//! Builders for HTTP state ports from configured adapters.
//!
//! Each collaborator falls back to an in-process implementation when its
//! configuration is missing, so a bare `cargo run` serves a working site.

use std::sync::Arc;

use actix_web::web;
use tracing::warn;
use url::Url;

use crate::domain::ports::{
    FixtureGeocoder, FixtureImageHost, Geocoder, ImageHost, ListingRepository, ReviewRepository,
    UserRepository,
};
use crate::domain::{AccountService, ListingService, ReviewService};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::cloudinary::{
    CloudinaryCredentials, CloudinaryImageHost, DEFAULT_CLOUDINARY_ENDPOINT,
};
use crate::outbound::mapbox::{DEFAULT_MAPBOX_ENDPOINT, MapboxGeocoder};
use crate::outbound::memory::InMemoryEntityStore;
use crate::outbound::password_hashing::Argon2PasswordHasher;
use crate::outbound::persistence::{
    DieselListingRepository, DieselReviewRepository, DieselUserRepository,
};

use super::ServerConfig;
use super::config::AppSettings;

/// Remote providers shared by the listing service.
pub(crate) struct Providers {
    pub(crate) geocoder: Arc<dyn Geocoder>,
    pub(crate) images: Arc<dyn ImageHost>,
}

fn parse_endpoint(raw: Option<&str>, default: &str) -> std::io::Result<Url> {
    let raw = raw.unwrap_or(default);
    Url::parse(raw).map_err(|err| std::io::Error::other(format!("invalid endpoint {raw:?}: {err}")))
}

fn build_geocoder(settings: &AppSettings) -> std::io::Result<Arc<dyn Geocoder>> {
    let Some(token) = settings.mapbox_token.as_deref() else {
        warn!("CAMPGROUNDS_MAPBOX_TOKEN unset; geocoding every location to a fixed point");
        return Ok(Arc::new(FixtureGeocoder::default()));
    };
    let endpoint = parse_endpoint(settings.mapbox_endpoint.as_deref(), DEFAULT_MAPBOX_ENDPOINT)?;
    let geocoder = MapboxGeocoder::new(endpoint, token, settings.outbound_timeout())
        .map_err(|err| std::io::Error::other(format!("geocoder client: {err}")))?;
    Ok(Arc::new(geocoder))
}

fn cloudinary_credentials(settings: &AppSettings) -> Option<CloudinaryCredentials> {
    match (
        settings.cloudinary_cloud_name.as_deref(),
        settings.cloudinary_api_key.as_deref(),
        settings.cloudinary_api_secret.as_deref(),
    ) {
        (Some(cloud_name), Some(api_key), Some(api_secret)) => Some(CloudinaryCredentials {
            cloud_name: cloud_name.to_owned(),
            api_key: api_key.to_owned(),
            api_secret: api_secret.to_owned(),
        }),
        _ => None,
    }
}

fn build_image_host(settings: &AppSettings) -> std::io::Result<Arc<dyn ImageHost>> {
    let Some(credentials) = cloudinary_credentials(settings) else {
        warn!("Cloudinary credentials incomplete; uploads get placeholder URLs");
        return Ok(Arc::new(FixtureImageHost));
    };
    let endpoint = parse_endpoint(
        settings.cloudinary_endpoint.as_deref(),
        DEFAULT_CLOUDINARY_ENDPOINT,
    )?;
    let host = CloudinaryImageHost::new(endpoint, credentials, settings.outbound_timeout())
        .map_err(|err| std::io::Error::other(format!("image host client: {err}")))?;
    Ok(Arc::new(host))
}

pub(crate) fn build_providers(settings: &AppSettings) -> std::io::Result<Providers> {
    Ok(Providers {
        geocoder: build_geocoder(settings)?,
        images: build_image_host(settings)?,
    })
}

/// Wire domain services over one set of repositories.
pub(crate) fn wire_ports<L, R, U>(
    listings: Arc<L>,
    reviews: Arc<R>,
    users: Arc<U>,
    providers: Providers,
) -> HttpStatePorts
where
    L: ListingRepository + 'static,
    R: ReviewRepository + 'static,
    U: UserRepository + 'static,
{
    let accounts = Arc::new(AccountService::new(
        users,
        Arc::new(Argon2PasswordHasher::default()),
    ));
    HttpStatePorts {
        listings: Arc::new(ListingService::new(
            listings,
            providers.geocoder,
            providers.images,
        )),
        reviews: Arc::new(ReviewService::new(reviews)),
        login: accounts.clone(),
        registration: accounts,
    }
}

/// Build the shared HTTP state from configured adapters and fallbacks.
///
/// # Errors
///
/// Returns an I/O error when a configured provider cannot be constructed.
pub(crate) fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let providers = build_providers(&config.settings)?;
    let ports = match &config.db_pool {
        Some(pool) => wire_ports(
            Arc::new(DieselListingRepository::new(pool.clone())),
            Arc::new(DieselReviewRepository::new(pool.clone())),
            Arc::new(DieselUserRepository::new(pool.clone())),
            providers,
        ),
        None => {
            warn!("no database configured; users, listings and reviews live in memory");
            let store = Arc::new(InMemoryEntityStore::new());
            wire_ports(store.clone(), store.clone(), store, providers)
        }
    };
    Ok(web::Data::new(HttpState::new(
        ports,
        config.settings.mapbox_token.clone(),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn settings() -> AppSettings {
        AppSettings {
            bind_addr: "127.0.0.1:0".to_owned(),
            database_url: None,
            pool_max_size: 1,
            mapbox_token: None,
            mapbox_endpoint: None,
            cloudinary_cloud_name: None,
            cloudinary_api_key: None,
            cloudinary_api_secret: None,
            cloudinary_endpoint: None,
            outbound_timeout_secs: 1,
        }
    }

    #[rstest]
    fn partial_cloudinary_credentials_fall_back() {
        let mut settings = settings();
        settings.cloudinary_cloud_name = Some("demo".to_owned());
        settings.cloudinary_api_key = Some("key".to_owned());

        assert!(cloudinary_credentials(&settings).is_none());

        settings.cloudinary_api_secret = Some("secret".to_owned());
        let credentials = cloudinary_credentials(&settings).expect("complete credentials");
        assert_eq!(credentials.cloud_name, "demo");
    }

    #[rstest]
    fn malformed_endpoint_is_rejected() {
        let mut settings = settings();
        settings.mapbox_token = Some("pk.test".to_owned());
        settings.mapbox_endpoint = Some("not a url".to_owned());

        assert!(build_geocoder(&settings).is_err());
    }

    #[rstest]
    #[tokio::test]
    async fn missing_token_geocodes_to_the_fixture_point() {
        let geocoder = build_geocoder(&settings()).expect("fallback geocoder");
        let point = geocoder
            .forward("Yosemite")
            .await
            .expect("fixture lookup")
            .expect("fixture point");

        assert!((point.longitude() + 119.5383).abs() < f64::EPSILON);
    }
}
