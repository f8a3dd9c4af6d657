//! Shared helpers for end-to-end tests.
//!
//! Every test crate under `backend/tests/` drives the real application
//! (`build_app`) over an in-memory store, so handlers, middleware, templates
//! and domain services run exactly as they do in production.
#![allow(dead_code, reason = "each test crate uses a different subset")]

use std::sync::{Arc, Mutex};

use actix_web::cookie::{Cookie, Key, SameSite};
use actix_web::dev::ServiceResponse;
use actix_web::http::header::{CONTENT_TYPE, LOCATION};
use actix_web::test::TestRequest;
use actix_web::web;
use async_trait::async_trait;
use campgrounds::domain::ports::{
    FixtureGeocoder, FixtureImageHost, Geocoder, GeocoderError, ImageHost, ImageHostError,
    ImageUpload,
};
use campgrounds::domain::{AccountService, GeoPoint, Image, ListingService, ReviewService};
use campgrounds::inbound::http::state::{HttpState, HttpStatePorts};
use campgrounds::outbound::memory::InMemoryEntityStore;
use campgrounds::outbound::password_hashing::{Argon2Params, Argon2PasswordHasher};
use campgrounds::server::AppDependencies;

/// Location the test geocoder cannot resolve.
pub const UNKNOWN_PLACE: &str = "Atlantis";

const BOUNDARY: &str = "campgroundsTestBoundary";

/// Geocoder that resolves everything except [`UNKNOWN_PLACE`].
pub struct AtlasGeocoder;

#[async_trait]
impl Geocoder for AtlasGeocoder {
    async fn forward(&self, query: &str) -> Result<Option<GeoPoint>, GeocoderError> {
        if query.eq_ignore_ascii_case(UNKNOWN_PLACE) {
            return Ok(None);
        }
        FixtureGeocoder::default().forward(query).await
    }
}

/// Image host that remembers which assets were destroyed.
#[derive(Default)]
pub struct RecordingImageHost {
    destroyed: Mutex<Vec<String>>,
}

impl RecordingImageHost {
    /// Filenames passed to `destroy`, in call order.
    pub fn destroyed(&self) -> Vec<String> {
        self.destroyed
            .lock()
            .map(|names| names.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ImageHost for RecordingImageHost {
    async fn upload(&self, upload: &ImageUpload) -> Result<Image, ImageHostError> {
        FixtureImageHost.upload(upload).await
    }

    async fn destroy(&self, filename: &str) -> Result<(), ImageHostError> {
        if let Ok(mut names) = self.destroyed.lock() {
            names.push(filename.to_owned());
        }
        Ok(())
    }
}

/// One application instance and the collaborators tests inspect.
pub struct Harness {
    pub store: Arc<InMemoryEntityStore>,
    pub images: Arc<RecordingImageHost>,
    pub deps: AppDependencies,
}

impl Harness {
    /// Fresh store, cheap password hashing and test providers.
    pub fn new() -> Self {
        let store = Arc::new(InMemoryEntityStore::new());
        let images = Arc::new(RecordingImageHost::default());
        let hasher = Argon2PasswordHasher::new(Argon2Params {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        });
        let accounts = Arc::new(AccountService::new(store.clone(), Arc::new(hasher)));
        let ports = HttpStatePorts {
            listings: Arc::new(ListingService::new(
                store.clone(),
                Arc::new(AtlasGeocoder),
                images.clone(),
            )),
            reviews: Arc::new(ReviewService::new(store.clone())),
            login: accounts.clone(),
            registration: accounts,
        };
        let deps = AppDependencies {
            http_state: web::Data::new(HttpState::new(ports, None)),
            key: Key::generate(),
            cookie_secure: false,
            same_site: SameSite::Lax,
        };
        Self {
            store,
            images,
            deps,
        }
    }
}

/// Session cookie carried between requests, like a browser would.
#[derive(Default)]
pub struct Browser {
    session: Option<Cookie<'static>>,
}

impl Browser {
    /// Attach the current session cookie, if any.
    pub fn prepare(&self, req: TestRequest) -> TestRequest {
        match &self.session {
            Some(cookie) => req.cookie(cookie.clone()),
            None => req,
        }
    }

    /// Keep the session cookie a response sets.
    pub fn remember(&mut self, res: &ServiceResponse) {
        if let Some(cookie) = res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
        {
            self.session = Some(cookie.into_owned());
        }
    }
}

/// Target of a redirect response.
pub fn location(res: &ServiceResponse) -> String {
    res.headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .expect("location header")
        .to_owned()
}

/// Listing form fields.
pub fn listing_fields(title: &str, location: &str, price: &str) -> Vec<(String, String)> {
    vec![
        ("campground[title]".to_owned(), title.to_owned()),
        ("campground[location]".to_owned(), location.to_owned()),
        ("campground[price]".to_owned(), price.to_owned()),
        (
            "campground[description]".to_owned(),
            "Quiet woods beside a creek".to_owned(),
        ),
    ]
}

/// Encode text fields and `image` file parts as `multipart/form-data`.
pub fn multipart(req: TestRequest, fields: &[(String, String)], files: &[&str]) -> TestRequest {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    for file_name in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; \
                 filename=\"{file_name}\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(&[0x89, b'P', b'N', b'G']);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    req.insert_header((
        CONTENT_TYPE,
        format!("multipart/form-data; boundary={BOUNDARY}"),
    ))
    .set_payload(body)
}

/// Response body as text.
pub async fn body_text(res: ServiceResponse) -> String {
    let bytes = actix_web::test::read_body(res).await;
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}
