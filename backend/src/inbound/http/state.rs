//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{ListingLifecycle, LoginService, RegistrationService, ReviewLifecycle};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub listings: Arc<dyn ListingLifecycle>,
    pub reviews: Arc<dyn ReviewLifecycle>,
    pub login: Arc<dyn LoginService>,
    pub registration: Arc<dyn RegistrationService>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub listings: Arc<dyn ListingLifecycle>,
    pub reviews: Arc<dyn ReviewLifecycle>,
    pub login: Arc<dyn LoginService>,
    pub registration: Arc<dyn RegistrationService>,
    /// Public map token handed to the browser; maps are hidden without one.
    pub map_token: Option<String>,
}

impl HttpState {
    /// Construct state from a ports bundle.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use campgrounds::domain::ports::{FixtureGeocoder, FixtureImageHost};
    /// use campgrounds::domain::{AccountService, ListingService, ReviewService};
    /// use campgrounds::inbound::http::state::{HttpState, HttpStatePorts};
    /// use campgrounds::outbound::memory::InMemoryEntityStore;
    /// use campgrounds::outbound::password_hashing::Argon2PasswordHasher;
    ///
    /// let store = Arc::new(InMemoryEntityStore::new());
    /// let accounts = Arc::new(AccountService::new(
    ///     store.clone(),
    ///     Arc::new(Argon2PasswordHasher::default()),
    /// ));
    /// let ports = HttpStatePorts {
    ///     listings: Arc::new(ListingService::new(
    ///         store.clone(),
    ///         Arc::new(FixtureGeocoder::default()),
    ///         Arc::new(FixtureImageHost),
    ///     )),
    ///     reviews: Arc::new(ReviewService::new(store)),
    ///     login: accounts.clone(),
    ///     registration: accounts,
    /// };
    /// let state = HttpState::new(ports, None);
    /// assert!(state.map_token.is_none());
    /// ```
    pub fn new(ports: HttpStatePorts, map_token: Option<String>) -> Self {
        let HttpStatePorts {
            listings,
            reviews,
            login,
            registration,
        } = ports;
        Self {
            listings,
            reviews,
            login,
            registration,
            map_token,
        }
    }
}
