//! Application settings and the assembled server configuration.

use std::net::SocketAddr;
use std::time::Duration;

use actix_web::cookie::{Key, SameSite};
use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::outbound::persistence::DbPool;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_OUTBOUND_TIMEOUT_SECS: u64 = 10;
const DEFAULT_POOL_MAX_SIZE: u32 = 10;

/// Settings loaded from `CAMPGROUNDS_*` environment variables, configuration
/// files and command-line flags.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CAMPGROUNDS")]
pub struct AppSettings {
    /// Socket address to listen on.
    #[ortho_config(default = String::from(DEFAULT_BIND_ADDR))]
    pub bind_addr: String,
    /// PostgreSQL connection string. Without it, listings live in memory.
    pub database_url: Option<String>,
    /// Maximum pooled database connections.
    #[ortho_config(default = DEFAULT_POOL_MAX_SIZE)]
    pub pool_max_size: u32,
    /// Mapbox access token used for geocoding and the browser maps.
    pub mapbox_token: Option<String>,
    /// Override for the Mapbox geocoding endpoint.
    pub mapbox_endpoint: Option<String>,
    pub cloudinary_cloud_name: Option<String>,
    pub cloudinary_api_key: Option<String>,
    pub cloudinary_api_secret: Option<String>,
    /// Override for the Cloudinary API base.
    pub cloudinary_endpoint: Option<String>,
    /// Request timeout for geocoding and image hosting, in seconds.
    #[ortho_config(default = DEFAULT_OUTBOUND_TIMEOUT_SECS)]
    pub outbound_timeout_secs: u64,
}

impl AppSettings {
    /// Parse the configured bind address (`0.0.0.0:8080` unless overridden).
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the address does not parse.
    pub fn bind_addr(&self) -> std::io::Result<SocketAddr> {
        let raw = self.bind_addr.as_str();
        raw.parse().map_err(|err| {
            std::io::Error::other(format!("invalid bind address {raw:?}: {err}"))
        })
    }

    /// Request timeout for provider calls.
    pub fn outbound_timeout(&self) -> Duration {
        Duration::from_secs(self.outbound_timeout_secs)
    }

    /// Upper bound on pooled database connections.
    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) settings: AppSettings,
}

impl ServerConfig {
    /// Construct a server configuration from session and listener settings.
    #[must_use]
    pub fn new(
        key: Key,
        cookie_secure: bool,
        same_site: SameSite,
        bind_addr: SocketAddr,
        settings: AppSettings,
    ) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            db_pool: None,
            settings,
        }
    }

    /// Attach a database connection pool for persistence adapters.
    ///
    /// When provided, the server stores users, listings and reviews in
    /// PostgreSQL instead of process memory.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
