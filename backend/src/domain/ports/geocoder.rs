//! Port for forward geocoding of free-text locations.
use async_trait::async_trait;

use crate::domain::GeoPoint;

use super::define_port_error;

define_port_error! {
    /// Errors raised by geocoding adapters.
    pub enum GeocoderError {
        /// Request could not be sent or timed out.
        Transport { message: String } => "geocoder transport failed: {message}",
        /// Provider answered with a non-success status.
        Status { status: u16, message: String } => "geocoder returned status {status}: {message}",
        /// Response body did not match the expected shape.
        Decode { message: String } => "geocoder response could not be decoded: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve `query` to its best match; `None` when nothing matched.
    async fn forward(&self, query: &str) -> Result<Option<GeoPoint>, GeocoderError>;
}

/// Geocoder used when no provider token is configured.
///
/// Resolves every non-blank query to the same point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixtureGeocoder {
    longitude: f64,
    latitude: f64,
}

impl FixtureGeocoder {
    /// Resolve every query to `longitude`/`latitude`.
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }
}

impl Default for FixtureGeocoder {
    /// Yosemite Valley.
    fn default() -> Self {
        Self::new(-119.5383, 37.8651)
    }
}

#[async_trait]
impl Geocoder for FixtureGeocoder {
    async fn forward(&self, query: &str) -> Result<Option<GeoPoint>, GeocoderError> {
        if query.trim().is_empty() {
            return Ok(None);
        }
        GeoPoint::new(self.longitude, self.latitude)
            .map(Some)
            .map_err(|err| GeocoderError::decode(err.to_string()))
    }
}
