//! Reqwest-backed Mapbox forward geocoder.
//!
//! This adapter owns transport details only: URL building, timeout and HTTP
//! error mapping, and JSON decoding into a domain point.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::debug;

use super::dto::FeatureCollectionDto;
use crate::domain::GeoPoint;
use crate::domain::ports::{Geocoder, GeocoderError};
use crate::outbound::http_body::body_preview;

/// Public Mapbox places endpoint.
pub const DEFAULT_MAPBOX_ENDPOINT: &str = "https://api.mapbox.com/geocoding/v5/mapbox.places/";

/// Geocoder asking Mapbox for the single best match of a free-text query.
pub struct MapboxGeocoder {
    client: Client,
    endpoint: Url,
    access_token: String,
}

impl MapboxGeocoder {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        endpoint: Url,
        access_token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            access_token: access_token.into(),
        })
    }

    fn request_url(&self, query: &str) -> Result<Url, GeocoderError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|()| GeocoderError::transport("geocoder endpoint cannot be a base URL"))?
            .pop_if_empty()
            .push(&format!("{query}.json"));
        url.query_pairs_mut()
            .append_pair("access_token", &self.access_token)
            .append_pair("limit", "1");
        Ok(url)
    }
}

#[async_trait]
impl Geocoder for MapboxGeocoder {
    async fn forward(&self, query: &str) -> Result<Option<GeoPoint>, GeocoderError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(None);
        }
        let response = self
            .client
            .get(self.request_url(query)?)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        let point = parse_first_point(body.as_ref())?;
        debug!(matched = point.is_some(), "geocoder answered");
        Ok(point)
    }
}

fn parse_first_point(body: &[u8]) -> Result<Option<GeoPoint>, GeocoderError> {
    let decoded: FeatureCollectionDto = serde_json::from_slice(body).map_err(|error| {
        GeocoderError::decode(format!("invalid Mapbox JSON payload: {error}"))
    })?;
    decoded.into_first_point().map_err(GeocoderError::decode)
}

fn map_transport_error(error: reqwest::Error) -> GeocoderError {
    // Reqwest embeds the request URL, which carries the access token.
    GeocoderError::transport(error.without_url().to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> GeocoderError {
    GeocoderError::status(status.as_u16(), body_preview(body))
}

#[cfg(test)]
mod tests {
    //! Coverage for the non-network mapping helpers.

    use super::*;
    use rstest::rstest;

    fn geocoder() -> MapboxGeocoder {
        let endpoint = Url::parse(DEFAULT_MAPBOX_ENDPOINT).expect("endpoint");
        MapboxGeocoder::new(endpoint, "pk.test", Duration::from_secs(1)).expect("client")
    }

    #[test]
    fn request_url_escapes_query_and_limits_to_one_match() {
        let url = geocoder().request_url("Yosemite, CA").expect("url");

        assert_eq!(
            url.path(),
            "/geocoding/v5/mapbox.places/Yosemite,%20CA.json"
        );
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("limit".to_owned(), "1".to_owned())));
        assert!(pairs.contains(&("access_token".to_owned(), "pk.test".to_owned())));
    }

    #[test]
    fn first_feature_becomes_the_point() {
        let body = r#"{
            "type": "FeatureCollection",
            "features": [
                { "geometry": { "type": "Point", "coordinates": [-119.5383, 37.8651] } },
                { "geometry": { "type": "Point", "coordinates": [0.0, 0.0] } }
            ]
        }"#;

        let point = parse_first_point(body.as_bytes()).expect("decodes");

        assert_eq!(point, Some(GeoPoint::new(-119.5383, 37.8651).expect("point")));
    }

    #[test]
    fn no_features_is_no_match() {
        let point = parse_first_point(br#"{"features": []}"#).expect("decodes");
        assert_eq!(point, None);
    }

    #[rstest]
    #[case::not_json(b"<html>" as &[u8])]
    #[case::one_coordinate(br#"{"features":[{"geometry":{"type":"Point","coordinates":[1.0]}}]}"#)]
    #[case::out_of_range(br#"{"features":[{"geometry":{"type":"Point","coordinates":[200.0,0.0]}}]}"#)]
    fn malformed_bodies_are_decode_errors(#[case] body: &[u8]) {
        let error = parse_first_point(body).expect_err("decode fails");
        assert!(matches!(error, GeocoderError::Decode { .. }));
    }

    #[test]
    fn status_errors_keep_a_compact_preview() {
        let error = map_status_error(
            StatusCode::UNAUTHORIZED,
            b"{\n  \"message\": \"Not Authorized - Invalid Token\"\n}",
        );
        assert_eq!(
            error,
            GeocoderError::status(401_u16, "{ \"message\": \"Not Authorized - Invalid Token\" }")
        );
    }
}
