//! DTOs for decoding Mapbox forward-geocoding responses.

use serde::Deserialize;

use crate::domain::GeoPoint;

#[derive(Debug, Deserialize)]
pub(super) struct FeatureCollectionDto {
    #[serde(default)]
    pub(super) features: Vec<FeatureDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct FeatureDto {
    pub(super) geometry: PointDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct PointDto {
    #[serde(rename = "type")]
    pub(super) kind: String,
    pub(super) coordinates: Vec<f64>,
}

impl FeatureCollectionDto {
    /// First feature as a domain point; `None` when nothing matched.
    pub(super) fn into_first_point(self) -> Result<Option<GeoPoint>, String> {
        let Some(feature) = self.features.into_iter().next() else {
            return Ok(None);
        };
        feature.geometry.into_point().map(Some)
    }
}

impl PointDto {
    fn into_point(self) -> Result<GeoPoint, String> {
        if self.kind != "Point" {
            return Err(format!("expected Point geometry, got {}", self.kind));
        }
        let [longitude, latitude] = self.coordinates.as_slice() else {
            return Err(format!(
                "expected two coordinates, got {}",
                self.coordinates.len()
            ));
        };
        GeoPoint::new(*longitude, *latitude).map_err(|err| err.to_string())
    }
}
