use serde::Deserialize;

use crate::error::{GeocodingError, Result};

/// Top-level body of `GET /geocode/json`.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<GeocodeCandidate>,
    pub error_message: Option<String>,
}

/// One candidate match. Only the fields we consume are modelled.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeCandidate {
    pub formatted_address: Option<String>,
    pub geometry: Geometry,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// The first candidate of a successful lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedLocation {
    pub lat: f64,
    pub lng: f64,
    pub formatted_address: Option<String>,
}

impl GeocodeResponse {
    /// Reduce a provider response to its first candidate.
    ///
    /// `ZERO_RESULTS` and an empty `results` list both map to `NoResults`;
    /// every other non-"OK" status is surfaced verbatim.
    pub fn into_first_location(self) -> Result<GeocodedLocation> {
        match self.status.as_str() {
            "OK" => {}
            "ZERO_RESULTS" => return Err(GeocodingError::NoResults),
            _ => {
                return Err(GeocodingError::Status {
                    status: self.status,
                    message: self.error_message.unwrap_or_default(),
                })
            }
        }

        let first = self
            .results
            .into_iter()
            .next()
            .ok_or(GeocodingError::NoResults)?;

        Ok(GeocodedLocation {
            lat: first.geometry.location.lat,
            lng: first.geometry.location.lng,
            formatted_address: first.formatted_address,
        })
    }
}
