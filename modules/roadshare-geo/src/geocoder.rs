//! Best-effort address geocoding.
//!
//! `Geocoder::try_geocode` reports why a lookup failed. The provided
//! `geocode_address` and `geocode_address_with_coordinates` collapse every
//! failure into "no result" so callers treat coordinates as optional
//! enrichment.

use async_trait::async_trait;
use geocoding_client::{GeocodingClient, GeocodingError};
use roadshare_common::{Address, GeocodeResult};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("geocoding API key is not configured")]
    NoApiKey,

    #[error("geocoding provider error: {0}")]
    Provider(#[source] GeocodingError),

    #[error("no geocoding results")]
    NoResults,
}

impl From<GeocodingError> for GeocodeError {
    fn from(err: GeocodingError) -> Self {
        match err {
            GeocodingError::NoResults => GeocodeError::NoResults,
            other => GeocodeError::Provider(other),
        }
    }
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn try_geocode(&self, address: &Address) -> Result<GeocodeResult, GeocodeError>;

    async fn geocode_address(&self, address: &Address) -> Option<GeocodeResult> {
        match self.try_geocode(address).await {
            Ok(result) => Some(result),
            Err(GeocodeError::NoApiKey) => {
                tracing::debug!("Geocoding skipped, no API key configured");
                None
            }
            Err(e) => {
                tracing::warn!(address = %address.one_line(), error = %e, "Geocoding failed");
                None
            }
        }
    }

    /// Copy of `address` with coordinates merged in, or `address` unchanged
    /// when it already has both coordinates or the lookup fails.
    async fn geocode_address_with_coordinates(&self, address: &Address) -> Address {
        if address.has_coordinates() {
            return address.clone();
        }

        match self.geocode_address(address).await {
            Some(result) => address.with_coordinates(result.latitude, result.longitude),
            None => address.clone(),
        }
    }
}

/// Google Maps Geocoding API backed implementation.
pub struct GoogleGeocoder {
    client: Option<GeocodingClient>,
}

impl GoogleGeocoder {
    /// `None` disables geocoding: every lookup yields `GeocodeError::NoApiKey`.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: api_key
                .filter(|k| !k.trim().is_empty())
                .map(GeocodingClient::new),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.client = self.client.map(|c| c.with_base_url(base_url));
        self
    }

    pub fn with_http_client(mut self, http_client: reqwest::Client) -> Self {
        self.client = self.client.map(|c| c.with_http_client(http_client));
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn try_geocode(&self, address: &Address) -> Result<GeocodeResult, GeocodeError> {
        let client = self.client.as_ref().ok_or(GeocodeError::NoApiKey)?;

        let location = client.geocode(&address.one_line()).await?;
        Ok(GeocodeResult {
            latitude: location.lat,
            longitude: location.lng,
            formatted_address: location.formatted_address,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_tagged_variants() {
        assert!(matches!(
            GeocodeError::from(GeocodingError::NoResults),
            GeocodeError::NoResults
        ));
        assert!(matches!(
            GeocodeError::from(GeocodingError::Network("connection reset".into())),
            GeocodeError::Provider(GeocodingError::Network(_))
        ));
    }

    #[test]
    fn blank_key_disables_geocoding() {
        assert!(!GoogleGeocoder::new(None).is_enabled());
        assert!(!GoogleGeocoder::new(Some("   ".into())).is_enabled());
        assert!(GoogleGeocoder::new(Some("AIza-test".into())).is_enabled());
    }

    #[tokio::test]
    async fn missing_key_never_resolves() {
        let geocoder = GoogleGeocoder::new(None);
        let addresses = [
            Address::new("1600 Amphitheatre Pkwy", "Mountain View", "CA", "94043"),
            Address::new("", "", "", ""),
        ];

        for address in &addresses {
            assert!(matches!(
                geocoder.try_geocode(address).await,
                Err(GeocodeError::NoApiKey)
            ));
            assert_eq!(geocoder.geocode_address(address).await, None);
            assert_eq!(
                &geocoder.geocode_address_with_coordinates(address).await,
                address
            );
        }
    }
}
