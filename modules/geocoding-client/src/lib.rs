pub mod error;
pub mod types;

pub use error::{GeocodingError, Result};
pub use types::{GeocodeCandidate, GeocodeResponse, GeocodedLocation, LatLng};

const BASE_URL: &str = "https://maps.googleapis.com/maps/api/geocode";

pub struct GeocodingClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GeocodingClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Point the client at a different host (proxies, local fakes).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Reuse an existing `reqwest::Client` (shared timeouts, connection pool).
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Resolve a single-line address to the provider's first match.
    pub async fn geocode(&self, address: &str) -> Result<GeocodedLocation> {
        let url = format!("{}/json", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[("address", address), ("key", self.api_key.as_str())])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GeocodingError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = resp.text().await?;
        let parsed: GeocodeResponse = serde_json::from_str(&body)?;
        tracing::debug!(
            status = %parsed.status,
            results = parsed.results.len(),
            "Geocoding response received"
        );

        parsed.into_first_location()
    }
}
