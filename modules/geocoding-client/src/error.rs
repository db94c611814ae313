use thiserror::Error;

pub type Result<T> = std::result::Result<T, GeocodingError>;

#[derive(Debug, Error)]
pub enum GeocodingError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    /// The provider answered 200 but with a status other than "OK".
    #[error("Geocoding status {status}: {message}")]
    Status { status: String, message: String },

    #[error("No geocoding results")]
    NoResults,
}

impl From<reqwest::Error> for GeocodingError {
    fn from(err: reqwest::Error) -> Self {
        GeocodingError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for GeocodingError {
    fn from(err: serde_json::Error) -> Self {
        GeocodingError::Parse(err.to_string())
    }
}
