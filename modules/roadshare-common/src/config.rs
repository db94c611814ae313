use std::env;

use crate::error::RoadshareError;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // Database
    pub database_url: String,

    // Geocoding. Absent key disables geocoding rather than failing.
    pub google_maps_api_key: Option<String>,
    pub geocoding_base_url: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, RoadshareError> {
        dotenvy::dotenv().ok();

        let config = Self::from_lookup(|key| env::var(key).ok())?;
        config.log_keys();
        Ok(config)
    }

    /// Build from any key → value source. Empty values count as unset so
    /// `KEY=` in a .env file behaves like no key.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, RoadshareError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            database_url: get("DATABASE_URL")
                .ok_or_else(|| RoadshareError::Config("DATABASE_URL is required".into()))?,
            google_maps_api_key: get("GOOGLE_MAPS_API_KEY"),
            geocoding_base_url: get("GEOCODING_BASE_URL"),
        })
    }

    fn log_keys(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  DATABASE_URL: {}", preview(&self.database_url));
        tracing::info!(
            "  GOOGLE_MAPS_API_KEY: {}",
            preview_opt(&self.google_maps_api_key)
        );
        tracing::info!(
            "  GEOCODING_BASE_URL: {}",
            self.geocoding_base_url.as_deref().unwrap_or("<default>")
        );
        if self.google_maps_api_key.is_none() {
            tracing::warn!("GOOGLE_MAPS_API_KEY not set, geocoding is disabled");
        }
    }
}

fn preview(val: &str) -> String {
    let n = val.chars().take(5).map(char::len_utf8).sum::<usize>();
    format!("{}...({} chars)", &val[..n], val.len())
}

fn preview_opt(val: &Option<String>) -> String {
    match val {
        Some(v) if !v.is_empty() => preview(v),
        _ => "<not set>".to_string(),
    }
}
