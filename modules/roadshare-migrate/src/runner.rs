//! Back-fills coordinates onto vehicle addresses.
//!
//! Records are processed one at a time in store order. A failure on one
//! record is counted and never stops the run.

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use roadshare_common::{MigrationResult, Vehicle};
use roadshare_geo::Geocoder;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::pacer::Pacer;
use crate::store::VehicleStore;

pub const DEFAULT_BATCH_SIZE: usize = 10;
pub const DEFAULT_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationOptions {
    pub batch_size: usize,
    pub limit: usize,
}

impl Default for MigrationOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Outcome of geocoding a single vehicle.
#[derive(Debug, Clone, PartialEq)]
pub enum GeocodeVehicleOutcome {
    Geocoded { latitude: f64, longitude: f64 },
    /// Lookup produced no coordinates. The address was still written back.
    Unresolved,
    AlreadyGeocoded,
    VehicleNotFound,
    MissingAddress,
}

impl GeocodeVehicleOutcome {
    pub fn success(&self) -> bool {
        !matches!(self, Self::VehicleNotFound | Self::MissingAddress)
    }

    pub fn skipped(&self) -> bool {
        matches!(self, Self::AlreadyGeocoded)
    }

    pub fn error(&self) -> Option<&'static str> {
        match self {
            Self::VehicleNotFound => Some("Vehicle not found"),
            Self::MissingAddress => Some("Vehicle has no address"),
            _ => None,
        }
    }

    pub fn message(&self) -> Option<&'static str> {
        match self {
            Self::Geocoded { .. } => Some("Vehicle geocoded"),
            Self::Unresolved => Some("Could not geocode address"),
            Self::AlreadyGeocoded => Some("Vehicle already has coordinates"),
            _ => None,
        }
    }

    pub fn response(&self) -> GeocodeVehicleResponse {
        let (latitude, longitude) = match self {
            Self::Geocoded {
                latitude,
                longitude,
            } => (Some(*latitude), Some(*longitude)),
            _ => (None, None),
        };

        GeocodeVehicleResponse {
            success: self.success(),
            skipped: self.skipped(),
            error: self.error().map(str::to_string),
            message: self.message().map(str::to_string),
            latitude,
            longitude,
        }
    }
}

/// Wire shape of a single-vehicle result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeocodeVehicleResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub skipped: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

pub struct GeocodeRunner {
    store: Arc<dyn VehicleStore>,
    geocoder: Arc<dyn Geocoder>,
    pacer: Arc<dyn Pacer>,
}

impl GeocodeRunner {
    pub fn new(
        store: Arc<dyn VehicleStore>,
        geocoder: Arc<dyn Geocoder>,
        pacer: Arc<dyn Pacer>,
    ) -> Self {
        Self {
            store,
            geocoder,
            pacer,
        }
    }

    /// Geocode one vehicle. Only store errors surface as `Err`.
    pub async fn geocode_vehicle(&self, vehicle_id: Uuid) -> Result<GeocodeVehicleOutcome> {
        let Some(vehicle) = self.store.find_vehicle(vehicle_id).await? else {
            warn!(%vehicle_id, "Vehicle not found");
            return Ok(GeocodeVehicleOutcome::VehicleNotFound);
        };

        let Some(address) = vehicle.address.as_ref() else {
            warn!(%vehicle_id, "Vehicle has no address");
            return Ok(GeocodeVehicleOutcome::MissingAddress);
        };

        if address.has_coordinates() {
            debug!(%vehicle_id, "Vehicle already geocoded");
            return Ok(GeocodeVehicleOutcome::AlreadyGeocoded);
        }

        let updated = self.geocoder.geocode_address_with_coordinates(address).await;
        self.store
            .update_address(vehicle_id, &updated, Utc::now())
            .await?;

        match updated.coordinates() {
            Some((latitude, longitude)) => {
                info!(%vehicle_id, latitude, longitude, "Vehicle geocoded");
                Ok(GeocodeVehicleOutcome::Geocoded {
                    latitude,
                    longitude,
                })
            }
            None => {
                info!(%vehicle_id, "No coordinates found for vehicle address");
                Ok(GeocodeVehicleOutcome::Unresolved)
            }
        }
    }

    /// Vehicles a batch run would pick up, without touching them.
    pub async fn pending(&self, limit: usize) -> Result<Vec<Vehicle>> {
        self.store.vehicles_missing_coordinates(limit).await
    }

    /// Geocode up to `options.limit` vehicles lacking coordinates, in chunks
    /// of `options.batch_size`. Always returns a result.
    pub async fn geocode_all_vehicles(&self, options: MigrationOptions) -> MigrationResult {
        let batch_size = options.batch_size.max(1);
        let mut result = MigrationResult::default();

        let vehicles = match self.store.vehicles_missing_coordinates(options.limit).await {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "Failed to list vehicles without coordinates");
                result.errors.push(format!("Failed to list vehicles: {e}"));
                return result;
            }
        };

        result.total = vehicles.len();
        let batch_count = vehicles.len().div_ceil(batch_size);
        info!(
            total = result.total,
            batch_size,
            batches = batch_count,
            "Starting vehicle geocoding run"
        );

        for (batch_index, batch) in vehicles.chunks(batch_size).enumerate() {
            debug!(batch = batch_index + 1, size = batch.len(), "Processing batch");

            for (i, vehicle) in batch.iter().enumerate() {
                self.process_vehicle(vehicle, &mut result).await;

                if i + 1 < batch.len() {
                    self.pacer.between_records().await;
                }
            }

            if batch_index + 1 < batch_count {
                self.pacer.between_batches().await;
            }
        }

        info!(
            total = result.total,
            processed = result.processed,
            successful = result.successful,
            failed = result.failed,
            skipped = result.skipped,
            "Vehicle geocoding run complete"
        );
        result
    }

    async fn process_vehicle(&self, vehicle: &Vehicle, result: &mut MigrationResult) {
        let vehicle_id = vehicle.id;

        let Some(address) = vehicle.address.as_ref() else {
            debug!(%vehicle_id, "Skipping vehicle without address");
            result.record_skip();
            return;
        };

        if address.has_coordinates() {
            debug!(%vehicle_id, "Skipping already geocoded vehicle");
            result.record_skip();
            return;
        }

        let updated = self.geocoder.geocode_address_with_coordinates(address).await;
        if !updated.has_coordinates() {
            result.record_failure(format!("Vehicle {vehicle_id}: could not geocode address"));
            return;
        }

        match self
            .store
            .update_address(vehicle_id, &updated, Utc::now())
            .await
        {
            Ok(()) => result.record_success(),
            Err(e) => {
                warn!(%vehicle_id, error = %e, "Failed to save geocoded address");
                result.record_failure(format!("Vehicle {vehicle_id}: {e}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_contract_fields() {
        let not_found = GeocodeVehicleOutcome::VehicleNotFound;
        assert!(!not_found.success());
        assert_eq!(not_found.error(), Some("Vehicle not found"));

        let no_address = GeocodeVehicleOutcome::MissingAddress;
        assert!(!no_address.success());
        assert_eq!(no_address.error(), Some("Vehicle has no address"));

        let already = GeocodeVehicleOutcome::AlreadyGeocoded;
        assert!(already.success());
        assert!(already.skipped());
        assert_eq!(already.error(), None);

        let unresolved = GeocodeVehicleOutcome::Unresolved;
        assert!(unresolved.success());
        assert!(!unresolved.skipped());
        assert_eq!(unresolved.message(), Some("Could not geocode address"));
    }

    #[test]
    fn response_serialises_only_relevant_fields() {
        let json = serde_json::to_value(
            GeocodeVehicleOutcome::Geocoded {
                latitude: 30.2672,
                longitude: -97.7431,
            }
            .response(),
        )
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "success": true,
                "message": "Vehicle geocoded",
                "latitude": 30.2672,
                "longitude": -97.7431
            })
        );

        let json = serde_json::to_value(GeocodeVehicleOutcome::AlreadyGeocoded.response()).unwrap();
        assert_eq!(json["skipped"], true);
        assert!(json.get("error").is_none());

        let json = serde_json::to_value(GeocodeVehicleOutcome::VehicleNotFound.response()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "success": false, "error": "Vehicle not found" })
        );
    }

    #[test]
    fn default_options() {
        let options = MigrationOptions::default();
        assert_eq!(options.batch_size, 10);
        assert_eq!(options.limit, 100);
    }
}
