// Test doubles for the geocoding runner.
//
// - MemoryVehicleStore (VehicleStore): Vec-backed, keeps store order,
//   records writes, can be told to fail writes or listing.
// - ScriptedGeocoder (Geocoder): one-line address → result map.
// - RecordingPacer (Pacer): records pauses instead of sleeping.
//
// ScriptedGeocoder and RecordingPacer can share a Timeline so tests can
// assert how lookups and pauses interleave.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use roadshare_common::{Address, GeocodeResult, Vehicle};
use roadshare_geo::{GeocodeError, Geocoder};
use uuid::Uuid;

use crate::pacer::Pacer;
use crate::store::VehicleStore;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn vehicle(title: &str, address: Option<Address>) -> Vehicle {
    let now = Utc::now();
    Vehicle {
        id: Uuid::new_v4(),
        title: title.to_string(),
        address,
        created_at: now,
        updated_at: now,
    }
}

/// A distinct, un-geocoded address per index.
pub fn numbered_address(n: usize) -> Address {
    Address::new(format!("{n} Main St"), "Springfield", "IL", "62701")
}

// ---------------------------------------------------------------------------
// Timeline
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Lookup(String),
    RecordPause,
    BatchPause,
}

#[derive(Debug, Clone, Default)]
pub struct Timeline(Arc<Mutex<Vec<Step>>>);

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, step: Step) {
        self.0.lock().unwrap().push(step);
    }

    pub fn steps(&self) -> Vec<Step> {
        self.0.lock().unwrap().clone()
    }

    /// Compact form: `L` lookup, `.` record pause, `|` batch pause.
    pub fn render(&self) -> String {
        self.steps()
            .iter()
            .map(|s| match s {
                Step::Lookup(_) => 'L',
                Step::RecordPause => '.',
                Step::BatchPause => '|',
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// MemoryVehicleStore
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryVehicleStore {
    vehicles: Mutex<Vec<Vehicle>>,
    writes: Mutex<Vec<(Uuid, Address)>>,
    failing_writes: Mutex<HashSet<Uuid>>,
    fail_listing: Mutex<bool>,
}

impl MemoryVehicleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vehicles(vehicles: Vec<Vehicle>) -> Self {
        let store = Self::new();
        *store.vehicles.lock().unwrap() = vehicles;
        store
    }

    pub fn insert(&self, vehicle: Vehicle) {
        self.vehicles.lock().unwrap().push(vehicle);
    }

    pub fn fail_writes_for(&self, id: Uuid) {
        self.failing_writes.lock().unwrap().insert(id);
    }

    pub fn fail_listing(&self) {
        *self.fail_listing.lock().unwrap() = true;
    }

    pub fn get(&self, id: Uuid) -> Option<Vehicle> {
        self.vehicles
            .lock()
            .unwrap()
            .iter()
            .find(|v| v.id == id)
            .cloned()
    }

    /// Every successful `update_address` call, in order.
    pub fn writes(&self) -> Vec<(Uuid, Address)> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl VehicleStore for MemoryVehicleStore {
    async fn find_vehicle(&self, id: Uuid) -> Result<Option<Vehicle>> {
        Ok(self.get(id))
    }

    async fn vehicles_missing_coordinates(&self, limit: usize) -> Result<Vec<Vehicle>> {
        if *self.fail_listing.lock().unwrap() {
            bail!("connection refused");
        }
        Ok(self
            .vehicles
            .lock()
            .unwrap()
            .iter()
            .filter(|v| v.address.as_ref().map_or(true, Address::needs_geocoding))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn vehicles_with_coordinates(&self) -> Result<Vec<Vehicle>> {
        Ok(self
            .vehicles
            .lock()
            .unwrap()
            .iter()
            .filter(|v| v.coordinates().is_some())
            .cloned()
            .collect())
    }

    async fn update_address(
        &self,
        id: Uuid,
        address: &Address,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        if self.failing_writes.lock().unwrap().contains(&id) {
            bail!("write rejected");
        }

        let mut vehicles = self.vehicles.lock().unwrap();
        let Some(vehicle) = vehicles.iter_mut().find(|v| v.id == id) else {
            bail!("vehicle {id} not found");
        };
        vehicle.address = Some(address.clone());
        vehicle.updated_at = updated_at;

        self.writes.lock().unwrap().push((id, address.clone()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ScriptedGeocoder
// ---------------------------------------------------------------------------

/// Resolves addresses registered with `.on()`; everything else is
/// `NoResults`. Builder pattern.
#[derive(Default)]
pub struct ScriptedGeocoder {
    answers: HashMap<String, GeocodeResult>,
    resolve_all: Option<GeocodeResult>,
    calls: Mutex<Vec<String>>,
    timeline: Option<Timeline>,
}

impl ScriptedGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, address: &Address, latitude: f64, longitude: f64) -> Self {
        self.answers.insert(
            address.one_line(),
            GeocodeResult {
                latitude,
                longitude,
                formatted_address: Some(address.one_line()),
            },
        );
        self
    }

    /// Resolve every lookup that has no explicit answer to this point.
    pub fn resolve_all(mut self, latitude: f64, longitude: f64) -> Self {
        self.resolve_all = Some(GeocodeResult {
            latitude,
            longitude,
            formatted_address: None,
        });
        self
    }

    pub fn with_timeline(mut self, timeline: Timeline) -> Self {
        self.timeline = Some(timeline);
        self
    }

    /// One-line addresses looked up, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Geocoder for ScriptedGeocoder {
    async fn try_geocode(&self, address: &Address) -> Result<GeocodeResult, GeocodeError> {
        let line = address.one_line();
        self.calls.lock().unwrap().push(line.clone());
        if let Some(timeline) = &self.timeline {
            timeline.push(Step::Lookup(line.clone()));
        }

        self.answers
            .get(&line)
            .or(self.resolve_all.as_ref())
            .cloned()
            .ok_or(GeocodeError::NoResults)
    }
}

// ---------------------------------------------------------------------------
// RecordingPacer
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RecordingPacer {
    record_pauses: Mutex<usize>,
    batch_pauses: Mutex<usize>,
    timeline: Option<Timeline>,
}

impl RecordingPacer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeline(timeline: Timeline) -> Self {
        Self {
            timeline: Some(timeline),
            ..Self::default()
        }
    }

    pub fn record_pauses(&self) -> usize {
        *self.record_pauses.lock().unwrap()
    }

    pub fn batch_pauses(&self) -> usize {
        *self.batch_pauses.lock().unwrap()
    }
}

#[async_trait]
impl Pacer for RecordingPacer {
    async fn between_records(&self) {
        *self.record_pauses.lock().unwrap() += 1;
        if let Some(timeline) = &self.timeline {
            timeline.push(Step::RecordPause);
        }
    }

    async fn between_batches(&self) {
        *self.batch_pauses.lock().unwrap() += 1;
        if let Some(timeline) = &self.timeline {
            timeline.push(Step::BatchPause);
        }
    }
}
