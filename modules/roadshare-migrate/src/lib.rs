pub mod pacer;
pub mod runner;
pub mod store;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use pacer::{FixedDelayPacer, NoPacing, Pacer};
pub use runner::{GeocodeRunner, GeocodeVehicleOutcome, GeocodeVehicleResponse, MigrationOptions};
pub use store::{PgVehicleStore, VehicleStore};
