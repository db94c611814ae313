pub mod distance;
pub mod geocoder;
pub mod nearby;

pub use distance::{
    haversine_distance, haversine_distance_km, haversine_distance_miles, to_radians, DistanceUnit,
};
pub use geocoder::{GeocodeError, Geocoder, GoogleGeocoder};
pub use nearby::{rank_by_distance, Located, Ranked};
