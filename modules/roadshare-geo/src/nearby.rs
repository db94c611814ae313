use std::cmp::Ordering;

use roadshare_common::{Address, Vehicle};

use crate::distance::{haversine_distance, DistanceUnit};

/// Anything that may carry a coordinate pair.
pub trait Located {
    fn coordinates(&self) -> Option<(f64, f64)>;
}

impl Located for Address {
    fn coordinates(&self) -> Option<(f64, f64)> {
        Address::coordinates(self)
    }
}

impl Located for Vehicle {
    fn coordinates(&self) -> Option<(f64, f64)> {
        Vehicle::coordinates(self)
    }
}

impl<T: Located> Located for &T {
    fn coordinates(&self) -> Option<(f64, f64)> {
        (**self).coordinates()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<T> {
    pub item: T,
    pub distance: f64,
}

/// Items sorted nearest-first from `origin`.
///
/// Items without coordinates are dropped, as are items farther than
/// `max_distance` (the bound is inclusive). Ties keep input order.
pub fn rank_by_distance<T, I>(
    origin: (f64, f64),
    items: I,
    unit: DistanceUnit,
    max_distance: Option<f64>,
) -> Vec<Ranked<T>>
where
    T: Located,
    I: IntoIterator<Item = T>,
{
    let (lat, lng) = origin;
    let mut ranked: Vec<Ranked<T>> = items
        .into_iter()
        .filter_map(|item| {
            let (item_lat, item_lng) = item.coordinates()?;
            let distance = haversine_distance(lat, lng, item_lat, item_lng, unit);
            match max_distance {
                Some(max) if distance > max => None,
                _ => Some(Ranked { item, distance }),
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        a.distance
            .partial_cmp(&b.distance)
            .unwrap_or(Ordering::Equal)
    });
    ranked
}
