//! Behaviour of the provided `Geocoder` methods over a stub lookup.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use geocoding_client::GeocodingError;
use roadshare_common::{Address, GeocodeResult};
use roadshare_geo::{GeocodeError, Geocoder};

type Answer = fn() -> Result<GeocodeResult, GeocodeError>;

/// Answers every lookup the same way and counts calls.
struct StubGeocoder {
    answer: Answer,
    calls: AtomicUsize,
}

impl StubGeocoder {
    fn new(answer: Answer) -> Self {
        Self {
            answer,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Geocoder for StubGeocoder {
    async fn try_geocode(&self, _address: &Address) -> Result<GeocodeResult, GeocodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.answer)()
    }
}

fn empire_state() -> Result<GeocodeResult, GeocodeError> {
    Ok(GeocodeResult {
        latitude: 40.7484405,
        longitude: -73.9856644,
        formatted_address: Some("20 W 34th St., New York, NY 10001, USA".into()),
    })
}

fn provider_down() -> Result<GeocodeResult, GeocodeError> {
    Err(GeocodeError::Provider(GeocodingError::Api {
        status: 503,
        message: "Service Unavailable".into(),
    }))
}

fn nothing_found() -> Result<GeocodeResult, GeocodeError> {
    Err(GeocodeError::NoResults)
}

fn address() -> Address {
    Address::new("20 W 34th St", "New York", "NY", "10001")
}

#[tokio::test]
async fn successful_lookup_merges_coordinates_only() {
    let geocoder = StubGeocoder::new(empire_state);

    let updated = geocoder.geocode_address_with_coordinates(&address()).await;

    assert_eq!(updated.coordinates(), Some((40.7484405, -73.9856644)));
    assert_eq!(updated.street, "20 W 34th St");
    assert_eq!(updated.zip_code, "10001");
}

#[tokio::test]
async fn already_coordinated_address_is_returned_unchanged() {
    let geocoder = StubGeocoder::new(empire_state);
    let original = address().with_coordinates(40.0, -74.0);

    let first = geocoder.geocode_address_with_coordinates(&original).await;
    let second = geocoder.geocode_address_with_coordinates(&first).await;

    assert_eq!(first, original);
    assert_eq!(second, original);
    assert_eq!(geocoder.calls(), 0);
}

#[tokio::test]
async fn partial_coordinates_trigger_a_lookup() {
    let geocoder = StubGeocoder::new(empire_state);
    let mut partial = address();
    partial.latitude = Some(40.0);

    let updated = geocoder.geocode_address_with_coordinates(&partial).await;

    assert_eq!(geocoder.calls(), 1);
    assert_eq!(updated.coordinates(), Some((40.7484405, -73.9856644)));
}

#[tokio::test]
async fn failures_are_silent_and_leave_address_unchanged() {
    for answer in [provider_down as Answer, nothing_found] {
        let geocoder = StubGeocoder::new(answer);
        let original = address();

        assert_eq!(geocoder.geocode_address(&original).await, None);

        let first = geocoder.geocode_address_with_coordinates(&original).await;
        let second = geocoder.geocode_address_with_coordinates(&first).await;
        assert_eq!(first, original);
        assert_eq!(second, original);
    }
}

#[tokio::test]
async fn geocode_address_returns_formatted_address() {
    let geocoder = StubGeocoder::new(empire_state);

    let result = geocoder.geocode_address(&address()).await.unwrap();
    assert_eq!(
        result.formatted_address.as_deref(),
        Some("20 W 34th St., New York, NY 10001, USA")
    );
}
