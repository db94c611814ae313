//! GoogleGeocoder end to end over a local HTTP server: provider failures
//! become "no result" and never an error.

use roadshare_common::Address;
use roadshare_geo::{GeocodeError, Geocoder, GoogleGeocoder};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Answer exactly one request with `status` and `body`.
async fn serve_once(status: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }

        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
    });

    base_url
}

fn address() -> Address {
    Address::new("1100 Congress Ave", "Austin", "TX", "78701")
}

#[tokio::test]
async fn resolves_and_merges_coordinates() {
    let base_url = serve_once(
        "200 OK",
        r#"{
            "status": "OK",
            "results": [
                {
                    "formatted_address": "1100 Congress Ave, Austin, TX 78701, USA",
                    "geometry": { "location": { "lat": 30.2746652, "lng": -97.7403505 } }
                }
            ]
        }"#,
    )
    .await;
    let geocoder = GoogleGeocoder::new(Some("key".into())).with_base_url(base_url);

    let updated = geocoder.geocode_address_with_coordinates(&address()).await;
    assert_eq!(updated.coordinates(), Some((30.2746652, -97.7403505)));
}

#[tokio::test]
async fn server_error_is_provider_error_then_none() {
    let base_url = serve_once("500 Internal Server Error", "boom").await;
    let geocoder = GoogleGeocoder::new(Some("key".into())).with_base_url(base_url.clone());

    assert!(matches!(
        geocoder.try_geocode(&address()).await,
        Err(GeocodeError::Provider(geocoding_client::GeocodingError::Api {
            status: 500,
            ..
        }))
    ));

    let base_url = serve_once("500 Internal Server Error", "boom").await;
    let geocoder = GoogleGeocoder::new(Some("key".into())).with_base_url(base_url);
    assert_eq!(geocoder.geocode_address(&address()).await, None);
    assert_eq!(
        geocoder.geocode_address_with_coordinates(&address()).await,
        address()
    );
}

#[tokio::test]
async fn denied_status_is_none() {
    let base_url = serve_once(
        "200 OK",
        r#"{ "status": "REQUEST_DENIED", "error_message": "bad key", "results": [] }"#,
    )
    .await;
    let geocoder = GoogleGeocoder::new(Some("key".into())).with_base_url(base_url);

    assert_eq!(geocoder.geocode_address(&address()).await, None);
}

#[tokio::test]
async fn unreachable_provider_is_none() {
    let geocoder =
        GoogleGeocoder::new(Some("key".into())).with_base_url("http://127.0.0.1:1");

    assert_eq!(geocoder.geocode_address(&address()).await, None);
    assert_eq!(
        geocoder.geocode_address_with_coordinates(&address()).await,
        address()
    );
}
