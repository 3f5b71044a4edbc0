//! HTTP-level tests for the weather fetcher and IP locator using wiremock.

use std::time::Duration;

use localweather_core::{
    Coordinates, FetchError, LocationError, OpenWeatherClient, WeatherRequest, WeatherSource,
    location::IpLocator,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PARIS: Coordinates = Coordinates {
    latitude: 48.8566,
    longitude: 2.3522,
};

fn request(lang: Option<&str>) -> WeatherRequest {
    WeatherRequest {
        coordinates: PARIS,
        lang: lang.map(str::to_string),
    }
}

fn paris_doc() -> serde_json::Value {
    serde_json::json!({
        "name": "Paris",
        "main": {"temp": 21.5, "feels_like": 21.0, "humidity": 40, "pressure": 1012},
        "wind": {"speed": 2.1},
        "sys": {"sunrise": 1700000000, "sunset": 1700033000},
        "weather": [{"description": "clear sky", "icon": "01d"}]
    })
}

fn client(server: &MockServer) -> OpenWeatherClient {
    OpenWeatherClient::new("TEST_KEY".into(), &server.uri(), Duration::from_secs(5))
        .unwrap()
}

#[tokio::test]
async fn fetch_sends_coordinates_units_key_and_lang() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("lat", "48.8566"))
        .and(query_param("lon", "2.3522"))
        .and(query_param("units", "metric"))
        .and(query_param("appid", "TEST_KEY"))
        .and(query_param("lang", "fr"))
        .respond_with(ResponseTemplate::new(200).set_body_json(paris_doc()))
        .expect(1)
        .mount(&server)
        .await;

    let body = client(&server).fetch(&request(Some("fr"))).await.unwrap();

    let snapshot = localweather_core::provider::parse_snapshot(&body).unwrap();
    assert_eq!(snapshot.city, "Paris");
    assert_eq!(snapshot.pressure_hpa, 1012);
}

#[tokio::test]
async fn fetch_maps_non_success_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(serde_json::json!({"cod": 401, "message": "Invalid API key"})),
        )
        .mount(&server)
        .await;

    let err = client(&server).fetch(&request(None)).await.unwrap_err();

    match err {
        FetchError::Status { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("Invalid API key"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn fetch_reports_transport_failure() {
    // Nothing listens on this port once the server is dropped.
    let uri = {
        let server = MockServer::start().await;
        server.uri()
    };

    let client = OpenWeatherClient::new("K".into(), &uri, Duration::from_secs(2)).unwrap();
    let err = client.fetch(&request(None)).await.unwrap_err();
    assert!(matches!(err, FetchError::Transport(_)));
}

#[tokio::test]
async fn ip_locator_reads_coordinates() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "success",
            "lat": 52.52,
            "lon": 13.405
        })))
        .mount(&server)
        .await;

    let lookup_url = format!("{}/json/", server.uri());
    let locator = IpLocator::new(&lookup_url, Duration::from_secs(5)).unwrap();
    let coords = locator.lookup().await.unwrap();

    assert_eq!(
        coords,
        Coordinates {
            latitude: 52.52,
            longitude: 13.405,
        }
    );
}

#[tokio::test]
async fn ip_locator_surfaces_service_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "fail",
            "message": "reserved range"
        })))
        .mount(&server)
        .await;

    let lookup_url = format!("{}/json/", server.uri());
    let locator = IpLocator::new(&lookup_url, Duration::from_secs(5)).unwrap();
    let err = locator.lookup().await.unwrap_err();

    match err {
        LocationError::Lookup(msg) => assert_eq!(msg, "reserved range"),
        other => panic!("expected lookup error, got {other:?}"),
    }
}
