//! End-to-end batch updates against a mocked OpenWeatherMap

use std::sync::Arc;

use weatherdb::config::ProviderConfig;
use weatherdb::{Dataset, FailureKind, OpenWeatherClient, Units, WeatherDb, WeatherUpdater};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

type Updater = WeatherUpdater<Arc<OpenWeatherClient>, Arc<OpenWeatherClient>>;

fn updater_for(server: &MockServer) -> Updater {
    let client = OpenWeatherClient::new(&ProviderConfig {
        api_key: Some("integration-test-key".to_string()),
        base_url: server.uri(),
        ..ProviderConfig::default()
    })
    .expect("client should build");
    let client = Arc::new(client);
    WeatherUpdater::new(Arc::clone(&client), client)
}

fn slot(dt_txt: &str, temp: f64) -> serde_json::Value {
    serde_json::json!({
        "dt": 0,
        "dt_txt": dt_txt,
        "main": {"temp": temp, "feels_like": temp - 1.0, "humidity": 65},
        "weather": [{"id": 803, "main": "Clouds", "description": "broken clouds", "icon": "04d"}],
        "wind": {"speed": 3.6, "deg": 200}
    })
}

async fn mount_city(server: &MockServer, query: &str, name: &str, country: &str, lat: f64, lon: f64) {
    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .and(query_param("q", query))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"name": name, "lat": lat, "lon": lon, "country": country}
        ])))
        .mount(server)
        .await;
}

async fn mount_forecast(server: &MockServer, lat: f64, slots: Vec<serde_json::Value>) {
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .and(query_param("lat", lat.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "cod": "200",
            "list": slots
        })))
        .mount(server)
        .await;
}

async fn mount_unknown(server: &MockServer, query: &str) {
    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .and(query_param("q", query))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_first_run_for_single_city() {
    let server = MockServer::start().await;
    mount_city(&server, "Paris", "Paris", "FR", 48.85, 2.35).await;
    mount_forecast(
        &server,
        48.85,
        vec![
            slot("2024-03-01 06:00:00", 7.0),
            slot("2024-03-01 00:00:00", 5.0),
            slot("2024-03-01 03:00:00", 4.5),
        ],
    )
    .await;

    let dataset = updater_for(&server).update(&["Paris"], None).await;

    assert_eq!(dataset.len(), 3);
    assert!(dataset.iter().all(|p| p.city == "Paris" && p.country == "FR"));
    let times: Vec<String> = dataset
        .iter()
        .map(|p| p.timestamp.format("%H:%M").to_string())
        .collect();
    assert_eq!(times, vec!["00:00", "03:00", "06:00"]);
}

#[tokio::test]
async fn test_unknown_location_keeps_existing_dataset() {
    let server = MockServer::start().await;
    mount_city(&server, "Paris", "Paris", "FR", 48.85, 2.35).await;
    mount_forecast(&server, 48.85, vec![slot("2024-03-01 00:00:00", 5.0)]).await;
    mount_unknown(&server, "Nowhere123").await;

    let updater = updater_for(&server);
    let existing = updater.update(&["Paris"], None).await;
    let report = updater
        .update_with_report(&["Nowhere123"], Some(existing.clone()))
        .await;

    assert_eq!(report.dataset, existing);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].kind, FailureKind::Resolution);
}

#[tokio::test]
async fn test_partial_failure_keeps_successful_city() {
    let server = MockServer::start().await;
    mount_unknown(&server, "CityA").await;
    mount_city(&server, "CityB", "CityB", "CB", 10.5, 20.5).await;
    mount_forecast(
        &server,
        10.5,
        vec![slot("2024-03-01 00:00:00", 25.0), slot("2024-03-01 03:00:00", 26.0)],
    )
    .await;

    let dataset = updater_for(&server).update(&["CityA", "CityB"], None).await;

    assert_eq!(dataset.len(), 2);
    assert!(dataset.iter().all(|p| p.city == "CityB"));
}

#[tokio::test]
async fn test_forecast_outage_is_reported_as_fetch_failure() {
    let server = MockServer::start().await;
    mount_city(&server, "Reykjavik", "Reykjavik", "IS", 64.14, -21.94).await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let report = updater_for(&server)
        .update_with_report(&["Reykjavik"], Some(Dataset::new()))
        .await;

    assert!(report.dataset.is_empty());
    assert_eq!(report.failures[0].kind, FailureKind::Fetch);
    assert_eq!(report.failures[0].error.status(), Some(502));
}

#[tokio::test]
async fn test_refresh_replaces_overlapping_slots() {
    let server = MockServer::start().await;
    mount_city(&server, "Paris", "Paris", "FR", 48.85, 2.35).await;
    mount_forecast(
        &server,
        48.85,
        vec![slot("2024-03-01 00:00:00", 5.0), slot("2024-03-01 03:00:00", 4.5)],
    )
    .await;

    let updater = updater_for(&server);
    let mut db = WeatherDb::new();
    assert!(db.refresh(&updater, &["Paris"]).await.is_empty());

    server.reset().await;
    mount_city(&server, "Paris", "Paris", "FR", 48.85, 2.35).await;
    mount_forecast(
        &server,
        48.85,
        vec![slot("2024-03-01 03:00:00", 9.0), slot("2024-03-01 06:00:00", 10.0)],
    )
    .await;
    assert!(db.refresh(&updater, &["Paris"]).await.is_empty());

    let temps: Vec<f64> = db.dataset().iter().map(|p| p.temperature).collect();
    assert_eq!(temps, vec![5.0, 9.0, 10.0]);
}

#[tokio::test]
async fn test_imperial_units_are_requested() {
    let server = MockServer::start().await;
    mount_city(&server, "Denver", "Denver", "US", 39.74, -104.99).await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .and(query_param("units", "imperial"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "list": [slot("2024-03-01 00:00:00", 41.0)]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dataset = updater_for(&server)
        .with_units(Units::Imperial)
        .update(&["Denver"], None)
        .await;

    assert_eq!(dataset.points()[0].temperature, 41.0);
}
