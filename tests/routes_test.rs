mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use floodcheck::{server, GeoJsClient, HazardService, LocalStorage, ServerSettings};
use http_body_util::BodyExt;
use httpmock::prelude::*;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

fn settings(server: &MockServer, dir: &TempDir) -> ServerSettings {
    ServerSettings {
        data_url: server.url("/data/map.gpkg"),
        data_dir: dir.path().to_str().unwrap().to_string(),
        data_file: "map.gpkg".to_string(),
        layer: None,
        hazard_column: "SOIL_FLOOD_HAZARD".to_string(),
        geolocation_endpoint: server.base_url(),
        map_image: None,
    }
}

fn build_router(settings: ServerSettings, dir: &TempDir, mock: &MockServer) -> Router {
    let service = Arc::new(HazardService::new(
        LocalStorage::new(dir.path()),
        settings,
        Arc::new(GeoJsClient::new(mock.base_url())),
    ));
    server::router(service)
}

async fn get(router: &Router, uri: &str, forwarded_for: Option<&str>) -> (StatusCode, Vec<u8>) {
    let mut request = Request::builder().uri(uri);
    if let Some(value) = forwarded_for {
        request = request.header("x-forwarded-for", value);
    }

    let response = router
        .clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, body.to_vec())
}

fn json(body: &[u8]) -> serde_json::Value {
    serde_json::from_slice(body).unwrap()
}

#[tokio::test]
async fn test_index_serves_template() {
    let mock = MockServer::start();
    let dir = TempDir::new().unwrap();
    let router = build_router(settings(&mock, &dir), &dir, &mock);

    let (status, body) = get(&router, "/", None).await;

    assert_eq!(status, StatusCode::OK);
    let page = String::from_utf8(body).unwrap();
    assert!(page.contains("Flood Hazard Lookup"));
    assert!(page.contains("/check_flood_hazard"));
}

#[tokio::test]
async fn test_check_flood_hazard_happy_path() {
    let mock = MockServer::start();
    let dir = TempDir::new().unwrap();

    let gpkg = common::fixture_bytes(&[(common::square_ring(0.0, 10.0), Some("HIGH"))]);
    mock.mock(|when, then| {
        when.method(GET).path("/data/map.gpkg");
        then.status(200).body(gpkg);
    });
    mock.mock(|when, then| {
        when.method(GET).path("/v1/ip/geo/203.0.113.9.json");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"latitude": "5.0", "longitude": "5.0"}));
    });

    let router = build_router(settings(&mock, &dir), &dir, &mock);
    let (status, body) = get(&router, "/check_flood_hazard", Some("203.0.113.9")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json(&body),
        serde_json::json!({"hazard": "HIGH", "map_available": false})
    );
}

#[tokio::test]
async fn test_check_flood_hazard_unlocated_client() {
    let mock = MockServer::start();
    let dir = TempDir::new().unwrap();

    mock.mock(|when, then| {
        when.method(GET).path("/v1/ip/geo/203.0.113.9.json");
        then.status(503);
    });

    let router = build_router(settings(&mock, &dir), &dir, &mock);
    let (status, body) = get(&router, "/check_flood_hazard", Some("203.0.113.9")).await;

    // Geolocation failures are reported in-band, not as HTTP errors.
    assert_eq!(status, StatusCode::OK);
    let body = json(&body);
    assert_eq!(body["hazard"], "Unknown");
    assert_eq!(body["map_available"], false);
    assert!(body["error"].as_str().unwrap().contains("location"));
}

#[tokio::test]
async fn test_check_flood_hazard_dataset_failure_is_500() {
    let mock = MockServer::start();
    let dir = TempDir::new().unwrap();

    mock.mock(|when, then| {
        when.method(GET).path("/data/map.gpkg");
        then.status(500);
    });
    mock.mock(|when, then| {
        when.method(GET).path("/v1/ip/geo/203.0.113.9.json");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"latitude": "5.0", "longitude": "5.0"}));
    });

    let router = build_router(settings(&mock, &dir), &dir, &mock);
    let (status, body) = get(&router, "/check_flood_hazard", Some("203.0.113.9")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json(&body)["error"].is_string());
}

#[tokio::test]
async fn test_map_not_configured_is_404() {
    let mock = MockServer::start();
    let dir = TempDir::new().unwrap();
    let router = build_router(settings(&mock, &dir), &dir, &mock);

    let (status, body) = get(&router, "/map", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, b"Map not found");
}

#[tokio::test]
async fn test_map_serves_configured_image() {
    let mock = MockServer::start();
    let dir = TempDir::new().unwrap();

    let image_path = dir.path().join("overview.png");
    std::fs::write(&image_path, b"fake-png").unwrap();
    let mut settings = settings(&mock, &dir);
    settings.map_image = Some(image_path.to_str().unwrap().to_string());

    let router = build_router(settings, &dir, &mock);
    let response = router
        .clone()
        .oneshot(Request::builder().uri("/map").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "image/png"
    );
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(body.as_ref(), b"fake-png");
}

#[tokio::test]
async fn test_health_reports_dataset_state() {
    let mock = MockServer::start();
    let dir = TempDir::new().unwrap();

    let gpkg = common::fixture_bytes(&[
        (common::square_ring(0.0, 10.0), Some("HIGH")),
        (common::square_ring(20.0, 30.0), Some("LOW")),
    ]);
    mock.mock(|when, then| {
        when.method(GET).path("/data/map.gpkg");
        then.status(200).body(gpkg);
    });
    mock.mock(|when, then| {
        when.method(GET).path("/v1/ip/geo/203.0.113.9.json");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({"latitude": "5.0", "longitude": "5.0"}));
    });

    let router = build_router(settings(&mock, &dir), &dir, &mock);

    let (status, body) = get(&router, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    let body = json(&body);
    assert_eq!(body["dataset_loaded"], false);
    assert!(body.get("features").is_none());

    // A lookup forces the dataset into memory.
    get(&router, "/check_flood_hazard", Some("203.0.113.9")).await;

    let (_, body) = get(&router, "/health", None).await;
    let body = json(&body);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["dataset_loaded"], true);
    assert_eq!(body["features"], 2);
    assert!(body["loaded_at"].is_string());
}
