//! Integration tests for the HTTP API.

use apterrain::{TerrainRegistry, GRID_DIM, SUBGRID_ESCAPE};
use apterrain_service::{app, AppState};
use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Write a tile whose coarse cells hold `elevation`, except the southwest
/// cell which points at a 10×10 block of `fine` values at offset 100.
///
/// The block overlaps coarse rows 2 to 5; queries here avoid those rows.
fn create_test_tile(dir: &Path, filename: &str, elevation: i16, fine: i16) {
    let mut samples = vec![elevation; GRID_DIM * GRID_DIM];
    samples[0] = SUBGRID_ESCAPE + 100;
    samples[100..200].fill(fine);

    let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
    fs::write(dir.join(filename), bytes).unwrap();
}

fn create_test_server(temp_dir: &TempDir) -> TestServer {
    let registry = TerrainRegistry::from_dir(temp_dir.path()).unwrap();
    let state = Arc::new(AppState { registry });
    TestServer::new(app(state)).unwrap()
}

#[tokio::test]
async fn test_get_elevation() {
    let temp_dir = TempDir::new().unwrap();
    create_test_tile(temp_dir.path(), "N35E138.DAT", 500, 42);
    let server = create_test_server(&temp_dir);

    let response = server.get("/elevation?lat=35.5&lon=138.5").await;

    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json["elevation"], 500);
    assert_eq!(json["lat"], 35.5);
    assert_eq!(json["lon"], 138.5);
}

#[tokio::test]
async fn test_get_elevation_subgrid() {
    let temp_dir = TempDir::new().unwrap();
    create_test_tile(temp_dir.path(), "N35E138.DAT", 500, 42);
    let server = create_test_server(&temp_dir);

    // Southwest coarse cell dereferences into the subgrid
    let response = server.get("/elevation?lat=35.001&lon=138.001").await;

    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json["elevation"], 42);
}

#[tokio::test]
async fn test_get_elevation_negative_coordinates() {
    let temp_dir = TempDir::new().unwrap();
    create_test_tile(temp_dir.path(), "S13W078.DAT", 2100, 0);
    let server = create_test_server(&temp_dir);

    let response = server.get("/elevation?lat=-12.5&lon=-77.5").await;

    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json["elevation"], 2100);
}

#[tokio::test]
async fn test_get_elevation_out_of_bounds() {
    let temp_dir = TempDir::new().unwrap();
    let server = create_test_server(&temp_dir);

    let response = server.get("/elevation?lat=91.0&lon=0.0").await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let json: Value = response.json();
    assert!(json["error"].as_str().unwrap().contains("out of bounds"));
}

#[tokio::test]
async fn test_get_elevation_no_data() {
    let temp_dir = TempDir::new().unwrap();
    create_test_tile(temp_dir.path(), "N35E138.DAT", 500, 42);
    let server = create_test_server(&temp_dir);

    let response = server.get("/elevation?lat=20.0&lon=90.0").await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_elevation_missing_params() {
    let temp_dir = TempDir::new().unwrap();
    let server = create_test_server(&temp_dir);

    server
        .get("/elevation?lon=138.5")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    server
        .get("/elevation")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_check() {
    let temp_dir = TempDir::new().unwrap();
    let server = create_test_server(&temp_dir);

    let response = server.get("/health").await;

    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json["status"], "healthy");
    assert!(json["version"].as_str().is_some());
}

#[tokio::test]
async fn test_stats_counts_queries() {
    let temp_dir = TempDir::new().unwrap();
    create_test_tile(temp_dir.path(), "N35E138.DAT", 500, 42);
    fs::write(temp_dir.path().join("README.txt"), "not a tile").unwrap();
    let server = create_test_server(&temp_dir);

    let json: Value = server.get("/stats").await.json();
    assert_eq!(json["tiles_loaded"], 1);
    assert_eq!(json["query_hits"], 0);
    assert_eq!(json["query_misses"], 0);

    server.get("/elevation?lat=35.5&lon=138.5").await;
    server.get("/elevation?lat=20.0&lon=90.0").await;

    let json: Value = server.get("/stats").await.json();
    assert_eq!(json["query_hits"], 1);
    assert_eq!(json["query_misses"], 1);
    assert_eq!(json["hit_rate"], 0.5);
}

#[tokio::test]
async fn test_post_elevation_point() {
    let temp_dir = TempDir::new().unwrap();
    create_test_tile(temp_dir.path(), "N35E138.DAT", 500, 42);
    let server = create_test_server(&temp_dir);

    let geometry = json!({"type": "Point", "coordinates": [138.5, 35.5]});
    let response = server.post("/elevation").json(&geometry).await;

    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json["type"], "Point");
    assert_eq!(json["coordinates"], json!([138.5, 35.5, 500.0]));
}

#[tokio::test]
async fn test_post_elevation_line_string() {
    let temp_dir = TempDir::new().unwrap();
    create_test_tile(temp_dir.path(), "N35E138.DAT", 500, 42);
    create_test_tile(temp_dir.path(), "N35E139.DAT", 700, 42);
    let server = create_test_server(&temp_dir);

    let geometry = json!({
        "type": "LineString",
        "coordinates": [[138.5, 35.5], [139.5, 35.5, 10.0]]
    });
    let response = server.post("/elevation").json(&geometry).await;

    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json["coordinates"][0][2], 500.0);
    assert_eq!(json["coordinates"][1][2], 700.0);
}

#[tokio::test]
async fn test_post_elevation_errors() {
    let temp_dir = TempDir::new().unwrap();
    create_test_tile(temp_dir.path(), "N35E138.DAT", 500, 42);
    let server = create_test_server(&temp_dir);

    let out_of_range = json!({"type": "Point", "coordinates": [0.0, 95.0]});
    server
        .post("/elevation")
        .json(&out_of_range)
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let no_data = json!({
        "type": "LineString",
        "coordinates": [[138.5, 35.5], [90.0, 20.0]]
    });
    server
        .post("/elevation")
        .json(&no_data)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
