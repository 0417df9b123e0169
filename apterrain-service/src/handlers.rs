//! HTTP request handlers for the elevation service.

use apterrain::geojson::add_elevations_to_geometry;
use apterrain::TerrainError;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use geojson::Geometry;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::AppState;

/// Query parameters for the elevation endpoint.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ElevationQuery {
    /// Latitude in decimal degrees (-90 to 90).
    pub lat: f64,
    /// Longitude in decimal degrees (-180 to 180).
    pub lon: f64,
}

/// Successful elevation response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ElevationResponse {
    /// Elevation in meters.
    pub elevation: i16,
    /// Latitude queried.
    pub lat: f64,
    /// Longitude queried.
    pub lon: f64,
}

/// Error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message.
    pub error: String,
}

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}

/// Registry statistics response.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    /// Number of tiles loaded at startup.
    pub tiles_loaded: usize,
    /// Queries that found an elevation.
    pub query_hits: u64,
    /// Queries with no data.
    pub query_misses: u64,
    /// Hit rate (0.0 to 1.0).
    pub hit_rate: f64,
}

/// Get elevation for given coordinates.
#[utoipa::path(
    get,
    path = "/elevation",
    tag = "elevation",
    params(ElevationQuery),
    responses(
        (status = 200, description = "Elevation found", body = ElevationResponse),
        (status = 400, description = "Invalid or out-of-range coordinates", body = ErrorResponse),
        (status = 404, description = "No terrain data for this location", body = ErrorResponse)
    )
)]
#[axum::debug_handler]
pub async fn get_elevation(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ElevationQuery>,
) -> Response {
    tracing::debug!(lat = query.lat, lon = query.lon, "Elevation query");

    let result = state
        .registry
        .get_elevation(query.lat, query.lon)
        .and_then(|elevation| {
            elevation.ok_or(TerrainError::NoData {
                lat: query.lat,
                lon: query.lon,
            })
        });

    match result {
        Ok(elevation) => {
            tracing::info!(
                lat = query.lat,
                lon = query.lon,
                elevation = elevation,
                "Elevation found"
            );
            (
                StatusCode::OK,
                Json(ElevationResponse {
                    elevation,
                    lat: query.lat,
                    lon: query.lon,
                }),
            )
                .into_response()
        }
        Err(e) => error_response(e),
    }
}

/// Add elevation to every position of a GeoJSON geometry.
///
/// Positions are `[lon, lat]` or `[lon, lat, alt]`; each comes back as
/// `[lon, lat, elevation]`. The whole request fails if any position is
/// invalid or has no data.
#[utoipa::path(
    post,
    path = "/elevation",
    tag = "elevation",
    request_body(
        content = String,
        description = "GeoJSON geometry",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Geometry with elevation as the Z ordinate"),
        (status = 400, description = "Invalid or out-of-range position", body = ErrorResponse),
        (status = 404, description = "No terrain data for a position", body = ErrorResponse)
    )
)]
pub async fn post_elevation(
    State(state): State<Arc<AppState>>,
    Json(geometry): Json<Geometry>,
) -> Response {
    match add_elevations_to_geometry(&state.registry, geometry) {
        Ok(enriched) => (StatusCode::OK, Json(enriched)).into_response(),
        Err(e) => error_response(e),
    }
}

/// Map a library error onto an HTTP status.
fn error_response(e: TerrainError) -> Response {
    let status = match &e {
        TerrainError::OutOfBounds { .. } | TerrainError::InvalidCoordinate { .. } => {
            StatusCode::BAD_REQUEST
        }
        TerrainError::NoData { .. } => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    tracing::warn!(status = %status, error = %e, "Elevation query failed");

    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
        .into_response()
}

/// Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Get registry statistics.
#[utoipa::path(
    get,
    path = "/stats",
    tag = "system",
    responses((status = 200, description = "Loaded tiles and query counters", body = StatsResponse))
)]
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<StatsResponse> {
    let stats = state.registry.stats();

    Json(StatsResponse {
        tiles_loaded: stats.tile_count,
        query_hits: stats.hit_count,
        query_misses: stats.miss_count,
        hit_rate: stats.hit_rate(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elevation_query_deserialize() {
        let json = r#"{"lat": -12.5, "lon": 138.7}"#;
        let query: ElevationQuery = serde_json::from_str(json).unwrap();
        assert_eq!(query.lat, -12.5);
        assert_eq!(query.lon, 138.7);
    }

    #[test]
    fn test_stats_response_serialize() {
        let response = StatsResponse {
            tiles_loaded: 3,
            query_hits: 4,
            query_misses: 1,
            hit_rate: 0.8,
        };
        let json: serde_json::Value = serde_json::to_value(&response).unwrap();
        assert_eq!(json["tiles_loaded"], 3);
        assert_eq!(json["query_misses"], 1);
        assert_eq!(json["hit_rate"], 0.8);
    }

    #[test]
    fn test_error_status_mapping() {
        let status = |e| error_response(e).status();

        assert_eq!(
            status(TerrainError::OutOfBounds { lat: 91.0, lon: 0.0 }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(TerrainError::InvalidCoordinate {
                message: "short".to_string()
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(TerrainError::NoData { lat: 1.0, lon: 1.0 }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status(TerrainError::InvalidPayloadSize { size: 3 }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
