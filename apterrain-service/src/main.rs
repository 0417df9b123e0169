//! apterrain Service - HTTP microservice for terrain elevation queries.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `APTERRAIN_DATA_DIR` | Directory containing .dat tiles | Current directory |
//! | `APTERRAIN_REQUIRE_TILES` | Refuse to start with no tiles ("true" or "1") | false |
//! | `APTERRAIN_PORT` | HTTP server port | 8080 |
//! | `RUST_LOG` | Log filter (e.g., "info", "debug") | "apterrain_service=info,tower_http=info" |
//!
//! ## Endpoints
//!
//! - `GET /elevation?lat=X&lon=Y` - Get elevation at coordinates
//! - `POST /elevation` - Elevation for every position of a GeoJSON geometry
//! - `GET /health` - Health check
//! - `GET /stats` - Tile and query statistics
//! - `GET /docs` - OpenAPI documentation (Swagger UI)

use std::net::SocketAddr;
use std::sync::Arc;

use apterrain::TerrainRegistryBuilder;
use apterrain_service::{app, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "apterrain_service=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let port: u16 = std::env::var("APTERRAIN_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);

    let builder = TerrainRegistryBuilder::from_env_or(".");
    let data_dir = builder.dir().to_path_buf();

    // Tiles are loaded once; the registry is read-only from here on
    let registry = builder.build()?;

    tracing::info!(
        data_dir = %data_dir.display(),
        tiles_loaded = registry.len(),
        port = port,
        "Starting apterrain service"
    );

    let state = Arc::new(AppState { registry });

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app(state)).await?;

    Ok(())
}
