pub mod batch;
pub mod info;
pub mod list;
pub mod query;

use anyhow::{Context, Result};
use apterrain::{TerrainRegistry, TerrainRegistryBuilder};
use std::path::PathBuf;

/// Resolve the data directory from the flag or `APTERRAIN_DATA_DIR`.
pub fn resolve_data_dir(data_dir: Option<PathBuf>) -> Result<PathBuf> {
    match data_dir {
        Some(dir) => Ok(dir),
        None => {
            let dir = std::env::var("APTERRAIN_DATA_DIR").context(
                "APTERRAIN_DATA_DIR environment variable not set. Use --data-dir or set APTERRAIN_DATA_DIR",
            )?;
            Ok(PathBuf::from(dir))
        }
    }
}

/// Load every tile in the data directory, failing if none load.
pub fn load_registry(data_dir: Option<PathBuf>) -> Result<TerrainRegistry> {
    let dir = resolve_data_dir(data_dir)?;

    TerrainRegistryBuilder::new(&dir)
        .require_tiles(true)
        .build()
        .with_context(|| format!("Failed to load terrain tiles from {}", dir.display()))
}

/// Human-readable extent of the tile with southwest corner `(lat, lon)`.
pub fn format_coverage(lat: i32, lon: i32) -> String {
    fn lat_label(lat: i32) -> String {
        format!("{}{:02}", if lat >= 0 { 'N' } else { 'S' }, lat.abs())
    }
    fn lon_label(lon: i32) -> String {
        format!("{}{:03}", if lon >= 0 { 'E' } else { 'W' }, lon.abs())
    }

    format!(
        "{} to {}, {} to {}",
        lat_label(lat),
        lat_label(lat + 1),
        lon_label(lon),
        lon_label(lon + 1)
    )
}

pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
