//! Error types for the apterrain library.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when decoding or querying terrain tiles.
#[derive(Error, Debug)]
pub enum TerrainError {
    /// IO error when reading files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Filename does not follow the `N27E086.dat` convention.
    #[error("Not a terrain tile filename: {name}")]
    InvalidFilename { name: String },

    /// Payload is empty or not a whole number of 16-bit samples.
    #[error("Invalid payload size: {size} bytes (expected a nonzero, even length)")]
    InvalidPayloadSize { size: usize },

    /// Coordinates are outside the valid geographic range.
    #[error("Coordinates out of bounds: lat={lat}, lon={lon} (valid: lat ±90°, lon ±180°)")]
    OutOfBounds { lat: f64, lon: f64 },

    /// No loaded tile covers the coordinate, or the tile has no sample for it.
    #[error("No terrain data for lat={lat}, lon={lon}")]
    NoData { lat: f64, lon: f64 },

    /// Coordinate input is malformed (e.g. a GeoJSON position with one ordinate).
    #[error("Invalid coordinate: {message}")]
    InvalidCoordinate { message: String },

    /// A load that must produce tiles produced none.
    #[error("No terrain tiles found in {path}")]
    NoTiles { path: PathBuf },

    /// The tile directory itself could not be listed.
    #[error("Tile directory unavailable: {path}: {source}")]
    DirectoryUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias using [`TerrainError`].
pub type Result<T> = std::result::Result<T, TerrainError>;
