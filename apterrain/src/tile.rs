//! Terrain tile decoding and elevation resolution.
//!
//! This module provides [`TerrainTile`], a decoded `.dat` tile, and the
//! two-level lookup that turns a coordinate into an elevation sample.
//!
//! # Tile Layout
//!
//! A tile payload is a flat array of little-endian `i16` samples:
//!
//! - the first `36 × 36` samples form the **coarse grid**, row-major with row 0
//!   at the tile's southern edge;
//! - a coarse value below [`SUBGRID_ESCAPE`] is the elevation of that cell;
//! - a coarse value of `SUBGRID_ESCAPE + k` points at a `10 × 10` **subgrid**
//!   block starting at flat offset `k`, which refines the cell.

use std::path::Path;

use crate::error::{Result, TerrainError};
use crate::filename::parse_coordinate;
use crate::source::map_file;

/// Coarse grid cells per tile side.
pub const GRID_DIM: usize = 36;

/// Subgrid cells per coarse cell side.
pub const SUBGRID_DIM: usize = 10;

/// Coarse values at or above this are subgrid pointers, not elevations.
pub const SUBGRID_ESCAPE: i16 = 32000;

/// Number of samples in the coarse grid.
pub const COARSE_SAMPLES: usize = GRID_DIM * GRID_DIM;

/// A decoded coarse grid entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridCell {
    /// The cell stores its elevation in meters directly.
    Elevation(i16),
    /// The cell is refined by the subgrid block starting at this flat offset.
    Subgrid(u32),
}

impl GridCell {
    /// Decode a raw coarse sample.
    pub fn decode(raw: i16) -> Self {
        if raw < SUBGRID_ESCAPE {
            GridCell::Elevation(raw)
        } else {
            GridCell::Subgrid((raw - SUBGRID_ESCAPE) as u32)
        }
    }
}

/// Decode a raw tile payload into its flat sample array.
///
/// # Errors
///
/// Returns [`TerrainError::InvalidPayloadSize`] if the payload is empty or has
/// an odd number of bytes.
///
/// # Examples
///
/// ```
/// use apterrain::tile::load_payload;
///
/// let samples = load_payload(&[0xF4, 0x01, 0x18, 0xFC]).unwrap();
/// assert_eq!(samples, vec![500, -1000]);
/// assert!(load_payload(&[0x01]).is_err());
/// ```
pub fn load_payload(bytes: &[u8]) -> Result<Vec<i16>> {
    if bytes.is_empty() || bytes.len() % 2 != 0 {
        return Err(TerrainError::InvalidPayloadSize { size: bytes.len() });
    }

    Ok(bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect())
}

/// Aggregate figures about a tile's contents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TileSummary {
    /// Coarse cells that store an elevation directly.
    pub direct_cells: usize,
    /// Coarse cells refined by a subgrid block that lies within the payload.
    pub subgrid_cells: usize,
    /// Coarse cells missing from the payload or pointing past its end.
    pub unresolved_cells: usize,
    /// Lowest elevation reachable through the grid.
    pub min_elevation: Option<i16>,
    /// Highest elevation reachable through the grid.
    pub max_elevation: Option<i16>,
}

impl TileSummary {
    fn record(&mut self, elevation: i16) {
        self.min_elevation = Some(self.min_elevation.map_or(elevation, |m| m.min(elevation)));
        self.max_elevation = Some(self.max_elevation.map_or(elevation, |m| m.max(elevation)));
    }
}

/// A decoded terrain tile covering one 1° × 1° cell.
///
/// # Example
///
/// ```ignore
/// use apterrain::TerrainTile;
///
/// let tile = TerrainTile::from_file("N27E086.DAT")?;
/// if let Some(elevation) = tile.resolve(27.9881, 86.925) {
///     println!("Elevation: {}m", elevation);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct TerrainTile {
    /// Flat sample array: coarse grid followed by any trailing samples
    samples: Vec<i16>,
    /// Southwest corner latitude (integer)
    origin_lat: i32,
    /// Southwest corner longitude (integer)
    origin_lon: i32,
}

impl TerrainTile {
    /// Build a tile from already decoded samples.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::InvalidPayloadSize`] if `samples` is empty.
    pub fn from_parts(origin_lat: i32, origin_lon: i32, samples: Vec<i16>) -> Result<Self> {
        if samples.is_empty() {
            return Err(TerrainError::InvalidPayloadSize { size: 0 });
        }

        Ok(Self {
            samples,
            origin_lat,
            origin_lon,
        })
    }

    /// Decode a tile from its filename and raw payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not a tile filename or the payload is
    /// malformed.
    pub fn from_bytes(name: &str, bytes: &[u8]) -> Result<Self> {
        let (origin_lat, origin_lon) = parse_coordinate(name)?;
        let samples = load_payload(bytes)?;

        Self::from_parts(origin_lat, origin_lon, samples)
    }

    /// Load a tile from a `.dat` file.
    ///
    /// The origin is taken from the filename; the payload is memory-mapped and
    /// decoded into an owned sample array.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The filename does not follow the tile naming convention
    /// - The file cannot be opened or memory-mapped
    /// - The payload is empty or has an odd length
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let (origin_lat, origin_lon) = parse_coordinate(&path.to_string_lossy())?;
        let mmap = map_file(path)?;

        Self::from_parts(origin_lat, origin_lon, load_payload(&mmap)?)
    }

    /// Resolve the elevation at the given coordinates.
    ///
    /// The coordinate is bucketed into a coarse cell; if that cell points at a
    /// subgrid block, it is bucketed again inside the block. Indices that land
    /// exactly on the far edge are clamped to the last cell. No interpolation
    /// is performed.
    ///
    /// # Returns
    ///
    /// The elevation in meters, or `None` if the coordinate lies south or west
    /// of the tile or the computed offset falls outside the sample array.
    pub fn resolve(&self, lat: f64, lon: f64) -> Option<i16> {
        let lat_frac = lat - self.origin_lat as f64;
        let lon_frac = lon - self.origin_lon as f64;

        let gy = cell_index(lat_frac, GRID_DIM)?;
        let gx = cell_index(lon_frac, GRID_DIM)?;

        match self.coarse_cell(gy, gx)? {
            GridCell::Elevation(elevation) => Some(elevation),
            GridCell::Subgrid(base) => {
                let sub_lat_frac = lat_frac * GRID_DIM as f64 - gy as f64;
                let sub_lon_frac = lon_frac * GRID_DIM as f64 - gx as f64;

                let sy = cell_index(sub_lat_frac, SUBGRID_DIM)?;
                let sx = cell_index(sub_lon_frac, SUBGRID_DIM)?;

                self.sample(base as usize + sy * SUBGRID_DIM + sx)
            }
        }
    }

    /// Decode the coarse cell at row `gy` (0 = south) and column `gx` (0 = west).
    ///
    /// Returns `None` if the indices are outside the grid or the payload is too
    /// short to contain the cell.
    pub fn coarse_cell(&self, gy: usize, gx: usize) -> Option<GridCell> {
        if gy >= GRID_DIM || gx >= GRID_DIM {
            return None;
        }
        self.sample(gy * GRID_DIM + gx).map(GridCell::decode)
    }

    /// Raw sample at a flat offset.
    pub fn sample(&self, offset: usize) -> Option<i16> {
        self.samples.get(offset).copied()
    }

    /// Walk the coarse grid and every referenced subgrid block.
    pub fn summary(&self) -> TileSummary {
        let mut summary = TileSummary::default();
        let block_len = SUBGRID_DIM * SUBGRID_DIM;

        for gy in 0..GRID_DIM {
            for gx in 0..GRID_DIM {
                match self.coarse_cell(gy, gx) {
                    Some(GridCell::Elevation(elevation)) => {
                        summary.direct_cells += 1;
                        summary.record(elevation);
                    }
                    Some(GridCell::Subgrid(base)) => {
                        let base = base as usize;
                        match self.samples.get(base..base + block_len) {
                            Some(block) => {
                                summary.subgrid_cells += 1;
                                block.iter().for_each(|&e| summary.record(e));
                            }
                            None => summary.unresolved_cells += 1,
                        }
                    }
                    None => summary.unresolved_cells += 1,
                }
            }
        }

        summary
    }

    /// Returns the flat sample array.
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Returns the origin latitude (southwest corner).
    pub fn origin_lat(&self) -> i32 {
        self.origin_lat
    }

    /// Returns the origin longitude (southwest corner).
    pub fn origin_lon(&self) -> i32 {
        self.origin_lon
    }
}

/// Bucket a fraction in `[0, 1)` into one of `dim` cells.
///
/// Values at or past the far edge clamp to `dim - 1`; negative and non-finite
/// values have no cell.
fn cell_index(frac: f64, dim: usize) -> Option<usize> {
    let scaled = (frac * dim as f64).floor();
    if !scaled.is_finite() || scaled < 0.0 {
        return None;
    }
    Some((scaled as usize).min(dim - 1))
}
