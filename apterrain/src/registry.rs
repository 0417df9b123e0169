//! Terrain tile registry.
//!
//! This module provides [`TerrainRegistry`], which owns every decoded tile and
//! routes elevation queries to the tile covering the coordinate.
//!
//! The registry is populated once (bulk load) and then only read. Queries take
//! `&self`, so a loaded registry can be shared across threads; the only state
//! touched by a query is a pair of relaxed atomic counters.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{Result, TerrainError};
use crate::filename::{coords_to_filename, is_valid_coord, parse_coordinate};
use crate::source::{DirectorySource, TileSource};
use crate::tile::{load_payload, TerrainTile};

/// Pack integer tile coordinates into a single registry key.
///
/// Latitude is shifted into `0..=180` and stored in the high 16 bits,
/// longitude is shifted into `0..=360` and stored in the low 16 bits. The
/// packing is injective over `lat ∈ [-90, 90]`, `lon ∈ [-180, 180]`.
///
/// # Examples
///
/// ```
/// use apterrain::registry::pack_key;
///
/// assert_eq!(pack_key(-90, -180), 0);
/// assert_ne!(pack_key(27, 86), pack_key(-27, -86));
/// ```
pub fn pack_key(lat: i32, lon: i32) -> u32 {
    let lat_u = (lat + 90) as u16;
    let lon_u = (lon + 180) as u16;
    ((lat_u as u32) << 16) | lon_u as u32
}

/// Key of the tile covering a coordinate, if the coordinate can have one.
fn covering_key(lat: f64, lon: f64) -> Option<u32> {
    if !lat.is_finite() || !lon.is_finite() {
        return None;
    }

    let lat_i = lat.floor() as i32;
    let lon_i = lon.floor() as i32;
    if !(-90..=90).contains(&lat_i) || !(-180..=180).contains(&lon_i) {
        return None;
    }

    Some(pack_key(lat_i, lon_i))
}

/// Statistics about registry contents and query outcomes.
#[derive(Debug, Clone, Default)]
pub struct QueryStats {
    /// Number of tiles in the registry.
    pub tile_count: usize,
    /// Number of queries that produced an elevation.
    pub hit_count: u64,
    /// Number of queries that produced no data.
    pub miss_count: u64,
}

impl QueryStats {
    /// Calculate the query hit rate (0.0 to 1.0).
    ///
    /// Returns 0.0 if no queries have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hit_count + self.miss_count;
        if total == 0 {
            0.0
        } else {
            self.hit_count as f64 / total as f64
        }
    }
}

/// Owner of all loaded terrain tiles.
///
/// # Example
///
/// ```ignore
/// use apterrain::TerrainRegistry;
///
/// let registry = TerrainRegistry::from_dir("/data/terrain")?;
///
/// match registry.query(27.9881, 86.9250) {
///     Some(elevation) => println!("Elevation: {}m", elevation),
///     None => println!("No terrain data"),
/// }
/// ```
#[derive(Debug, Default)]
pub struct TerrainRegistry {
    /// Tiles keyed by [`pack_key`] of their origin.
    tiles: HashMap<u32, TerrainTile>,
    /// Number of queries answered with an elevation.
    hit_count: AtomicU64,
    /// Number of queries answered with no data.
    miss_count: AtomicU64,
}

impl TerrainRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry loaded from every tile file in a directory.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::DirectoryUnavailable`] if the directory cannot
    /// be listed. A readable directory without tiles yields an empty registry.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let mut registry = Self::new();
        registry.load_all(&DirectorySource::new(dir))?;
        Ok(registry)
    }

    /// Create a builder for more configuration options.
    pub fn builder<P: AsRef<Path>>(data_dir: P) -> TerrainRegistryBuilder {
        TerrainRegistryBuilder::new(data_dir)
    }

    /// Decode every candidate from `source` and store the tiles.
    ///
    /// Candidates that are not tile files, cannot be read, or carry a
    /// malformed payload are skipped. A tile whose coordinate is already
    /// present replaces the earlier one.
    ///
    /// # Returns
    ///
    /// The number of candidates decoded successfully. Overwrites are counted,
    /// so this can exceed the number of distinct tiles.
    ///
    /// # Errors
    ///
    /// Returns an error only if the source cannot be listed.
    pub fn load_all<S: TileSource>(&mut self, source: &S) -> Result<usize> {
        let candidates = source.list()?;
        let mut loaded = 0;

        for path in &candidates {
            match decode_candidate(source, path) {
                Ok(tile) => {
                    let name = coords_to_filename(tile.origin_lat(), tile.origin_lon());
                    if self.insert(tile).is_some() {
                        tracing::warn!(
                            path = %path.display(),
                            tile = %name,
                            "Duplicate tile coordinate, replacing earlier tile"
                        );
                    }
                    loaded += 1;
                }
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "Skipping candidate");
                }
            }
        }

        tracing::info!(
            candidates = candidates.len(),
            loaded = loaded,
            tiles = self.tiles.len(),
            "Terrain load complete"
        );

        Ok(loaded)
    }

    /// Insert a tile, returning the tile it replaced, if any.
    pub fn insert(&mut self, tile: TerrainTile) -> Option<TerrainTile> {
        let key = pack_key(tile.origin_lat(), tile.origin_lon());
        self.tiles.insert(key, tile)
    }

    /// Get elevation for the given coordinates.
    ///
    /// The covering tile is `(floor(lat), floor(lon))`, so a point exactly on
    /// an integer boundary belongs to the tile starting at that boundary.
    ///
    /// # Returns
    ///
    /// The elevation in meters, or `None` if no loaded tile covers the point
    /// or the tile has no sample for it.
    pub fn query(&self, lat: f64, lon: f64) -> Option<i16> {
        let elevation = covering_key(lat, lon)
            .and_then(|key| self.tiles.get(&key))
            .and_then(|tile| tile.resolve(lat, lon));

        let counter = if elevation.is_some() {
            &self.hit_count
        } else {
            &self.miss_count
        };
        counter.fetch_add(1, Ordering::Relaxed);

        elevation
    }

    /// Get elevation for the given coordinates, validating them first.
    ///
    /// # Arguments
    ///
    /// * `lat` - Latitude in decimal degrees (-90 to 90)
    /// * `lon` - Longitude in decimal degrees (-180 to 180)
    ///
    /// # Returns
    ///
    /// - `Ok(Some(elevation))` - elevation in meters
    /// - `Ok(None)` - no terrain data for this location
    /// - `Err(...)` - coordinates out of bounds
    pub fn get_elevation(&self, lat: f64, lon: f64) -> Result<Option<i16>> {
        if !is_valid_coord(lat, lon) {
            return Err(TerrainError::OutOfBounds { lat, lon });
        }
        Ok(self.query(lat, lon))
    }

    /// Get elevations for a batch of coordinates.
    ///
    /// Coordinates are grouped by tile so that each tile is looked up once.
    /// Results are in input order; `default` stands in for invalid
    /// coordinates and points without data.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let coords = vec![(27.9881, 86.9250), (27.7172, 85.3240)];
    /// let elevations = registry.get_elevations_batch(&coords, 0);
    /// ```
    pub fn get_elevations_batch(&self, coords: &[(f64, f64)], default: i16) -> Vec<i16> {
        let mut results = vec![default; coords.len()];

        let mut groups: HashMap<u32, Vec<usize>> = HashMap::new();
        for (i, &(lat, lon)) in coords.iter().enumerate() {
            if !is_valid_coord(lat, lon) {
                continue;
            }
            if let Some(key) = covering_key(lat, lon) {
                groups.entry(key).or_default().push(i);
            }
        }

        let mut hits = 0;
        for (key, indices) in &groups {
            let Some(tile) = self.tiles.get(key) else {
                continue;
            };

            for &i in indices {
                let (lat, lon) = coords[i];
                if let Some(elevation) = tile.resolve(lat, lon) {
                    results[i] = elevation;
                    hits += 1;
                }
            }
        }

        self.hit_count.fetch_add(hits, Ordering::Relaxed);
        self.miss_count
            .fetch_add(coords.len() as u64 - hits, Ordering::Relaxed);

        results
    }

    /// Get the tile whose southwest corner is `(lat, lon)`.
    pub fn tile(&self, lat: i32, lon: i32) -> Option<&TerrainTile> {
        self.tiles.get(&pack_key(lat, lon))
    }

    /// Iterate over all loaded tiles, in no particular order.
    pub fn tiles(&self) -> impl Iterator<Item = &TerrainTile> {
        self.tiles.values()
    }

    /// Number of loaded tiles.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Whether no tiles are loaded.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Get registry statistics.
    pub fn stats(&self) -> QueryStats {
        QueryStats {
            tile_count: self.tiles.len(),
            hit_count: self.hit_count.load(Ordering::Relaxed),
            miss_count: self.miss_count.load(Ordering::Relaxed),
        }
    }
}

/// Decode one candidate. The name is checked before any bytes are read.
fn decode_candidate<S: TileSource>(source: &S, path: &Path) -> Result<TerrainTile> {
    let (origin_lat, origin_lon) = parse_coordinate(&path.to_string_lossy())?;
    let bytes = source.read(path)?;
    let samples = load_payload(bytes.as_ref())?;

    TerrainTile::from_parts(origin_lat, origin_lon, samples)
}

/// `APTERRAIN_REQUIRE_TILES` set to `true` (any case) or `1`.
fn require_tiles_from_env() -> bool {
    std::env::var("APTERRAIN_REQUIRE_TILES")
        .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
        .unwrap_or(false)
}

/// Builder for loading a [`TerrainRegistry`] from a data directory.
///
/// # Example
///
/// ```ignore
/// use apterrain::TerrainRegistryBuilder;
///
/// let registry = TerrainRegistryBuilder::new("/data/terrain")
///     .require_tiles(true)
///     .build()?;
/// ```
#[derive(Debug, Clone)]
pub struct TerrainRegistryBuilder {
    data_dir: PathBuf,
    require_tiles: bool,
}

impl TerrainRegistryBuilder {
    /// Create a new builder with the specified data directory.
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            require_tiles: false,
        }
    }

    /// Create a builder configured from environment variables.
    ///
    /// # Environment Variables
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `APTERRAIN_DATA_DIR` | Directory containing .dat files | Required |
    /// | `APTERRAIN_REQUIRE_TILES` | Fail the build if no tile loads (`true`/`1`) | false |
    ///
    /// # Errors
    ///
    /// Returns an error if `APTERRAIN_DATA_DIR` is not set.
    pub fn from_env() -> Result<Self> {
        let data_dir = std::env::var("APTERRAIN_DATA_DIR").map_err(|_| {
            TerrainError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "APTERRAIN_DATA_DIR environment variable not set",
            ))
        })?;

        Ok(Self {
            data_dir: PathBuf::from(data_dir),
            require_tiles: require_tiles_from_env(),
        })
    }

    /// Like [`Self::from_env`], but falls back to `data_dir` when
    /// `APTERRAIN_DATA_DIR` is not set.
    ///
    /// `APTERRAIN_REQUIRE_TILES` is honored either way.
    pub fn from_env_or<P: AsRef<Path>>(data_dir: P) -> Self {
        Self::from_env().unwrap_or_else(|_| {
            tracing::warn!(
                data_dir = %data_dir.as_ref().display(),
                "APTERRAIN_DATA_DIR not set, using fallback directory"
            );
            Self::new(data_dir).require_tiles(require_tiles_from_env())
        })
    }

    /// Set the data directory.
    ///
    /// Overrides the directory set in the constructor or from environment.
    pub fn data_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.data_dir = path.as_ref().to_path_buf();
        self
    }

    /// Fail [`Self::build`] with [`TerrainError::NoTiles`] if no tile loads.
    ///
    /// Default is false.
    pub fn require_tiles(mut self, require: bool) -> Self {
        self.require_tiles = require;
        self
    }

    /// Get the configured data directory.
    pub fn dir(&self) -> &Path {
        &self.data_dir
    }

    /// Load the [`TerrainRegistry`].
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be listed, or if
    /// `require_tiles` is set and nothing was loaded.
    pub fn build(self) -> Result<TerrainRegistry> {
        let registry = TerrainRegistry::from_dir(&self.data_dir)?;

        if self.require_tiles && registry.is_empty() {
            return Err(TerrainError::NoTiles {
                path: self.data_dir,
            });
        }

        Ok(registry)
    }
}
