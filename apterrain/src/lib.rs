//! # apterrain - Terrain Elevation Library
//!
//! Elevation lookup over tiled terrain `.dat` files: given a latitude and
//! longitude, find the tile covering it and decode the elevation from that
//! tile's two-level grid.
//!
//! ## Quick Start
//!
//! ```ignore
//! use apterrain::TerrainRegistry;
//!
//! // Load every tile in a directory (non-tile files are skipped)
//! let registry = TerrainRegistry::from_dir("/data/terrain")?;
//! println!("Loaded {} tiles", registry.len());
//!
//! match registry.query(27.9881, 86.9250) {
//!     Some(elevation) => println!("Elevation: {}m", elevation),
//!     None => println!("No terrain data"),
//! }
//! ```
//!
//! ## Tile Format
//!
//! Each tile covers 1° × 1° and is named after its southwest corner, e.g.
//! `N27E086.DAT`. The payload is a flat array of little-endian 16-bit signed
//! samples:
//!
//! - **Coarse grid**: 36×36 cells; a value below 32000 is the elevation in meters
//! - **Subgrid**: a coarse value of `32000 + k` points at a 10×10 block of finer
//!   samples starting at flat offset `k`
//!
//! Lookups return the nearest cell's value; there is no interpolation.

pub mod error;
pub mod filename;
pub mod registry;
pub mod source;
pub mod tile;

#[cfg(feature = "geojson")]
pub mod geojson;

// Re-export main types at crate root for convenience
pub use error::{Result, TerrainError};
pub use registry::{pack_key, QueryStats, TerrainRegistry, TerrainRegistryBuilder};
pub use source::{DirectorySource, MemorySource, TileSource};
pub use tile::{GridCell, TerrainTile, TileSummary, GRID_DIM, SUBGRID_DIM, SUBGRID_ESCAPE};
