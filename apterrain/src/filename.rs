//! Terrain tile filename utilities.
//!
//! This module converts between coordinates and terrain `.dat` filenames.
//!
//! # Filename Format
//!
//! Tile files follow the naming convention: `{N|S}{lat}{E|W}{lon}.dat`
//!
//! - Latitude: 2 digits with N/S prefix (e.g., N27, S12)
//! - Longitude: 3 digits with E/W prefix (e.g., E086, W077)
//! - Extension: `.dat`, matched case-insensitively
//!
//! The filename represents the **southwest corner** of the 1° × 1° tile.

use std::path::Path;

use crate::error::{Result, TerrainError};

/// Shortest bare tile filename, e.g. `N27E086.dat`.
const MIN_FILENAME_LEN: usize = 11;

/// Length of the coordinate part of a tile filename, e.g. `N27E086`.
const STEM_LEN: usize = 7;

/// Convert integer tile coordinates to the canonical tile filename.
///
/// # Examples
///
/// ```
/// use apterrain::filename::coords_to_filename;
///
/// assert_eq!(coords_to_filename(27, 86), "N27E086.DAT");
/// assert_eq!(coords_to_filename(-13, -78), "S13W078.DAT");
/// ```
pub fn coords_to_filename(lat: i32, lon: i32) -> String {
    let lat_prefix = if lat >= 0 { 'N' } else { 'S' };
    let lon_prefix = if lon >= 0 { 'E' } else { 'W' };

    format!(
        "{}{:02}{}{:03}.DAT",
        lat_prefix,
        lat.abs(),
        lon_prefix,
        lon.abs()
    )
}

/// Convert latitude and longitude to the filename of the covering tile.
///
/// The covering tile is the one whose southwest corner is
/// `(floor(lat), floor(lon))`.
///
/// # Examples
///
/// ```
/// use apterrain::filename::lat_lon_to_filename;
///
/// assert_eq!(lat_lon_to_filename(27.9881, 86.925), "N27E086.DAT");
/// assert_eq!(lat_lon_to_filename(-12.3, -77.1), "S13W078.DAT");
/// assert_eq!(lat_lon_to_filename(0.5, -0.5), "N00W001.DAT");
/// ```
pub fn lat_lon_to_filename(lat: f64, lon: f64) -> String {
    coords_to_filename(lat.floor() as i32, lon.floor() as i32)
}

/// Parse a tile filename into the coordinates of its southwest corner.
///
/// Any leading directory path is ignored. The bare name must be at least 11
/// characters, start with `[NS]dd[EW]ddd` and have a `.dat` extension
/// (letters and extension case-insensitive). Characters between the
/// coordinates and the extension are ignored, so `N27E086_v2.dat` names tile
/// `(27, 86)`. The tile must satisfy `lat ∈ [-90, 90)` and `lon ∈ [-180, 180)`.
///
/// Failure is the ordinary answer for files that are not terrain tiles.
///
/// # Examples
///
/// ```
/// use apterrain::filename::parse_coordinate;
///
/// assert_eq!(parse_coordinate("N27E086.dat").unwrap(), (27, 86));
/// assert_eq!(parse_coordinate("S27W086.dat").unwrap(), (-27, -86));
/// assert_eq!(parse_coordinate("/data/n27e086.DAT").unwrap(), (27, 86));
/// assert!(parse_coordinate("N27E086.txt").is_err());
/// ```
pub fn parse_coordinate(name: &str) -> Result<(i32, i32)> {
    let invalid = || TerrainError::InvalidFilename {
        name: name.to_string(),
    };

    let file_name = Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(invalid)?;

    if file_name.len() < MIN_FILENAME_LEN {
        return Err(invalid());
    }

    let has_dat_extension = Path::new(file_name)
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("dat"))
        .unwrap_or(false);
    if !has_dat_extension {
        return Err(invalid());
    }

    // Coordinates sit at fixed offsets; anything after them is ignored
    let stem = file_name
        .get(..STEM_LEN)
        .filter(|stem| stem.is_ascii())
        .ok_or_else(invalid)?;

    let bytes = stem.as_bytes();
    let lat_sign = match bytes[0].to_ascii_uppercase() {
        b'N' => 1,
        b'S' => -1,
        _ => return Err(invalid()),
    };
    let lon_sign = match bytes[3].to_ascii_uppercase() {
        b'E' => 1,
        b'W' => -1,
        _ => return Err(invalid()),
    };

    let lat = parse_digits(&stem[1..3]).ok_or_else(invalid)? * lat_sign;
    let lon = parse_digits(&stem[4..7]).ok_or_else(invalid)? * lon_sign;

    if !(-90..90).contains(&lat) || !(-180..180).contains(&lon) {
        return Err(invalid());
    }

    Ok((lat, lon))
}

/// Parse a run of ASCII digits. Rejects signs, which `str::parse` would accept.
fn parse_digits(digits: &str) -> Option<i32> {
    if digits.bytes().all(|b| b.is_ascii_digit()) {
        digits.parse().ok()
    } else {
        None
    }
}

/// Validate that coordinates are within the geographic range a query accepts.
pub fn is_valid_coord(lat: f64, lon: f64) -> bool {
    (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon)
}
