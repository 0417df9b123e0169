use anyhow::{bail, Context, Result};
use apterrain::filename::{coords_to_filename, parse_coordinate};
use apterrain::tile::COARSE_SAMPLES;
use apterrain::TerrainTile;
use std::fs;
use std::path::{Path, PathBuf};

use super::{format_coverage, format_size, resolve_data_dir};

pub fn run(
    data_dir: Option<PathBuf>,
    tile: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
) -> Result<()> {
    let tile_path = match (tile, lat, lon) {
        (_, Some(lat), Some(lon)) => {
            let dir = resolve_data_dir(data_dir)?;
            find_tile_file(&dir, lat.floor() as i32, lon.floor() as i32)?
        }
        (Some(tile), _, _) if Path::new(&tile).extension().is_some() => PathBuf::from(tile),
        (Some(tile), _, _) => {
            // Just tile name (e.g., "N27E086")
            let (lat, lon) = parse_coordinate(&format!("{}.dat", tile))
                .with_context(|| format!("Not a tile name: {}", tile))?;
            let dir = resolve_data_dir(data_dir)?;
            find_tile_file(&dir, lat, lon)?
        }
        _ => bail!("Specify a tile path, a tile name, or --lat and --lon"),
    };

    let tile = TerrainTile::from_file(&tile_path)
        .with_context(|| format!("Failed to load tile {}", tile_path.display()))?;
    let file_size = fs::metadata(&tile_path)?.len();
    let summary = tile.summary();
    let samples = tile.samples().len();

    println!(
        "Tile: {}",
        coords_to_filename(tile.origin_lat(), tile.origin_lon())
    );
    println!("Path: {}", tile_path.display());
    println!();
    println!(
        "Coverage: {}",
        format_coverage(tile.origin_lat(), tile.origin_lon())
    );
    println!(
        "Samples: {} ({} coarse + {} trailing)",
        samples,
        samples.min(COARSE_SAMPLES),
        samples.saturating_sub(COARSE_SAMPLES)
    );
    println!("File size: {}", format_size(file_size));
    println!();
    println!(
        "Coarse cells: {} direct, {} subgrid, {} unresolved",
        summary.direct_cells, summary.subgrid_cells, summary.unresolved_cells
    );

    if let (Some(min), Some(max)) = (summary.min_elevation, summary.max_elevation) {
        println!("Min elevation: {}m", min);
        println!("Max elevation: {}m", max);
    }

    Ok(())
}

/// Find the file for tile `(lat, lon)` in `dir`, whatever the filename case.
fn find_tile_file(dir: &Path, lat: i32, lon: i32) -> Result<PathBuf> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read data directory {}", dir.display()))?;

    entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .find(|path| {
            path.is_file()
                && parse_coordinate(&path.to_string_lossy())
                    .map(|coords| coords == (lat, lon))
                    .unwrap_or(false)
        })
        .with_context(|| {
            format!(
                "Tile not found: {} in {}",
                coords_to_filename(lat, lon),
                dir.display()
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_tile_file_any_case() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("n27e086.dat"), [0u8; 2]).unwrap();

        let path = find_tile_file(temp_dir.path(), 27, 86).unwrap();
        assert!(path.ends_with("n27e086.dat"));

        assert!(find_tile_file(temp_dir.path(), -27, 86).is_err());
    }
}
