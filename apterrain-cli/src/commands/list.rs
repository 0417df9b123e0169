use anyhow::{Context, Result};
use apterrain::filename::parse_coordinate;
use apterrain::{DirectorySource, TerrainTile, TileSource};
use std::fs;
use std::path::PathBuf;

use super::{format_coverage, format_size, resolve_data_dir};

pub fn run(data_dir: Option<PathBuf>) -> Result<()> {
    let dir = resolve_data_dir(data_dir)?;
    let source = DirectorySource::new(&dir);

    let candidates = source
        .list()
        .with_context(|| format!("Failed to read data directory {}", dir.display()))?;

    // Anything named like a tile, even if its contents turn out to be bad
    let tiles: Vec<(PathBuf, (i32, i32))> = candidates
        .into_iter()
        .filter_map(|path| {
            let coords = parse_coordinate(&path.to_string_lossy()).ok()?;
            Some((path, coords))
        })
        .collect();

    if tiles.is_empty() {
        println!("No tile files found in: {}", dir.display());
        return Ok(());
    }

    let mut valid_count = 0;
    let mut total_size: u64 = 0;

    println!(
        "{:<12} {:>8} {:>8}  {}",
        "TILE", "SAMPLES", "STATUS", "COVERAGE"
    );
    println!("{}", "-".repeat(60));

    for (path, (lat, lon)) in &tiles {
        total_size += fs::metadata(path).map(|m| m.len()).unwrap_or(0);

        let (samples, status) = match TerrainTile::from_file(path) {
            Ok(tile) => {
                valid_count += 1;
                (tile.samples().len().to_string(), "ok")
            }
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Unreadable tile");
                ("-".to_string(), "invalid")
            }
        };

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        println!(
            "{:<12} {:>8} {:>8}  {}",
            name,
            samples,
            status,
            format_coverage(*lat, *lon)
        );
    }

    println!();
    println!("Summary:");
    println!("  Tile files: {}", tiles.len());
    println!("  Loadable: {}", valid_count);
    if valid_count < tiles.len() {
        println!("  Invalid: {}", tiles.len() - valid_count);
    }
    println!("  Total size: {}", format_size(total_size));
    println!("  Data directory: {}", dir.display());

    Ok(())
}
