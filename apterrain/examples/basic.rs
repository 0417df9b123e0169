//! Basic example demonstrating apterrain library usage.
//!
//! Run with: cargo run --example basic -- /path/to/dat/files

use apterrain::{TerrainError, TerrainRegistry};
use std::env;

fn main() -> Result<(), TerrainError> {
    // Get data directory from command line
    let data_dir = env::args().nth(1).unwrap_or_else(|| {
        eprintln!("Usage: cargo run --example basic -- /path/to/dat/files");
        std::process::exit(1);
    });

    println!("Loading terrain database from: {}", data_dir);
    let registry = TerrainRegistry::from_dir(&data_dir)?;
    println!("Loaded {} terrain tiles.", registry.len());

    if registry.is_empty() {
        std::process::exit(1);
    }

    let locations = [
        ("Mount Everest area", 27.9881, 86.9250),
        ("Kathmandu", 27.7172, 85.3240),
        ("Invalid point (Ocean)", 20.0, 90.0),
    ];

    for (name, lat, lon) in &locations {
        println!("\nQuerying for {} ({}, {})", name, lat, lon);
        match registry.query(*lat, *lon) {
            Some(elevation) => println!("  -> Elevation: {} meters.", elevation),
            None => println!("  -> No terrain data available for this location."),
        }
    }

    Ok(())
}
