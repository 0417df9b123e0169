use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;

use super::load_registry;

#[derive(Serialize)]
struct ElevationResponse {
    lat: f64,
    lon: f64,
    elevation: Option<i16>,
}

pub fn run(data_dir: Option<PathBuf>, lat: f64, lon: f64, json: bool) -> Result<()> {
    let registry = load_registry(data_dir)?;

    let elevation = registry
        .get_elevation(lat, lon)
        .context("Failed to get elevation")?;

    if json {
        let response = ElevationResponse {
            lat,
            lon,
            elevation,
        };
        println!("{}", serde_json::to_string(&response)?);
    } else {
        match elevation {
            Some(elev) => println!("{}", elev),
            None => println!("no data"),
        }
    }

    Ok(())
}
