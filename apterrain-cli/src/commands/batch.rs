use anyhow::{bail, Context, Result};
use apterrain::TerrainRegistry;
use geojson::{GeoJson, Geometry, Value};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use super::load_registry;

/// Written in the CSV `elevation` column when no tile covers a row.
const NO_DATA: &str = "no data";

pub fn run(
    data_dir: Option<PathBuf>,
    input: PathBuf,
    output: Option<PathBuf>,
    lat_col: String,
    lon_col: String,
) -> Result<()> {
    let registry = load_registry(data_dir)?;

    let extension = input
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let output_path = match extension.as_str() {
        "csv" => {
            let output_path = output.unwrap_or_else(|| default_output(&input, "csv"));
            process_csv(&registry, &input, &output_path, &lat_col, &lon_col)?;
            output_path
        }
        "geojson" | "json" => {
            let output_path = output.unwrap_or_else(|| default_output(&input, "geojson"));
            process_geojson(&registry, &input, &output_path)?;
            output_path
        }
        _ => bail!(
            "Unsupported file format: {}. Use .csv or .geojson",
            extension
        ),
    };

    let stats = registry.stats();
    tracing::info!(
        hits = stats.hit_count,
        misses = stats.miss_count,
        "Batch complete"
    );
    println!("Output written to: {}", output_path.display());
    Ok(())
}

/// `<stem>_elevation.<ext>` next to the input file.
fn default_output(input: &Path, ext: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{}_elevation.{}", stem, ext))
}

fn progress_bar(len: u64) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

fn process_csv(
    registry: &TerrainRegistry,
    input: &Path,
    output_path: &Path,
    lat_col: &str,
    lon_col: &str,
) -> Result<()> {
    let file = File::open(input).context("Failed to open input file")?;
    let mut reader = csv::Reader::from_reader(BufReader::new(file));

    let headers = reader.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .with_context(|| format!("Column '{}' not found in CSV", name))
    };
    let lat_idx = column(lat_col)?;
    let lon_idx = column(lon_col)?;

    let records: Vec<csv::StringRecord> = reader.records().collect::<Result<_, _>>()?;
    let pb = progress_bar(records.len() as u64)?;

    let output_file = File::create(output_path).context("Failed to create output file")?;
    let mut writer = csv::Writer::from_writer(BufWriter::new(output_file));

    let mut out_headers = headers.clone();
    out_headers.push_field("elevation");
    writer.write_record(&out_headers)?;

    for (line, record) in records.iter().enumerate() {
        let field = |idx: usize, what: &str| -> Result<f64> {
            record
                .get(idx)
                .with_context(|| format!("Row {}: missing {}", line + 1, what))?
                .trim()
                .parse()
                .with_context(|| format!("Row {}: invalid {}", line + 1, what))
        };
        let lat = field(lat_idx, "latitude")?;
        let lon = field(lon_idx, "longitude")?;

        let elevation = registry
            .query(lat, lon)
            .map(|e| e.to_string())
            .unwrap_or_else(|| NO_DATA.to_string());

        let mut out = record.clone();
        out.push_field(&elevation);
        writer.write_record(&out)?;

        pb.inc(1);
    }

    pb.finish_with_message("done");
    writer.flush()?;
    Ok(())
}

fn process_geojson(registry: &TerrainRegistry, input: &Path, output_path: &Path) -> Result<()> {
    let file = File::open(input).context("Failed to open input file")?;
    let mut geojson: GeoJson =
        serde_json::from_reader(BufReader::new(file)).context("Failed to parse GeoJSON")?;

    match &mut geojson {
        GeoJson::Geometry(geometry) => fill_geometry(registry, geometry),
        GeoJson::Feature(feature) => {
            if let Some(geometry) = feature.geometry.as_mut() {
                fill_geometry(registry, geometry);
            }
        }
        GeoJson::FeatureCollection(fc) => {
            let pb = progress_bar(fc.features.len() as u64)?;
            for feature in &mut fc.features {
                if let Some(geometry) = feature.geometry.as_mut() {
                    fill_geometry(registry, geometry);
                }
                pb.inc(1);
            }
            pb.finish_with_message("done");
        }
    }

    let output_file = File::create(output_path).context("Failed to create output file")?;
    let mut writer = BufWriter::new(output_file);
    serde_json::to_writer_pretty(&mut writer, &geojson)?;
    writer.flush()?;
    Ok(())
}

/// Set the Z ordinate of every position in place; positions with no data get 0.
fn fill_geometry(registry: &TerrainRegistry, geometry: &mut Geometry) {
    let fill = |positions: &mut Vec<Vec<f64>>| {
        for pos in positions.iter_mut() {
            fill_position(registry, pos);
        }
    };

    match &mut geometry.value {
        Value::Point(pos) => fill_position(registry, pos),
        Value::MultiPoint(positions) | Value::LineString(positions) => fill(positions),
        Value::MultiLineString(lines) | Value::Polygon(lines) => lines.iter_mut().for_each(fill),
        Value::MultiPolygon(polygons) => polygons
            .iter_mut()
            .flat_map(|rings| rings.iter_mut())
            .for_each(fill),
        Value::GeometryCollection(geometries) => {
            for inner in geometries {
                fill_geometry(registry, inner);
            }
        }
    }
}

fn fill_position(registry: &TerrainRegistry, pos: &mut Vec<f64>) {
    let (lon, lat) = match pos.as_slice() {
        [lon, lat, ..] => (*lon, *lat),
        _ => return,
    };
    let elevation = f64::from(registry.query(lat, lon).unwrap_or(0));

    pos.truncate(2);
    pos.push(elevation);
}
